//! Lossy compression of data-channel-only session descriptions.
//!
//! Everything except ICE credentials, the DTLS fingerprint, the DTLS role and
//! the candidate lines is thrown away; [`reconstruct`] puts a fixed header back
//! in front of what survived.

use std::borrow::Cow;

const RECORD_SEPARATOR: char = '|';
const LINE_BREAK: &str = "\r\n";

/// Kept attribute prefixes and their short tokens, longest prefix first.
const PREFIX_TABLE: [(&str, &str); 6] = [
    ("a=fingerprint:sha-256 ", "f:"),
    ("a=fingerprint:", "F:"),
    ("a=candidate:", "c:"),
    ("a=ice-ufrag:", "u:"),
    ("a=ice-pwd:", "p:"),
    ("a=setup:", "s:"),
];

const CANONICAL_HEADER: &str = concat!(
    "v=0\r\n",
    "o=- 0 0 IN IP4 127.0.0.1\r\n",
    "s=-\r\n",
    "t=0 0\r\n",
    "a=group:BUNDLE 0\r\n",
    "a=msid-semantic: WMS\r\n",
    "m=application 9 UDP/DTLS/SCTP webrtc-datachannel\r\n",
    "c=IN IP4 0.0.0.0\r\n",
    "a=mid:0\r\n",
    "a=sctp-port:5000\r\n",
);

/// Returns true for the attribute lines that [`compress`] keeps.
pub fn is_essential(line: &str) -> bool {
    PREFIX_TABLE
        .iter()
        .any(|(prefix, _)| line.starts_with(prefix))
}

pub fn compress(description: &str) -> String {
    let records: Vec<String> = description.lines().filter_map(shorten).collect();
    records.join(&RECORD_SEPARATOR.to_string())
}

pub fn reconstruct(token: &str) -> String {
    let mut description = String::from(CANONICAL_HEADER);
    for record in token.split(RECORD_SEPARATOR).filter(|r| !r.is_empty()) {
        description.push_str(&expand(record));
        description.push_str(LINE_BREAK);
    }
    description
}

// Only the leading attribute name is rewritten; values such as IPv6
// addresses may legitimately contain a token like `c:`.
fn shorten(line: &str) -> Option<String> {
    PREFIX_TABLE.iter().find_map(|(prefix, token)| {
        line.strip_prefix(prefix)
            .map(|value| format!("{token}{value}"))
    })
}

fn expand(record: &str) -> Cow<'_, str> {
    PREFIX_TABLE
        .iter()
        .find_map(|(prefix, token)| {
            record
                .strip_prefix(token)
                .map(|value| Cow::Owned(format!("{prefix}{value}")))
        })
        .unwrap_or(Cow::Borrowed(record))
}
