//! Packs a [`SignalEnvelope`] into the short text token that ends up in a QR
//! code or a clipboard.
//!
//! Wire form: unpadded standard base64 of `{"t":0|1,"s":..,"n":..,"i":..}`.
//! `i` is optional so tokens from peers that do not send a link id still decode.

use crate::error::EnvelopeError;
use crate::model::{PeerId, SignalEnvelope, SignalKind};
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::{Engine as _, alphabet};
use serde::{Deserialize, Serialize};

const TOKEN_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

#[derive(Serialize, Deserialize)]
struct WireEnvelope {
    t: u8,
    s: String,
    n: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    i: Option<PeerId>,
}

pub fn encode(envelope: &SignalEnvelope) -> String {
    let wire = WireEnvelope {
        t: envelope.kind.tag(),
        s: envelope.description.clone(),
        n: envelope.display_name.clone(),
        i: envelope.link_id,
    };
    // Infallible: only strings, an integer and a uuid.
    let json = serde_json::to_vec(&wire).unwrap_or_default();
    TOKEN_ENGINE.encode(json)
}

pub fn decode(token: &str) -> Result<SignalEnvelope, EnvelopeError> {
    let compact: String = token.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return Err(EnvelopeError::Empty);
    }

    let bytes = TOKEN_ENGINE.decode(compact.as_bytes())?;
    let wire: WireEnvelope = serde_json::from_slice(&bytes)?;
    let kind = SignalKind::from_tag(wire.t).ok_or(EnvelopeError::UnknownKind(wire.t))?;

    Ok(SignalEnvelope {
        kind,
        description: wire.s,
        display_name: wire.n,
        link_id: wire.i,
    })
}

impl SignalEnvelope {
    pub fn to_token(&self) -> String {
        encode(self)
    }

    pub fn from_token(token: &str) -> Result<Self, EnvelopeError> {
        decode(token)
    }
}
