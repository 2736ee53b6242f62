/// Progress of one peer's offer/answer exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandshakeState {
    Idle,
    LocalDescriptionPending,
    LocalDescriptionReady,
    RemoteDescriptionApplied,
    ChannelOpen,
    Closed,
}

/// Which side of the exchange a handshake drives.
///
/// The offering side produces its description before it sees the remote one;
/// the answering side is the other way round, so "forward" differs per path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandshakePath {
    Offering,
    Answering,
}

const OFFERING_SEQUENCE: [HandshakeState; 6] = [
    HandshakeState::Idle,
    HandshakeState::LocalDescriptionPending,
    HandshakeState::LocalDescriptionReady,
    HandshakeState::RemoteDescriptionApplied,
    HandshakeState::ChannelOpen,
    HandshakeState::Closed,
];

const ANSWERING_SEQUENCE: [HandshakeState; 6] = [
    HandshakeState::Idle,
    HandshakeState::RemoteDescriptionApplied,
    HandshakeState::LocalDescriptionPending,
    HandshakeState::LocalDescriptionReady,
    HandshakeState::ChannelOpen,
    HandshakeState::Closed,
];

impl HandshakePath {
    pub fn sequence(self) -> &'static [HandshakeState] {
        match self {
            HandshakePath::Offering => &OFFERING_SEQUENCE,
            HandshakePath::Answering => &ANSWERING_SEQUENCE,
        }
    }

    /// Position of `state` along this path.
    pub fn rank(self, state: HandshakeState) -> usize {
        self.sequence()
            .iter()
            .position(|s| *s == state)
            .unwrap_or_default()
    }

    /// True when moving from `from` to `to` goes forward on this path.
    pub fn allows(self, from: HandshakeState, to: HandshakeState) -> bool {
        from != HandshakeState::Closed && self.rank(to) > self.rank(from)
    }
}

impl HandshakeState {
    pub fn is_terminal(self) -> bool {
        self == HandshakeState::Closed
    }

    /// Open or closed; either way no more signaling is expected.
    pub fn is_settled(self) -> bool {
        matches!(self, HandshakeState::ChannelOpen | HandshakeState::Closed)
    }
}
