use crate::handshake::HandshakeState;
use chatlan_core::{FrameError, Role};
use thiserror::Error;

/// Failures reported by a peer-connection engine.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Rtc(#[from] webrtc::Error),

    #[error("ICE gathering was never started")]
    GatheringNotStarted,

    #[error("no local description after ICE gathering")]
    MissingLocalDescription,

    #[error("description rejected: {0}")]
    Rejected(String),

    #[error("data channel is not open")]
    ChannelNotOpen,
}

/// Why a single handshake ended in `Closed` before its channel opened.
#[derive(Debug, Error)]
pub enum HandshakeError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("handshake timed out while {0:?}")]
    TimedOut(HandshakeState),

    #[error("handshake cancelled")]
    Cancelled,

    #[error("connection lost before the channel opened")]
    ConnectionLost,

    #[error("handshake cannot move from {from:?} to {to:?}")]
    Regression {
        from: HandshakeState,
        to: HandshakeState,
    },
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("a {role} session cannot {action}")]
    WrongRole { role: Role, action: &'static str },

    #[error("message text is empty")]
    EmptyMessage,

    #[error(transparent)]
    Frame(#[from] FrameError),

    #[error("session has shut down")]
    Closed,
}
