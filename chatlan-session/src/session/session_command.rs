use crate::error::SessionError;
use crate::handshake::{HandshakePath, HandshakeState};
use crate::session::LocalIdentity;
use chatlan_core::{ChatMessage, PeerId, PeerStatus, Role, SessionCode};
use tokio::sync::oneshot;

/// Requests handled by the session actor.
#[derive(Debug)]
pub enum SessionCommand {
    /// Host only: start a new outgoing handshake.
    CreateOffer {
        reply: oneshot::Sender<Result<PeerId, SessionError>>,
    },

    /// A token scanned or pasted by the user.
    ApplySignal {
        token: String,
        reply: oneshot::Sender<SignalOutcome>,
    },

    SendChat {
        text: String,
        reply: oneshot::Sender<Result<ChatMessage, SessionError>>,
    },

    /// Abort a handshake, or drop an open link.
    Cancel {
        peer_id: PeerId,
        reply: oneshot::Sender<bool>,
    },

    Snapshot {
        reply: oneshot::Sender<SessionSnapshot>,
    },

    Shutdown,
}

/// What happened to a scanned or pasted token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalOutcome {
    /// The token drives the handshake with this peer.
    Accepted(PeerId),
    Ignored(IgnoreReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    Undecodable,
    /// An offer reached a Host or an answer reached a Guest.
    WrongRole,
    /// A Guest already has (or is building) its single link.
    AlreadyLinked,
    NoPendingOffer,
    /// An answer without link id while several offers are outstanding.
    Ambiguous,
}

#[derive(Debug, Clone)]
pub struct PeerSummary {
    pub id: PeerId,
    pub status: PeerStatus,
    pub display_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct HandshakeSummary {
    pub peer_id: PeerId,
    pub path: HandshakePath,
    pub state: HandshakeState,
    pub remote_name: Option<String>,
    /// Token to show the other side, once gathering has finished.
    pub local_token: Option<String>,
}

/// Point-in-time view of the session for front ends.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub role: Role,
    pub code: SessionCode,
    pub local: LocalIdentity,
    pub peers: Vec<PeerSummary>,
    pub handshakes: Vec<HandshakeSummary>,
    pub messages: Vec<ChatMessage>,
}

impl SessionSnapshot {
    pub fn connected_peers(&self) -> impl Iterator<Item = &PeerSummary> {
        self.peers
            .iter()
            .filter(|p| p.status == PeerStatus::Connected)
    }
}
