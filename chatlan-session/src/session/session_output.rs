use crate::error::HandshakeError;
use async_trait::async_trait;
use chatlan_core::{ChatMessage, PeerId, SignalKind};
use tokio::sync::mpsc;
use tracing::debug;

/// Implemented by whatever presents the session to the user (QR renderer,
/// terminal, test harness). Calls come from the session actor, one at a time.
#[async_trait]
pub trait SessionOutput: Send + Sync {
    /// A local offer or answer is ready to be shown to the other side.
    async fn signal_ready(&self, peer_id: PeerId, kind: SignalKind, token: String);

    async fn peer_joined(&self, peer_id: PeerId, display_name: Option<String>);

    async fn message_received(&self, from: PeerId, message: ChatMessage);

    async fn peer_left(&self, peer_id: PeerId);

    async fn handshake_failed(&self, peer_id: PeerId, error: HandshakeError);
}

/// [`SessionOutput`] calls turned into values.
#[derive(Debug)]
pub enum SessionEvent {
    SignalReady {
        peer_id: PeerId,
        kind: SignalKind,
        token: String,
    },
    PeerJoined {
        peer_id: PeerId,
        display_name: Option<String>,
    },
    MessageReceived {
        from: PeerId,
        message: ChatMessage,
    },
    PeerLeft {
        peer_id: PeerId,
    },
    HandshakeFailed {
        peer_id: PeerId,
        error: HandshakeError,
    },
}

/// Forwards every notification into an unbounded channel.
#[derive(Clone)]
pub struct ChannelOutput {
    tx: mpsc::UnboundedSender<SessionEvent>,
}

impl ChannelOutput {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<SessionEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    fn emit(&self, event: SessionEvent) {
        if self.tx.send(event).is_err() {
            debug!("Session event receiver dropped");
        }
    }
}

#[async_trait]
impl SessionOutput for ChannelOutput {
    async fn signal_ready(&self, peer_id: PeerId, kind: SignalKind, token: String) {
        self.emit(SessionEvent::SignalReady {
            peer_id,
            kind,
            token,
        });
    }

    async fn peer_joined(&self, peer_id: PeerId, display_name: Option<String>) {
        self.emit(SessionEvent::PeerJoined {
            peer_id,
            display_name,
        });
    }

    async fn message_received(&self, from: PeerId, message: ChatMessage) {
        self.emit(SessionEvent::MessageReceived { from, message });
    }

    async fn peer_left(&self, peer_id: PeerId) {
        self.emit(SessionEvent::PeerLeft { peer_id });
    }

    async fn handshake_failed(&self, peer_id: PeerId, error: HandshakeError) {
        self.emit(SessionEvent::HandshakeFailed { peer_id, error });
    }
}
