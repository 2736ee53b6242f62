use crate::error::EngineError;
use crate::transport::TransportEvent;
use async_trait::async_trait;
use chatlan_core::{PeerId, SignalKind};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Whether the local side creates the chat channel or waits for the remote one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelMode {
    Create,
    Accept,
}

/// Factory for peer connections. The session only ever talks to this contract.
#[async_trait]
pub trait PeerEngine: Send + Sync + 'static {
    /// Builds a connection for `peer_id`. Channel lifecycle and incoming frames
    /// are reported on `events`.
    async fn open(
        &self,
        peer_id: PeerId,
        mode: ChannelMode,
        events: mpsc::Sender<TransportEvent>,
    ) -> Result<Arc<dyn PeerConnection>, EngineError>;
}

#[async_trait]
pub trait PeerConnection: Send + Sync {
    /// Creates an offer or answer and installs it as the local description.
    /// ICE gathering starts here.
    async fn create_local_description(&self, kind: SignalKind) -> Result<(), EngineError>;

    /// Resolves once ICE gathering has completed, with the full local
    /// description including every gathered candidate.
    async fn gathering_complete(&self) -> Result<String, EngineError>;

    async fn apply_remote_description(
        &self,
        kind: SignalKind,
        sdp: String,
    ) -> Result<(), EngineError>;

    async fn close(&self) -> Result<(), EngineError>;
}

/// Sending half of an open data channel.
#[async_trait]
pub trait DataLink: Send + Sync {
    fn is_open(&self) -> bool;

    async fn send_text(&self, text: &str) -> Result<(), EngineError>;
}
