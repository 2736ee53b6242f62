use crate::transport::DataLink;
use chatlan_core::PeerId;
use std::sync::Arc;

/// What an engine reports back to the session about a peer's link.
pub enum TransportEvent {
    /// The data channel is open; the session keeps the link to send on it.
    ChannelOpen(PeerId, Arc<dyn DataLink>),

    /// A UTF-8 text frame arrived.
    Message(PeerId, String),

    ChannelClosed(PeerId),

    /// The underlying peer connection failed or was closed.
    ConnectionLost(PeerId),
}
