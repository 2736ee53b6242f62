use crate::registry::PeerRegistry;
use crate::transport::DataLink;
use chatlan_core::{ChatMessage, Frame, FrameError, MessageLog, PeerId, Role};
use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Owns the local message log and decides who hears about each message.
pub struct RelayEngine {
    role: Role,
    log: MessageLog,
}

impl RelayEngine {
    pub fn new(role: Role) -> Self {
        Self {
            role,
            log: MessageLog::new(),
        }
    }

    pub fn log(&self) -> &MessageLog {
        &self.log
    }

    /// Handles a raw frame received from `from`. Chat frames are logged and, on
    /// a Host, forwarded byte-for-byte to every other reachable peer.
    ///
    /// Returns the chat message if the frame carried one.
    pub async fn relay_incoming(
        &mut self,
        from: PeerId,
        raw: &str,
        registry: &PeerRegistry,
    ) -> Option<ChatMessage> {
        let message = match Frame::decode(raw) {
            Ok(Frame::Chat(message)) => message,
            Ok(Frame::Unknown(kind)) => {
                debug!("Ignoring '{}' frame from {}", kind, from);
                return None;
            }
            Err(e) => {
                warn!("Dropping malformed frame from {}: {}", from, e);
                return None;
            }
        };

        self.log.append(message.clone());

        if self.role.relays() {
            let targets = registry.open_links_except(Some(&from));
            debug!("Relaying {} from {} to {} peers", message.id, from, targets.len());
            fan_out(targets, raw).await;
        }

        Some(message)
    }

    /// Logs a locally composed message and sends it on every open channel.
    pub async fn broadcast_local(
        &mut self,
        message: ChatMessage,
        registry: &PeerRegistry,
    ) -> Result<ChatMessage, FrameError> {
        let frame = Frame::encode_chat(&message)?;
        self.log.append(message.clone());
        fan_out(registry.open_links_except(None), &frame).await;
        Ok(message)
    }
}

/// Sends `text` on every link concurrently. Failures are logged per peer.
pub async fn fan_out(targets: Vec<(PeerId, Arc<dyn DataLink>)>, text: &str) -> usize {
    let sends = targets.iter().map(|(peer_id, link)| async move {
        match link.send_text(text).await {
            Ok(()) => true,
            Err(e) => {
                error!("Failed to send to peer {}: {}", peer_id, e);
                false
            }
        }
    });

    join_all(sends).await.into_iter().filter(|ok| *ok).count()
}
