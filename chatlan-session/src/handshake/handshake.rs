use crate::error::HandshakeError;
use crate::handshake::{HandshakePath, HandshakeState};
use crate::transport::PeerConnection;
use chatlan_core::PeerId;
use std::sync::Arc;
use tokio::task::AbortHandle;
use tokio::time::Instant;

/// Book-keeping for one in-progress (or open) link.
pub struct Handshake {
    peer_id: PeerId,
    path: HandshakePath,
    state: HandshakeState,
    deadline: Instant,
    connection: Option<Arc<dyn PeerConnection>>,
    task: Option<AbortHandle>,
    remote_name: Option<String>,
    /// Link id seen on the remote offer; echoed on our answer.
    offer_link: Option<PeerId>,
    local_token: Option<String>,
    answer_in_flight: bool,
}

impl Handshake {
    pub fn offering(peer_id: PeerId, deadline: Instant) -> Self {
        Self::new(peer_id, HandshakePath::Offering, deadline)
    }

    pub fn answering(
        peer_id: PeerId,
        deadline: Instant,
        remote_name: String,
        offer_link: Option<PeerId>,
    ) -> Self {
        let mut handshake = Self::new(peer_id, HandshakePath::Answering, deadline);
        handshake.remote_name = Some(remote_name);
        handshake.offer_link = offer_link;
        handshake
    }

    fn new(peer_id: PeerId, path: HandshakePath, deadline: Instant) -> Self {
        Self {
            peer_id,
            path,
            state: HandshakeState::Idle,
            deadline,
            connection: None,
            task: None,
            remote_name: None,
            offer_link: None,
            local_token: None,
            answer_in_flight: false,
        }
    }

    pub fn peer_id(&self) -> PeerId {
        self.peer_id
    }

    pub fn path(&self) -> HandshakePath {
        self.path
    }

    pub fn state(&self) -> HandshakeState {
        self.state
    }

    /// Moves forward along this handshake's path; anything else is refused.
    pub fn advance(&mut self, next: HandshakeState) -> Result<(), HandshakeError> {
        if !self.path.allows(self.state, next) {
            return Err(HandshakeError::Regression {
                from: self.state,
                to: next,
            });
        }
        self.state = next;
        Ok(())
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        !self.state.is_settled() && now >= self.deadline
    }

    /// An offering handshake whose offer is out and whose answer has not been
    /// handed to the engine yet.
    pub fn awaits_answer(&self) -> bool {
        self.path == HandshakePath::Offering
            && self.state == HandshakeState::LocalDescriptionReady
            && !self.answer_in_flight
    }

    pub fn mark_answer_in_flight(&mut self) {
        self.answer_in_flight = true;
    }

    pub fn connection(&self) -> Option<Arc<dyn PeerConnection>> {
        self.connection.clone()
    }

    pub fn attach_connection(&mut self, connection: Arc<dyn PeerConnection>) {
        self.connection = Some(connection);
    }

    /// Remembers the task driving the current step so it can be aborted.
    pub fn track_task(&mut self, task: AbortHandle) {
        if let Some(previous) = self.task.replace(task) {
            previous.abort();
        }
    }

    pub fn remote_name(&self) -> Option<&str> {
        self.remote_name.as_deref()
    }

    pub fn set_remote_name(&mut self, name: String) {
        self.remote_name = Some(name);
    }

    pub fn offer_link(&self) -> Option<PeerId> {
        self.offer_link
    }

    pub fn local_token(&self) -> Option<&str> {
        self.local_token.as_deref()
    }

    pub fn set_local_token(&mut self, token: String) {
        self.local_token = Some(token);
    }

    /// Moves to `Closed`, stops any running step and hands back the
    /// connection so the caller can close it.
    pub fn close(&mut self) -> Option<Arc<dyn PeerConnection>> {
        self.state = HandshakeState::Closed;
        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.connection.take()
    }
}
