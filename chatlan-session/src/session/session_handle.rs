use crate::error::SessionError;
use crate::session::{SessionCommand, SessionSnapshot, SignalOutcome};
use crate::suggest::{NameSuggester, suggest_group_name};
use chatlan_core::{ChatMessage, PeerId, Role, SessionCode};
use tokio::sync::{mpsc, oneshot};

/// Cheap, cloneable front door to a running [`Session`](crate::session::Session).
#[derive(Clone, Debug)]
pub struct SessionHandle {
    commands: mpsc::Sender<SessionCommand>,
    role: Role,
    code: SessionCode,
}

impl SessionHandle {
    pub(crate) fn new(commands: mpsc::Sender<SessionCommand>, role: Role, code: SessionCode) -> Self {
        Self {
            commands,
            role,
            code,
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn code(&self) -> SessionCode {
        self.code
    }

    /// Starts a new Host handshake. The offer token is delivered through
    /// [`SessionOutput::signal_ready`](crate::session::SessionOutput::signal_ready)
    /// once ICE gathering finishes.
    pub async fn create_offer(&self) -> Result<PeerId, SessionError> {
        self.request(|reply| SessionCommand::CreateOffer { reply })
            .await?
    }

    /// Feeds a scanned or pasted token to the session.
    pub async fn apply_signal(&self, token: &str) -> Result<SignalOutcome, SessionError> {
        let token = token.to_owned();
        self.request(|reply| SessionCommand::ApplySignal { token, reply })
            .await
    }

    pub async fn send_chat(&self, text: impl Into<String>) -> Result<ChatMessage, SessionError> {
        let text = text.into();
        self.request(|reply| SessionCommand::SendChat { text, reply })
            .await?
    }

    /// Returns false if the peer is unknown.
    pub async fn cancel(&self, peer_id: PeerId) -> Result<bool, SessionError> {
        self.request(|reply| SessionCommand::Cancel { peer_id, reply })
            .await
    }

    pub async fn snapshot(&self) -> Result<SessionSnapshot, SessionError> {
        self.request(|reply| SessionCommand::Snapshot { reply }).await
    }

    /// Asks `suggester` for a group name based on the recent chat.
    pub async fn suggest_group_name(
        &self,
        suggester: &dyn NameSuggester,
    ) -> Result<String, SessionError> {
        let snapshot = self.snapshot().await?;
        Ok(suggest_group_name(suggester, &snapshot.messages).await)
    }

    /// Closes every connection and stops the actor.
    pub async fn shutdown(&self) {
        let _ = self.commands.send(SessionCommand::Shutdown).await;
    }

    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> SessionCommand,
    ) -> Result<T, SessionError> {
        let (reply, rx) = oneshot::channel();
        self.commands
            .send(command(reply))
            .await
            .map_err(|_| SessionError::Closed)?;
        rx.await.map_err(|_| SessionError::Closed)
    }
}
