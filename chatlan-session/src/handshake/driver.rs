use crate::error::{EngineError, HandshakeError};
use crate::handshake::HandshakeState;
use crate::transport::{ChannelMode, PeerConnection, PeerEngine, TransportEvent};
use chatlan_core::{PeerId, SignalKind};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::debug;

/// Progress reported by a handshake task back to the session actor.
pub enum HandshakeStep {
    ConnectionCreated(PeerId, Arc<dyn PeerConnection>),
    Reached(PeerId, HandshakeState),
    /// ICE gathering finished; carries the full local description.
    DescriptionReady(PeerId, String),
    Failed(PeerId, HandshakeError),
}

impl HandshakeStep {
    pub fn peer_id(&self) -> PeerId {
        match self {
            HandshakeStep::ConnectionCreated(peer_id, _)
            | HandshakeStep::Reached(peer_id, _)
            | HandshakeStep::DescriptionReady(peer_id, _)
            | HandshakeStep::Failed(peer_id, _) => *peer_id,
        }
    }
}

struct StepReporter {
    peer_id: PeerId,
    steps: mpsc::Sender<HandshakeStep>,
}

impl StepReporter {
    async fn send(&self, step: HandshakeStep) {
        if self.steps.send(step).await.is_err() {
            debug!("Session gone, dropping handshake step for {}", self.peer_id);
        }
    }

    async fn reached(&self, state: HandshakeState) {
        self.send(HandshakeStep::Reached(self.peer_id, state)).await;
    }

    async fn finish(&self, result: Result<(), EngineError>) {
        if let Err(e) = result {
            self.send(HandshakeStep::Failed(self.peer_id, e.into())).await;
        }
    }
}

/// Offering side: open a connection that creates the chat channel, produce an
/// offer and wait for ICE gathering.
pub async fn drive_offer(
    engine: Arc<dyn PeerEngine>,
    peer_id: PeerId,
    transport_tx: mpsc::Sender<TransportEvent>,
    steps: mpsc::Sender<HandshakeStep>,
) {
    let reporter = StepReporter { peer_id, steps };
    let result = offer_steps(engine, transport_tx, &reporter).await;
    reporter.finish(result).await;
}

async fn offer_steps(
    engine: Arc<dyn PeerEngine>,
    transport_tx: mpsc::Sender<TransportEvent>,
    reporter: &StepReporter,
) -> Result<(), EngineError> {
    let peer_id = reporter.peer_id;
    let connection = engine.open(peer_id, ChannelMode::Create, transport_tx).await?;
    reporter
        .send(HandshakeStep::ConnectionCreated(peer_id, connection.clone()))
        .await;

    connection.create_local_description(SignalKind::Offer).await?;
    reporter.reached(HandshakeState::LocalDescriptionPending).await;

    let sdp = connection.gathering_complete().await?;
    reporter
        .send(HandshakeStep::DescriptionReady(peer_id, sdp))
        .await;
    Ok(())
}

/// Answering side: open a connection that waits for the remote channel, apply
/// the remote offer, produce an answer and wait for ICE gathering.
pub async fn drive_answer(
    engine: Arc<dyn PeerEngine>,
    peer_id: PeerId,
    remote_sdp: String,
    transport_tx: mpsc::Sender<TransportEvent>,
    steps: mpsc::Sender<HandshakeStep>,
) {
    let reporter = StepReporter { peer_id, steps };
    let result = answer_steps(engine, remote_sdp, transport_tx, &reporter).await;
    reporter.finish(result).await;
}

async fn answer_steps(
    engine: Arc<dyn PeerEngine>,
    remote_sdp: String,
    transport_tx: mpsc::Sender<TransportEvent>,
    reporter: &StepReporter,
) -> Result<(), EngineError> {
    let peer_id = reporter.peer_id;
    let connection = engine.open(peer_id, ChannelMode::Accept, transport_tx).await?;
    reporter
        .send(HandshakeStep::ConnectionCreated(peer_id, connection.clone()))
        .await;

    connection
        .apply_remote_description(SignalKind::Offer, remote_sdp)
        .await?;
    reporter.reached(HandshakeState::RemoteDescriptionApplied).await;

    connection.create_local_description(SignalKind::Answer).await?;
    reporter.reached(HandshakeState::LocalDescriptionPending).await;

    let sdp = connection.gathering_complete().await?;
    reporter
        .send(HandshakeStep::DescriptionReady(peer_id, sdp))
        .await;
    Ok(())
}

/// Offering side, second half: hand the remote answer to the engine.
pub async fn apply_answer(
    connection: Arc<dyn PeerConnection>,
    peer_id: PeerId,
    remote_sdp: String,
    steps: mpsc::Sender<HandshakeStep>,
) {
    let reporter = StepReporter { peer_id, steps };
    let result = connection
        .apply_remote_description(SignalKind::Answer, remote_sdp)
        .await;
    if result.is_ok() {
        reporter.reached(HandshakeState::RemoteDescriptionApplied).await;
    }
    reporter.finish(result).await;
}
