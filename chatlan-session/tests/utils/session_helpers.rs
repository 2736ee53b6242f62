use anyhow::{Context, Result, bail};
use chatlan_core::codec::sdp;
use chatlan_core::{ChatMessage, PeerId, Role, SignalEnvelope, SignalKind};
use chatlan_session::handshake::HandshakeState;
use chatlan_session::transport::PeerEngine;
use chatlan_session::{
    ChannelOutput, HandshakeError, LocalIdentity, Session, SessionConfig, SessionEvent,
    SessionHandle, SignalOutcome,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::Level;

use super::fake_engine::{FakeEngine, fake_sdp};
use super::recording_link::RecordingLink;

/// Timeout for a single session event (ms).
pub const EVENT_TIMEOUT_MS: u64 = 5000;

pub type Events = mpsc::UnboundedReceiver<SessionEvent>;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_test_writer()
        .try_init();
}

pub fn spawn_session(
    role: Role,
    name: &str,
    engine: Arc<dyn PeerEngine>,
    config: SessionConfig,
) -> (SessionHandle, Events) {
    let (output, events) = ChannelOutput::new();
    let identity = LocalIdentity::new(format!("{name}-id"), name);
    let handle = Session::spawn(role, identity, engine, Arc::new(output), config);
    (handle, events)
}

pub fn fake_host(engine: &Arc<FakeEngine>) -> (SessionHandle, Events) {
    spawn_session(Role::Host, "Host", engine.clone(), SessionConfig::default())
}

pub fn fake_guest(engine: &Arc<FakeEngine>, name: &str) -> (SessionHandle, Events) {
    spawn_session(Role::Guest, name, engine.clone(), SessionConfig::default())
}

/// Waits until `pick` accepts an event; other events are skipped.
pub async fn wait_for<T>(
    events: &mut Events,
    timeout_ms: u64,
    mut pick: impl FnMut(SessionEvent) -> Option<T>,
) -> Result<T> {
    let deadline = tokio::time::Instant::now() + Duration::from_millis(timeout_ms);

    loop {
        let event = tokio::time::timeout_at(deadline, events.recv())
            .await
            .context("Timeout waiting for session event")?;
        let Some(event) = event else {
            bail!("Session event channel closed");
        };
        tracing::debug!("[Helper] event: {:?}", event);
        if let Some(found) = pick(event) {
            return Ok(found);
        }
    }
}

pub async fn wait_signal(events: &mut Events) -> Result<(PeerId, SignalKind, String)> {
    wait_for(events, EVENT_TIMEOUT_MS, |e| match e {
        SessionEvent::SignalReady {
            peer_id,
            kind,
            token,
        } => Some((peer_id, kind, token)),
        _ => None,
    })
    .await
}

pub async fn wait_joined(events: &mut Events) -> Result<(PeerId, Option<String>)> {
    wait_for(events, EVENT_TIMEOUT_MS, |e| match e {
        SessionEvent::PeerJoined {
            peer_id,
            display_name,
        } => Some((peer_id, display_name)),
        _ => None,
    })
    .await
}

pub async fn wait_message(events: &mut Events) -> Result<(PeerId, ChatMessage)> {
    wait_for(events, EVENT_TIMEOUT_MS, |e| match e {
        SessionEvent::MessageReceived { from, message } => Some((from, message)),
        _ => None,
    })
    .await
}

pub async fn wait_left(events: &mut Events) -> Result<PeerId> {
    wait_for(events, EVENT_TIMEOUT_MS, |e| match e {
        SessionEvent::PeerLeft { peer_id } => Some(peer_id),
        _ => None,
    })
    .await
}

pub async fn wait_failed(events: &mut Events, timeout_ms: u64) -> Result<(PeerId, HandshakeError)> {
    wait_for(events, timeout_ms, |e| match e {
        SessionEvent::HandshakeFailed { peer_id, error } => Some((peer_id, error)),
        _ => None,
    })
    .await
}

/// Answer token as a Guest on another device would produce it.
pub fn answer_token(name: &str, link_id: Option<PeerId>) -> String {
    let description = sdp::compress(&fake_sdp(900, "active"));
    SignalEnvelope::answer(description, name.to_owned(), link_id).to_token()
}

/// Offer token as a Host on another device would produce it.
pub fn offer_token(name: &str, link_id: PeerId) -> String {
    let description = sdp::compress(&fake_sdp(800, "actpass"));
    SignalEnvelope::offer(description, name.to_owned(), link_id).to_token()
}

/// Full Host-side handshake against the fake engine, up to `PeerJoined`.
pub async fn connect_fake_guest(
    host: &SessionHandle,
    events: &mut Events,
    engine: &FakeEngine,
    name: &str,
) -> Result<(PeerId, Arc<RecordingLink>)> {
    let peer_id = host.create_offer().await?;
    let (ready_id, kind, _) = wait_signal(events).await?;
    assert_eq!((ready_id, kind), (peer_id, SignalKind::Offer));

    let outcome = host.apply_signal(&answer_token(name, Some(peer_id))).await?;
    assert_eq!(outcome, SignalOutcome::Accepted(peer_id));

    let link = engine.open_channel(&peer_id).await;
    let (joined, display_name) = wait_joined(events).await?;
    assert_eq!(joined, peer_id);
    assert_eq!(display_name.as_deref(), Some(name));

    Ok((peer_id, link))
}

/// Polls snapshots until `peer_id`'s handshake reaches `state`.
pub async fn wait_for_state(
    handle: &SessionHandle,
    peer_id: PeerId,
    state: HandshakeState,
) -> Result<()> {
    let start = tokio::time::Instant::now();

    loop {
        let snapshot = handle.snapshot().await?;
        let current = snapshot
            .handshakes
            .iter()
            .find(|h| h.peer_id == peer_id)
            .map(|h| h.state);
        if current == Some(state) {
            return Ok(());
        }
        if start.elapsed() > Duration::from_millis(EVENT_TIMEOUT_MS) {
            bail!("Handshake {peer_id} stuck in {current:?}, wanted {state:?}");
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
