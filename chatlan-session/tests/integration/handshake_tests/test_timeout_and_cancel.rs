use chatlan_core::{PeerId, Role};
use chatlan_session::handshake::HandshakeState;
use chatlan_session::{HandshakeError, SessionConfig};
use std::time::Duration;

use crate::utils::{
    EVENT_TIMEOUT_MS, FakeEngine, fake_host, init_tracing, spawn_session, wait_failed,
    wait_signal,
};

#[tokio::test(start_paused = true)]
async fn test_stalled_handshake_times_out() {
    init_tracing();

    let engine = FakeEngine::stalling();
    let config = SessionConfig {
        handshake_timeout: Duration::from_secs(30),
        ..SessionConfig::default()
    };
    let (host, mut events) = spawn_session(Role::Host, "Host", engine.clone(), config);

    let peer_id = host.create_offer().await.unwrap();

    let (failed, error) = wait_failed(&mut events, 60_000).await.unwrap();
    assert_eq!(failed, peer_id);
    assert!(matches!(
        error,
        HandshakeError::TimedOut(HandshakeState::LocalDescriptionPending)
    ));
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(engine.connection(&peer_id).unwrap().is_closed());

    let snapshot = host.snapshot().await.unwrap();
    assert!(snapshot.handshakes.is_empty());
    assert!(snapshot.peers.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_ready_offer_still_expires_without_answer() {
    init_tracing();

    let engine = FakeEngine::new();
    let (host, mut events) = fake_host(&engine);

    let peer_id = host.create_offer().await.unwrap();
    wait_signal(&mut events).await.unwrap();

    let (failed, error) = wait_failed(&mut events, 200_000).await.unwrap();
    assert_eq!(failed, peer_id);
    assert!(matches!(
        error,
        HandshakeError::TimedOut(HandshakeState::LocalDescriptionReady)
    ));
}

#[tokio::test]
async fn test_cancel_closes_pending_handshake() {
    init_tracing();

    let engine = FakeEngine::new();
    let (host, mut events) = fake_host(&engine);

    let peer_id = host.create_offer().await.unwrap();
    wait_signal(&mut events).await.unwrap();

    assert!(host.cancel(peer_id).await.unwrap());
    let (failed, error) = wait_failed(&mut events, EVENT_TIMEOUT_MS).await.unwrap();
    assert_eq!(failed, peer_id);
    assert!(matches!(error, HandshakeError::Cancelled));

    // close runs on a background task
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(engine.connection(&peer_id).unwrap().is_closed());

    assert!(!host.cancel(peer_id).await.unwrap());
    assert!(!host.cancel(PeerId::new()).await.unwrap());
}
