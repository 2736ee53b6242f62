use chatlan_core::{PeerId, SignalEnvelope};
use chatlan_session::{EngineError, HandshakeError, SignalOutcome};
use std::time::Duration;

use crate::utils::{
    EVENT_TIMEOUT_MS, FakeEngine, fake_guest, init_tracing, offer_token, wait_failed,
    wait_signal,
};

#[tokio::test]
async fn test_header_only_offer_fails_that_handshake_only() {
    init_tracing();

    let engine = FakeEngine::new();
    let (guest, mut events) = fake_guest(&engine, "Ana");

    // Decodes fine but reconstructs to a description with no ICE credentials.
    let hollow = SignalEnvelope::offer(String::new(), "Host".into(), PeerId::new()).to_token();
    let SignalOutcome::Accepted(peer_id) = guest.apply_signal(&hollow).await.unwrap() else {
        panic!("hollow offer still decodes");
    };

    let (failed, error) = wait_failed(&mut events, EVENT_TIMEOUT_MS).await.unwrap();
    assert_eq!(failed, peer_id);
    assert!(matches!(
        error,
        HandshakeError::Engine(EngineError::Rejected(_))
    ));
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(engine.connection(&peer_id).unwrap().is_closed());

    let snapshot = guest.snapshot().await.unwrap();
    assert!(snapshot.handshakes.is_empty());
    assert!(snapshot.peers.is_empty());

    // The failed attempt does not count as a link.
    let retry = guest.apply_signal(&offer_token("Host", PeerId::new())).await.unwrap();
    assert!(matches!(retry, SignalOutcome::Accepted(_)));
    wait_signal(&mut events).await.unwrap();
}
