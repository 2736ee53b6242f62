use chatlan_core::{PeerId, SignalKind};
use chatlan_session::handshake::HandshakeState;
use chatlan_session::{IgnoreReason, SignalOutcome};

use crate::utils::{
    FakeEngine, answer_token, fake_host, init_tracing, wait_for_state, wait_signal,
};

#[tokio::test]
async fn test_answer_with_link_id_goes_to_its_offer() {
    init_tracing();

    let engine = FakeEngine::new();
    let (host, mut events) = fake_host(&engine);

    let first = host.create_offer().await.unwrap();
    let second = host.create_offer().await.unwrap();
    wait_signal(&mut events).await.unwrap();
    wait_signal(&mut events).await.unwrap();

    let outcome = host.apply_signal(&answer_token("Bea", Some(second))).await.unwrap();
    assert_eq!(outcome, SignalOutcome::Accepted(second));
    wait_for_state(&host, second, HandshakeState::RemoteDescriptionApplied)
        .await
        .unwrap();

    let (kind, _) = engine.connection(&second).unwrap().remote().expect("answer applied");
    assert_eq!(kind, SignalKind::Answer);
    assert!(engine.connection(&first).unwrap().remote().is_none());

    // Already consumed.
    let again = host.apply_signal(&answer_token("Bea", Some(second))).await.unwrap();
    assert_eq!(again, SignalOutcome::Ignored(IgnoreReason::NoPendingOffer));
}

#[tokio::test]
async fn test_answer_for_unknown_link_is_discarded() {
    init_tracing();

    let engine = FakeEngine::new();
    let (host, mut events) = fake_host(&engine);
    host.create_offer().await.unwrap();
    wait_signal(&mut events).await.unwrap();

    let outcome = host
        .apply_signal(&answer_token("Bea", Some(PeerId::new())))
        .await
        .unwrap();
    assert_eq!(outcome, SignalOutcome::Ignored(IgnoreReason::NoPendingOffer));
}

#[tokio::test]
async fn test_answer_without_link_id_needs_a_single_candidate() {
    init_tracing();

    let engine = FakeEngine::new();
    let (host, mut events) = fake_host(&engine);

    let none = host.apply_signal(&answer_token("Old", None)).await.unwrap();
    assert_eq!(none, SignalOutcome::Ignored(IgnoreReason::NoPendingOffer));

    let first = host.create_offer().await.unwrap();
    wait_signal(&mut events).await.unwrap();
    let second = host.create_offer().await.unwrap();
    wait_signal(&mut events).await.unwrap();

    let ambiguous = host.apply_signal(&answer_token("Old", None)).await.unwrap();
    assert_eq!(ambiguous, SignalOutcome::Ignored(IgnoreReason::Ambiguous));

    host.apply_signal(&answer_token("Bea", Some(first))).await.unwrap();

    let single = host.apply_signal(&answer_token("Old", None)).await.unwrap();
    assert_eq!(single, SignalOutcome::Accepted(second));
}
