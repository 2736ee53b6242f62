use chatlan_core::codec::sdp;
use chatlan_core::{PeerId, SignalEnvelope, SignalKind};
use chatlan_session::handshake::{HandshakePath, HandshakeState};
use chatlan_session::transport::ChannelMode;
use chatlan_session::SignalOutcome;

use crate::utils::{
    FakeEngine, fake_guest, fake_sdp, init_tracing, offer_token, wait_joined, wait_signal,
};

#[tokio::test]
async fn test_guest_applies_offer_and_echoes_link_id() {
    init_tracing();

    let engine = FakeEngine::new();
    let (guest, mut events) = fake_guest(&engine, "Ana");
    let link_id = PeerId::new();

    let SignalOutcome::Accepted(host_id) = guest.apply_signal(&offer_token("Host", link_id)).await.unwrap()
    else {
        panic!("offer should be accepted");
    };
    // The Guest keys the link by its own id and only echoes the Host's.
    assert_ne!(host_id, link_id);

    let (ready_id, kind, token) = wait_signal(&mut events).await.expect("no answer");
    assert_eq!(ready_id, host_id);
    assert_eq!(kind, SignalKind::Answer);

    let envelope = SignalEnvelope::from_token(&token).unwrap();
    assert_eq!(envelope.kind, SignalKind::Answer);
    assert_eq!(envelope.display_name, "Ana");
    assert_eq!(envelope.link_id, Some(link_id));
    assert!(envelope.description.contains("s:active"));

    let connection = engine.connection(&host_id).unwrap();
    assert_eq!(connection.mode, ChannelMode::Accept);
    let (remote_kind, remote_sdp) = connection.remote().expect("offer applied");
    assert_eq!(remote_kind, SignalKind::Offer);
    assert_eq!(
        remote_sdp,
        sdp::reconstruct(&sdp::compress(&fake_sdp(800, "actpass")))
    );
}

#[tokio::test]
async fn test_guest_reaches_channel_open_with_host_name() {
    init_tracing();

    let engine = FakeEngine::new();
    let (guest, mut events) = fake_guest(&engine, "Ana");

    let SignalOutcome::Accepted(host_id) = guest
        .apply_signal(&offer_token("Hostess", PeerId::new()))
        .await
        .unwrap()
    else {
        panic!("offer should be accepted");
    };
    wait_signal(&mut events).await.unwrap();

    engine.open_channel(&host_id).await;
    let (joined, name) = wait_joined(&mut events).await.unwrap();
    assert_eq!(joined, host_id);
    assert_eq!(name.as_deref(), Some("Hostess"));

    let snapshot = guest.snapshot().await.unwrap();
    assert_eq!(snapshot.handshakes[0].path, HandshakePath::Answering);
    assert_eq!(snapshot.handshakes[0].state, HandshakeState::ChannelOpen);
    assert_eq!(snapshot.connected_peers().count(), 1);
}
