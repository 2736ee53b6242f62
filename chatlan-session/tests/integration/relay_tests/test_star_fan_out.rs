use chatlan_core::{ChatMessage, Frame};

use crate::utils::{FakeEngine, connect_fake_guest, fake_host, init_tracing, wait_message};

#[tokio::test]
async fn test_message_from_a_reaches_b_and_c_once() {
    init_tracing();

    let engine = FakeEngine::new();
    let (host, mut events) = fake_host(&engine);

    let (a, link_a) = connect_fake_guest(&host, &mut events, &engine, "A").await.unwrap();
    let (_, link_b) = connect_fake_guest(&host, &mut events, &engine, "B").await.unwrap();
    let (_, link_c) = connect_fake_guest(&host, &mut events, &engine, "C").await.unwrap();

    let raw = Frame::encode_chat(&ChatMessage::compose("a-id", "A", "hello all")).unwrap();
    engine.deliver(&a, &raw).await;

    let (from, message) = wait_message(&mut events).await.unwrap();
    assert_eq!(from, a);
    assert_eq!(message.sender_name, "A");
    assert_eq!(message.text, "hello all");

    assert!(link_a.sent().is_empty());
    assert_eq!(link_b.sent(), vec![raw.clone()]);
    assert_eq!(link_c.sent(), vec![raw]);

    let snapshot = host.snapshot().await.unwrap();
    assert_eq!(snapshot.messages, vec![message]);
}

#[tokio::test]
async fn test_closed_channel_is_left_out_of_relay() {
    init_tracing();

    let engine = FakeEngine::new();
    let (host, mut events) = fake_host(&engine);

    let (a, _) = connect_fake_guest(&host, &mut events, &engine, "A").await.unwrap();
    let (_, link_b) = connect_fake_guest(&host, &mut events, &engine, "B").await.unwrap();
    let (_, link_c) = connect_fake_guest(&host, &mut events, &engine, "C").await.unwrap();
    link_c.close();

    let raw = Frame::encode_chat(&ChatMessage::compose("a-id", "A", "still here?")).unwrap();
    engine.deliver(&a, &raw).await;
    wait_message(&mut events).await.unwrap();

    assert_eq!(link_b.sent().len(), 1);
    assert!(link_c.sent().is_empty());
}

#[tokio::test]
async fn test_unknown_frames_are_not_relayed() {
    init_tracing();

    let engine = FakeEngine::new();
    let (host, mut events) = fake_host(&engine);

    let (a, _) = connect_fake_guest(&host, &mut events, &engine, "A").await.unwrap();
    let (_, link_b) = connect_fake_guest(&host, &mut events, &engine, "B").await.unwrap();

    engine.deliver(&a, r#"{"type":"typing","payload":null}"#).await;
    engine.deliver(&a, "not json at all").await;

    let raw = Frame::encode_chat(&ChatMessage::compose("a-id", "A", "real")).unwrap();
    engine.deliver(&a, &raw).await;
    let (_, message) = wait_message(&mut events).await.unwrap();

    assert_eq!(message.text, "real");
    assert_eq!(link_b.sent(), vec![raw]);
}
