use chatlan_core::Role;

use crate::utils::{init_tracing, link_rtc_sessions, rtc_session, wait_message};

#[tokio::test]
async fn test_guest_hi_reaches_host_with_guest_name() {
    init_tracing();

    let (host, mut host_events) = rtc_session(Role::Host, "Host").expect("host engine");
    let (guest, mut guest_events) = rtc_session(Role::Guest, "Ana").expect("guest engine");

    let ids = link_rtc_sessions(&host, &mut host_events, &guest, &mut guest_events)
        .await
        .expect("Failed to link sessions");

    guest.send_chat("hi").await.expect("send failed");

    let (from, message) = wait_message(&mut host_events).await.expect("host got nothing");
    assert_eq!(from, ids.guest_on_host);
    assert_eq!(message.text, "hi");
    assert_eq!(message.sender_name, "Ana");

    host.send_chat("hola Ana").await.expect("send failed");
    let (from, message) = wait_message(&mut guest_events).await.expect("guest got nothing");
    assert_eq!(from, ids.host_on_guest);
    assert_eq!(message.sender_name, "Host");

    guest.shutdown().await;
    host.shutdown().await;
}
