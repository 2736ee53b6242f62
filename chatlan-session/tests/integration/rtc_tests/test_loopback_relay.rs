use chatlan_core::Role;

use crate::utils::{init_tracing, link_rtc_sessions, rtc_session, wait_message};

#[tokio::test]
async fn test_host_relays_between_two_real_guests() {
    init_tracing();

    let (host, mut host_events) = rtc_session(Role::Host, "Host").expect("host engine");
    let (ana, mut ana_events) = rtc_session(Role::Guest, "Ana").expect("guest engine");
    let (bea, mut bea_events) = rtc_session(Role::Guest, "Bea").expect("guest engine");

    let ana_ids = link_rtc_sessions(&host, &mut host_events, &ana, &mut ana_events)
        .await
        .expect("Failed to link Ana");
    link_rtc_sessions(&host, &mut host_events, &bea, &mut bea_events)
        .await
        .expect("Failed to link Bea");

    let sent = ana.send_chat("anyone out there?").await.expect("send failed");

    let (from, on_host) = wait_message(&mut host_events).await.expect("host got nothing");
    assert_eq!(from, ana_ids.guest_on_host);
    assert_eq!(on_host, sent);

    let (_, on_bea) = wait_message(&mut bea_events).await.expect("relay never arrived");
    assert_eq!(on_bea, sent);
    assert_eq!(on_bea.sender_name, "Ana");

    let snapshot = ana.snapshot().await.unwrap();
    assert_eq!(snapshot.messages, vec![sent]);

    for session in [&ana, &bea, &host] {
        session.shutdown().await;
    }
}
