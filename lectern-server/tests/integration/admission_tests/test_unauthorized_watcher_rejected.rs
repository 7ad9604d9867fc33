use lectern_core::{ConnectionId, ServerEvent};
use lectern_server::RoomCommand;

use crate::integration::{create_test_room, init_tracing};
use crate::utils::{wait_for_close, wait_for_event};

#[tokio::test]
async fn test_unauthorized_watcher_rejected() {
    init_tracing();

    let mut room = create_test_room(&["s1"]);
    let s2_conn = ConnectionId::new();

    room.commands
        .send(RoomCommand::JoinWatcher {
            conn: s2_conn,
            participant_id: "s2".into(),
        })
        .await
        .expect("join");

    let event = wait_for_event(&mut room.outbound, s2_conn, |e| {
        matches!(e, ServerEvent::NotAllowed { .. })
    })
    .await
    .expect("not-allowed");
    assert_eq!(
        event,
        ServerEvent::NotAllowed {
            reason: "You are not a member of this classroom.".to_owned()
        }
    );
    wait_for_close(&mut room.outbound, s2_conn)
        .await
        .expect("close");

    // No credit entry or join record was left behind.
    assert!(room.gateway.credit_writes().is_empty());
}
