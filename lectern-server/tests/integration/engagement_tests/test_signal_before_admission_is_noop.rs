use lectern_core::{ConnectionId, ServerEvent};
use lectern_server::RoomCommand;

use crate::integration::{create_test_room, init_tracing, room_id};
use crate::utils::wait_for_event;

#[tokio::test]
async fn test_signal_before_admission_is_noop() {
    init_tracing();

    let mut room = create_test_room(&["s1"]);
    let teacher_conn = ConnectionId::new();
    let s1_conn = ConnectionId::new();

    room.commands
        .send(RoomCommand::AnnounceBroadcaster {
            conn: teacher_conn,
            participant_id: "t1".into(),
        })
        .await
        .expect("announce");
    room.commands
        .send(RoomCommand::JoinWatcher {
            conn: s1_conn,
            participant_id: "s1".into(),
        })
        .await
        .expect("join");

    // The broadcaster never got a credit entry; a signal attributed to it
    // must not conjure a negative-only entry out of thin air.
    room.commands
        .send(RoomCommand::EngagementSignal {
            conn: teacher_conn,
            from: "t1".into(),
            label: "drowsy".to_owned(),
        })
        .await
        .expect("signal");

    wait_for_event(&mut room.outbound, s1_conn, |e| {
        matches!(e, ServerEvent::EngagementObserved { .. })
    })
    .await
    .expect("signal mirrored");

    assert_eq!(room.gateway.last_credit(&room_id(), &"t1".into()), None);
    // Only the watcher's initialization was ever written.
    assert_eq!(room.gateway.credit_writes(), vec![(room_id(), "s1".into(), 0)]);
}
