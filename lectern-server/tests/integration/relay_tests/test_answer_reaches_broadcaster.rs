use lectern_core::{ConnectionId, ServerEvent};
use lectern_server::RoomCommand;

use crate::integration::{create_test_room, init_tracing};
use crate::utils::wait_for_event;

#[tokio::test]
async fn test_answer_reaches_broadcaster() {
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

    room.commands
        .send(RoomCommand::Answer {
            from: "s1".into(),
            to: "t1".into(),
            sdp: "v=0 answer".to_owned(),
        })
        .await
        .expect("answer");

    let event = wait_for_event(&mut room.outbound, teacher_conn, |e| {
        matches!(e, ServerEvent::Answer { .. })
    })
    .await
    .expect("answer at broadcaster");
    assert_eq!(
        event,
        ServerEvent::Answer {
            sdp: "v=0 answer".to_owned(),
            from: "s1".into()
        }
    );
}
