use std::collections::HashMap;
use std::sync::Arc;

use lectern_core::{ConnectionId, ServerEvent};
use lectern_server::{EngagementPolicy, RoomCommand, RoomSnapshot};

use crate::integration::{init_tracing, room_id, spawn_room};
use crate::utils::{MockGateway, MockSignalingOutput, wait_for_event};

/// A room actor coming up finds the persisted ledger and keeps counting
/// from it; the credit entry is never reinitialized to zero.
#[tokio::test]
async fn test_persisted_credits_resume() {
    init_tracing();

    let (signaling, mut outbound) = MockSignalingOutput::new();
    let gateway = Arc::new(MockGateway::new());
    gateway.allow(room_id(), "s1".into());
    gateway.set_snapshot(
        room_id(),
        RoomSnapshot {
            credits: HashMap::from([("s1".into(), -7)]),
            ..RoomSnapshot::default()
        },
    );

    let commands = spawn_room(room_id(), &signaling, &gateway, EngagementPolicy::default());
    let teacher_conn = ConnectionId::new();
    let s1_conn = ConnectionId::new();

    commands
        .send(RoomCommand::AnnounceBroadcaster {
            conn: teacher_conn,
            participant_id: "t1".into(),
        })
        .await
        .expect("announce");
    commands
        .send(RoomCommand::JoinWatcher {
            conn: s1_conn,
            participant_id: "s1".into(),
        })
        .await
        .expect("join");
    commands
        .send(RoomCommand::EngagementSignal {
            conn: s1_conn,
            from: "s1".into(),
            label: "distracted".to_owned(),
        })
        .await
        .expect("signal");
    wait_for_event(&mut outbound, teacher_conn, |e| {
        matches!(e, ServerEvent::EngagementObserved { .. })
    })
    .await
    .expect("signal mirrored");

    // No zero-initialization write; the first write continues the old total.
    let values: Vec<i64> = gateway
        .credit_writes()
        .iter()
        .map(|(_, _, value)| *value)
        .collect();
    assert_eq!(values, vec![-8]);
}
