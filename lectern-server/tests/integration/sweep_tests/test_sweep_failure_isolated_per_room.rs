use std::sync::Arc;
use std::time::Duration;

use lectern_core::{ConnectionId, RoomId, ServerEvent};
use lectern_server::{EngagementPolicy, RoomCommand};
use tokio::sync::mpsc;

use crate::integration::{init_tracing, spawn_room};
use crate::utils::{MockGateway, MockSignalingOutput, Outbound, wait_for_event};

/// A persistence failure in one room must not abort the sweep for others,
/// and must not kill the failing room's actor either.
#[tokio::test(start_paused = true)]
async fn test_sweep_failure_isolated_per_room() {
    init_tracing();

    let (signaling, mut outbound) = MockSignalingOutput::new();
    let gateway = Arc::new(MockGateway::new());
    let room_a = RoomId::from("room-a");
    let room_b = RoomId::from("room-b");
    gateway.allow(room_a.clone(), "s1".into());
    gateway.allow(room_b.clone(), "s2".into());

    let commands_a = spawn_room(room_a.clone(), &signaling, &gateway, EngagementPolicy::default());
    let commands_b = spawn_room(room_b.clone(), &signaling, &gateway, EngagementPolicy::default());

    let teacher_a = ConnectionId::new();
    let teacher_b = ConnectionId::new();
    let s1_conn = ConnectionId::new();
    let s2_conn = ConnectionId::new();

    join_room(&commands_a, teacher_a, s1_conn, "s1", &mut outbound).await;
    join_room(&commands_b, teacher_b, s2_conn, "s2", &mut outbound).await;

    tokio::time::advance(Duration::from_secs(31 * 60)).await;

    // Only room-a's store is broken when the sweep fires.
    gateway.fail_writes_for(room_a.clone());
    commands_a.send(RoomCommand::SweepTick).await.expect("tick a");
    commands_b.send(RoomCommand::SweepTick).await.expect("tick b");

    // Both rooms still answer relay traffic after the tick.
    probe(&commands_a, s1_conn, "s1", &mut outbound).await;
    probe(&commands_b, s2_conn, "s2", &mut outbound).await;

    // room-b's bonus landed; room-a's write failed but stayed in memory.
    assert_eq!(gateway.last_credit(&room_b, &"s2".into()), Some(100));
    assert_eq!(gateway.last_credit(&room_a, &"s1".into()), Some(0));
}

async fn join_room(
    commands: &mpsc::Sender<RoomCommand>,
    teacher_conn: ConnectionId,
    watcher_conn: ConnectionId,
    watcher: &str,
    outbound: &mut mpsc::UnboundedReceiver<Outbound>,
) {
    commands
        .send(RoomCommand::AnnounceBroadcaster {
            conn: teacher_conn,
            participant_id: "t1".into(),
        })
        .await
        .expect("announce");
    commands
        .send(RoomCommand::JoinWatcher {
            conn: watcher_conn,
            participant_id: watcher.into(),
        })
        .await
        .expect("join");
    wait_for_event(outbound, teacher_conn, |e| {
        matches!(e, ServerEvent::WatcherJoined { .. })
    })
    .await
    .expect("watcher-joined");
}

async fn probe(
    commands: &mpsc::Sender<RoomCommand>,
    watcher_conn: ConnectionId,
    watcher: &str,
    outbound: &mut mpsc::UnboundedReceiver<Outbound>,
) {
    commands
        .send(RoomCommand::Offer {
            from: "t1".into(),
            to: watcher.into(),
            sdp: "v=0 probe".to_owned(),
        })
        .await
        .expect("probe offer");
    wait_for_event(outbound, watcher_conn, |e| {
        matches!(e, ServerEvent::Offer { .. })
    })
    .await
    .expect("probe offer delivered");
}
