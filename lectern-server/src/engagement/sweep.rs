use std::time::Duration;
use tokio::time::{self, MissedTickBehavior};
use tracing::debug;

use crate::room::RoomManager;

/// Drives the recurring presence sweep.
///
/// Each tick fans an independent command out to every live room; the rooms
/// evaluate their own join records inside their own mailboxes, so one
/// room's failure never touches another's.
pub async fn run_sweep(rooms: RoomManager, interval: Duration) {
    let mut ticker = time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;
        debug!("Presence sweep tick");
        rooms.sweep_all();
    }
}
