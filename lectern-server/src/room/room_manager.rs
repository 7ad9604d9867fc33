use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};

use lectern_core::RoomId;

use crate::engagement::EngagementPolicy;
use crate::persistence::PersistenceGateway;
use crate::room::{Room, RoomCommand};
use crate::signaling::SignalingOutput;

/// Spawns room actors on demand and hands out their mailboxes.
#[derive(Clone)]
pub struct RoomManager {
    rooms: Arc<DashMap<RoomId, mpsc::Sender<RoomCommand>>>,
    policy: EngagementPolicy,
    signaling: Arc<dyn SignalingOutput>,
    gateway: Arc<dyn PersistenceGateway>,
}

impl RoomManager {
    pub fn new(
        policy: EngagementPolicy,
        signaling: Arc<dyn SignalingOutput>,
        gateway: Arc<dyn PersistenceGateway>,
    ) -> Self {
        Self {
            rooms: Arc::new(DashMap::new()),
            policy,
            signaling,
            gateway,
        }
    }

    /// Returns the mailbox for `room`, spawning its actor on first use.
    pub fn room_sender(&self, room: &RoomId) -> mpsc::Sender<RoomCommand> {
        self.rooms
            .entry(room.clone())
            .or_insert_with(|| {
                info!("Creating room {}", room);
                let (tx, rx) = mpsc::channel(100);
                let actor = Room::new(
                    room.clone(),
                    rx,
                    self.policy.clone(),
                    self.signaling.clone(),
                    self.gateway.clone(),
                );
                tokio::spawn(actor.run());
                tx
            })
            .clone()
    }

    /// Fans one sweep tick out to every live room. Failure to reach one
    /// room's mailbox does not stop the others.
    pub fn sweep_all(&self) {
        for entry in self.rooms.iter() {
            if let Err(e) = entry.value().try_send(RoomCommand::SweepTick) {
                warn!("Room {}: sweep tick dropped: {}", entry.key(), e);
            }
        }
    }
}
