use async_trait::async_trait;
use dashmap::DashMap;

use lectern_core::{ParticipantId, RoomId};

use super::gateway::{PersistenceGateway, RoomSnapshot};
use crate::error::PersistenceError;

/// In-process gateway backing the demo binary and tests. Rooms are seeded
/// up front; credit writes land in the same snapshot a later `load_room`
/// returns, so a respawned room actor resumes its ledger.
#[derive(Default)]
pub struct MemoryGateway {
    rooms: DashMap<RoomId, RoomSnapshot>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a room with the given watcher roster.
    pub fn seed_room(&self, room: RoomId, roster: impl IntoIterator<Item = ParticipantId>) {
        let snapshot = RoomSnapshot {
            roster: roster.into_iter().collect(),
            ..RoomSnapshot::default()
        };
        self.rooms.insert(room, snapshot);
    }
}

#[async_trait]
impl PersistenceGateway for MemoryGateway {
    async fn load_room(&self, room: &RoomId) -> Result<Option<RoomSnapshot>, PersistenceError> {
        Ok(self.rooms.get(room).map(|snapshot| snapshot.value().clone()))
    }

    async fn set_credit(
        &self,
        room: &RoomId,
        participant: &ParticipantId,
        value: i64,
    ) -> Result<(), PersistenceError> {
        if let Some(mut snapshot) = self.rooms.get_mut(room) {
            snapshot.credits.insert(participant.clone(), value);
        }
        Ok(())
    }

    async fn is_authorized(
        &self,
        room: &RoomId,
        participant: &ParticipantId,
    ) -> Result<bool, PersistenceError> {
        Ok(self
            .rooms
            .get(room)
            .is_some_and(|snapshot| snapshot.roster.contains(participant)))
    }
}
