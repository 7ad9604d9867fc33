use async_trait::async_trait;
use std::collections::{HashMap, HashSet};

use lectern_core::{ParticipantId, RoomId};

use crate::error::PersistenceError;

/// Durable view of one room, as read back from storage.
#[derive(Debug, Clone, Default)]
pub struct RoomSnapshot {
    /// Participant ids allowed to join as watcher.
    pub roster: HashSet<ParticipantId>,
    pub broadcaster_id: Option<ParticipantId>,
    /// Credit ledger; entries may be negative.
    pub credits: HashMap<ParticipantId, i64>,
}

/// Read/write contract the coordinator needs from the durable store.
///
/// The coordinator never owns the database. Roster membership, ledger
/// snapshots and credit writes all go through this interface, and no
/// transactional guarantee is assumed of it.
#[async_trait]
pub trait PersistenceGateway: Send + Sync {
    /// Loads the persisted state of `room`, or `None` if the store has
    /// never seen it.
    async fn load_room(&self, room: &RoomId) -> Result<Option<RoomSnapshot>, PersistenceError>;

    /// Writes one participant's current credit value.
    async fn set_credit(
        &self,
        room: &RoomId,
        participant: &ParticipantId,
        value: i64,
    ) -> Result<(), PersistenceError>;

    /// Whether `participant` is on the watcher roster of `room`.
    async fn is_authorized(
        &self,
        room: &RoomId,
        participant: &ParticipantId,
    ) -> Result<bool, PersistenceError>;
}
