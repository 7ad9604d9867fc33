use serde::{Deserialize, Serialize};

use crate::model::{ParticipantId, RoomId};

/// Events a client may send over the signaling socket.
///
/// The sender identity for relays and engagement signals is the identity
/// bound at announce/join time; payload fields never override it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", content = "d", rename_all = "kebab-case")]
pub enum ClientEvent {
    /// Claim the broadcaster slot of a room.
    AnnounceBroadcaster {
        room: RoomId,
        participant_id: ParticipantId,
    },
    /// Ask to join a room as watcher, subject to the roster check.
    JoinWatcher {
        room: RoomId,
        participant_id: ParticipantId,
    },
    /// Session description for one specific watcher.
    Offer {
        room: RoomId,
        to: ParticipantId,
        sdp: String,
    },
    /// Session description back to the broadcaster.
    Answer {
        room: RoomId,
        to: ParticipantId,
        sdp: String,
    },
    /// Network-path candidate for everyone else in the room.
    Candidate { room: RoomId, candidate: String },
    /// Client-reported attention category.
    EngagementSignal { room: RoomId, label: String },
}

/// Events the coordinator pushes to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", content = "d", rename_all = "kebab-case")]
pub enum ServerEvent {
    /// Join rejected; the connection is closed right after this.
    NotAllowed { reason: String },
    Offer { sdp: String, from: ParticipantId },
    Answer { sdp: String, from: ParticipantId },
    Candidate {
        candidate: String,
        from: ParticipantId,
    },
    /// A watcher is admitted and ready to negotiate.
    WatcherJoined { watcher_id: ParticipantId },
    /// An attention signal observed for a participant, mirrored to the room.
    EngagementObserved {
        participant_id: ParticipantId,
        label: String,
    },
}
