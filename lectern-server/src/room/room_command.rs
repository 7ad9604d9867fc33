use lectern_core::{ConnectionId, ParticipantId};

/// Commands entering a room's mailbox from the signaling layer and the
/// sweep scheduler. The mailbox is the room's exclusive-access boundary:
/// admissions, relay traffic, credit mutations and sweep ticks are all
/// serialized through it.
#[derive(Debug)]
pub enum RoomCommand {
    /// A connection claims the broadcaster slot. No roster precondition;
    /// a previous broadcaster is displaced.
    AnnounceBroadcaster {
        conn: ConnectionId,
        participant_id: ParticipantId,
    },
    /// A connection asks to join as watcher, subject to the roster check.
    JoinWatcher {
        conn: ConnectionId,
        participant_id: ParticipantId,
    },
    /// Session description for one specific participant.
    Offer {
        from: ParticipantId,
        to: ParticipantId,
        sdp: String,
    },
    /// Session description back to the broadcaster.
    Answer {
        from: ParticipantId,
        to: ParticipantId,
        sdp: String,
    },
    /// Network-path candidate, fanned out to everyone except the sender.
    Candidate {
        conn: ConnectionId,
        from: ParticipantId,
        candidate: String,
    },
    /// Client-reported attention signal.
    EngagementSignal {
        conn: ConnectionId,
        from: ParticipantId,
        label: String,
    },
    /// The underlying connection went away.
    Disconnect { conn: ConnectionId },
    /// Periodic presence evaluation.
    SweepTick,
}
