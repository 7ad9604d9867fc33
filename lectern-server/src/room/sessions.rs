use std::collections::HashMap;

use lectern_core::{ConnectionId, ParticipantId};

/// One live connection bound to a room under a role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub participant_id: ParticipantId,
    pub conn: ConnectionId,
}

/// A session removed by connection identity.
#[derive(Debug)]
pub enum RemovedSession {
    Broadcaster(Session),
    Watcher(Session),
}

/// Connection bookkeeping for one room: the broadcaster slot, a watcher
/// index keyed by participant id, and the reverse index used when a
/// connection drops. Targeted delivery never scans the connection set.
#[derive(Default)]
pub struct SessionIndex {
    broadcaster: Option<Session>,
    watchers: HashMap<ParticipantId, Session>,
    by_conn: HashMap<ConnectionId, ParticipantId>,
}

impl SessionIndex {
    /// Installs `session` as the room's broadcaster, returning the
    /// displaced one if the slot was taken by another connection.
    pub fn set_broadcaster(&mut self, session: Session) -> Option<Session> {
        self.by_conn
            .insert(session.conn, session.participant_id.clone());
        let new_conn = session.conn;
        let displaced = self.broadcaster.replace(session);
        match displaced {
            Some(old) if old.conn != new_conn => {
                self.by_conn.remove(&old.conn);
                Some(old)
            }
            _ => None,
        }
    }

    /// Registers a watcher session, returning the stale session if this
    /// participant was already connected (reconnect).
    pub fn insert_watcher(&mut self, session: Session) -> Option<Session> {
        self.by_conn
            .insert(session.conn, session.participant_id.clone());
        let new_conn = session.conn;
        let displaced = self
            .watchers
            .insert(session.participant_id.clone(), session);
        match displaced {
            Some(old) if old.conn != new_conn => {
                self.by_conn.remove(&old.conn);
                Some(old)
            }
            _ => None,
        }
    }

    /// Removes whatever session owns `conn`. A stale connection id (already
    /// displaced by a reconnect) removes nothing.
    pub fn remove_conn(&mut self, conn: ConnectionId) -> Option<RemovedSession> {
        let participant_id = self.by_conn.remove(&conn)?;
        if self.broadcaster.as_ref().is_some_and(|s| s.conn == conn) {
            return self.broadcaster.take().map(RemovedSession::Broadcaster);
        }
        self.watchers
            .remove(&participant_id)
            .map(RemovedSession::Watcher)
    }

    pub fn broadcaster(&self) -> Option<&Session> {
        self.broadcaster.as_ref()
    }

    /// The live session of `participant_id`, broadcaster or watcher.
    pub fn find(&self, participant_id: &ParticipantId) -> Option<&Session> {
        if let Some(session) = &self.broadcaster {
            if &session.participant_id == participant_id {
                return Some(session);
            }
        }
        self.watchers.get(participant_id)
    }

    /// Every live connection in the room.
    pub fn connections(&self) -> impl Iterator<Item = ConnectionId> + '_ {
        self.broadcaster
            .iter()
            .map(|s| s.conn)
            .chain(self.watchers.values().map(|s| s.conn))
    }

    /// Every live connection except `sender`.
    pub fn connections_except(&self, sender: ConnectionId) -> Vec<ConnectionId> {
        self.connections().filter(|conn| *conn != sender).collect()
    }
}
