use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{info, warn};

use lectern_core::{ConnectionId, ParticipantId, RoomId, ServerEvent};

use crate::engagement::{EngagementPolicy, Scorer};
use crate::persistence::PersistenceGateway;
use crate::room::{RemovedSession, RoomCommand, Session, SessionIndex};
use crate::signaling::SignalingOutput;

/// One live classroom session, run as a task owning all mutable state for
/// the room. The command mailbox serializes roster admission, relay
/// delivery, credit mutation and sweep ticks, so concurrent rooms never
/// contend with each other and per-participant ordering is mailbox order.
pub struct Room {
    id: RoomId,
    commands: mpsc::Receiver<RoomCommand>,
    sessions: SessionIndex,
    scorer: Scorer,
    signaling: Arc<dyn SignalingOutput>,
    gateway: Arc<dyn PersistenceGateway>,
}

impl Room {
    pub fn new(
        id: RoomId,
        commands: mpsc::Receiver<RoomCommand>,
        policy: EngagementPolicy,
        signaling: Arc<dyn SignalingOutput>,
        gateway: Arc<dyn PersistenceGateway>,
    ) -> Self {
        Self {
            id,
            commands,
            sessions: SessionIndex::default(),
            scorer: Scorer::new(policy),
            signaling,
            gateway,
        }
    }

    pub async fn run(mut self) {
        info!("Room {} started", self.id);

        // Resume the persisted ledger, if any. A failed load starts the
        // room empty rather than refusing service.
        match self.gateway.load_room(&self.id).await {
            Ok(Some(snapshot)) => self.scorer.hydrate(snapshot.credits),
            Ok(None) => {}
            Err(e) => warn!("Room {}: failed to load persisted state: {}", self.id, e),
        }

        while let Some(cmd) = self.commands.recv().await {
            self.handle_command(cmd).await;
        }

        info!("Room {} stopped", self.id);
    }

    async fn handle_command(&mut self, cmd: RoomCommand) {
        match cmd {
            RoomCommand::AnnounceBroadcaster {
                conn,
                participant_id,
            } => self.announce_broadcaster(conn, participant_id).await,
            RoomCommand::JoinWatcher {
                conn,
                participant_id,
            } => self.join_watcher(conn, participant_id).await,
            RoomCommand::Offer { from, to, sdp } => {
                self.relay_to(&to, ServerEvent::Offer { sdp, from }).await;
            }
            RoomCommand::Answer { from, to, sdp } => {
                self.relay_to(&to, ServerEvent::Answer { sdp, from }).await;
            }
            RoomCommand::Candidate {
                conn,
                from,
                candidate,
            } => {
                self.broadcast_except(conn, ServerEvent::Candidate { candidate, from })
                    .await;
            }
            RoomCommand::EngagementSignal { conn, from, label } => {
                self.apply_signal(conn, from, label).await;
            }
            RoomCommand::Disconnect { conn } => self.disconnect(conn),
            RoomCommand::SweepTick => self.sweep().await,
        }
    }

    async fn announce_broadcaster(&mut self, conn: ConnectionId, participant_id: ParticipantId) {
        info!("Room {}: broadcaster {} announced", self.id, participant_id);

        let displaced = self.sessions.set_broadcaster(Session {
            participant_id,
            conn,
        });
        if let Some(stale) = displaced {
            info!(
                "Room {}: closing superseded broadcaster {}",
                self.id, stale.participant_id
            );
            self.signaling.close(stale.conn).await;
        }
    }

    async fn join_watcher(&mut self, conn: ConnectionId, participant_id: ParticipantId) {
        let rejection = match self.gateway.is_authorized(&self.id, &participant_id).await {
            Ok(true) => None,
            Ok(false) => Some("You are not a member of this classroom."),
            Err(e) => {
                warn!(
                    "Room {}: roster check failed for {}: {}",
                    self.id, participant_id, e
                );
                Some("Classroom membership could not be verified.")
            }
        };

        if let Some(reason) = rejection {
            info!("Room {}: watcher {} rejected", self.id, participant_id);
            self.signaling
                .deliver(
                    conn,
                    ServerEvent::NotAllowed {
                        reason: reason.to_owned(),
                    },
                )
                .await;
            self.signaling.close(conn).await;
            return;
        }

        let displaced = self.sessions.insert_watcher(Session {
            participant_id: participant_id.clone(),
            conn,
        });
        if let Some(stale) = displaced {
            info!(
                "Room {}: watcher {} reconnected, closing stale connection",
                self.id, participant_id
            );
            self.signaling.close(stale.conn).await;
        }

        if let Some(initial) = self.scorer.admit(&participant_id, Instant::now()) {
            self.persist_credit(&participant_id, initial).await;
        }

        info!("Room {}: watcher {} joined", self.id, participant_id);
        self.broadcast_except(
            conn,
            ServerEvent::WatcherJoined {
                watcher_id: participant_id,
            },
        )
        .await;
    }

    /// Targeted delivery by participant identity. A target that is not
    /// currently connected drops the message; nothing is queued.
    async fn relay_to(&self, to: &ParticipantId, event: ServerEvent) {
        let Some(target) = self.sessions.find(to) else {
            return;
        };
        self.signaling.deliver(target.conn, event).await;
    }

    async fn apply_signal(&mut self, conn: ConnectionId, from: ParticipantId, label: String) {
        if let Some(value) = self.scorer.apply_signal(&from, &label) {
            self.persist_credit(&from, value).await;
        }

        // Mirror the signal to the rest of the room either way, so the
        // broadcaster side can surface it live.
        self.broadcast_except(
            conn,
            ServerEvent::EngagementObserved {
                participant_id: from,
                label,
            },
        )
        .await;
    }

    async fn sweep(&mut self) {
        let now = Instant::now();
        for participant_id in self.scorer.due_for_bonus(now) {
            if let Some(value) = self.scorer.apply_duration_bonus(&participant_id) {
                info!(
                    "Room {}: presence bonus granted to {}",
                    self.id, participant_id
                );
                self.persist_credit(&participant_id, value).await;
            }
        }
    }

    fn disconnect(&mut self, conn: ConnectionId) {
        // Credit entries and join records survive the session.
        match self.sessions.remove_conn(conn) {
            Some(RemovedSession::Broadcaster(session)) => {
                info!(
                    "Room {}: broadcaster {} left",
                    self.id, session.participant_id
                );
            }
            Some(RemovedSession::Watcher(session)) => {
                info!("Room {}: watcher {} left", self.id, session.participant_id);
            }
            None => {}
        }
    }

    async fn persist_credit(&self, participant_id: &ParticipantId, value: i64) {
        if let Err(e) = self.gateway.set_credit(&self.id, participant_id, value).await {
            warn!(
                "Room {}: failed to persist credit for {}: {}",
                self.id, participant_id, e
            );
        }
    }

    async fn broadcast_except(&self, sender: ConnectionId, event: ServerEvent) {
        for conn in self.sessions.connections_except(sender) {
            self.signaling.deliver(conn, event.clone()).await;
        }
    }
}
