use async_trait::async_trait;
use axum::extract::ws::Message;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, warn};

use lectern_core::{ConnectionId, ServerEvent};

use super::SignalingOutput;

struct SignalingInner {
    connections: DashMap<ConnectionId, mpsc::UnboundedSender<Message>>,
}

/// Owns the connection-id → WebSocket sender map. Cloned into every
/// connection task, and handed to room actors as their `SignalingOutput`.
#[derive(Clone)]
pub struct SignalingService {
    inner: Arc<SignalingInner>,
}

impl SignalingService {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(SignalingInner {
                connections: DashMap::new(),
            }),
        }
    }

    pub fn add_connection(&self, conn: ConnectionId, tx: mpsc::UnboundedSender<Message>) {
        self.inner.connections.insert(conn, tx);
    }

    pub fn remove_connection(&self, conn: &ConnectionId) {
        self.inner.connections.remove(conn);
    }

    fn send(&self, conn: ConnectionId, event: &ServerEvent) {
        let Some(tx) = self.inner.connections.get(&conn) else {
            warn!("Dropped event for disconnected connection {}", conn);
            return;
        };
        match serde_json::to_string(event) {
            Ok(json) => {
                if tx.send(Message::Text(json.into())).is_err() {
                    warn!("Outbound channel closed for connection {}", conn);
                }
            }
            Err(e) => error!("Failed to serialize server event: {}", e),
        }
    }
}

impl Default for SignalingService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SignalingOutput for SignalingService {
    async fn deliver(&self, conn: ConnectionId, event: ServerEvent) {
        self.send(conn, &event);
    }

    async fn close(&self, conn: ConnectionId) {
        if let Some((_, tx)) = self.inner.connections.remove(&conn) {
            let _ = tx.send(Message::Close(None));
        }
    }
}
