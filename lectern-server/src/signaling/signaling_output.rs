use async_trait::async_trait;

use lectern_core::{ConnectionId, ServerEvent};

/// Outbound side of the signaling channel, implemented by the transport
/// layer so room actors can push events and hang up connections without
/// knowing about sockets.
#[async_trait]
pub trait SignalingOutput: Send + Sync {
    /// Delivers `event` to one connection. Delivery to a connection that
    /// already went away is dropped, never queued or retried.
    async fn deliver(&self, conn: ConnectionId, event: ServerEvent);

    /// Closes the connection after any pending deliveries.
    async fn close(&self, conn: ConnectionId);
}
