use thiserror::Error;

/// Failures surfaced by a persistence gateway implementation.
///
/// The coordinator absorbs these: writes are best-effort and the in-memory
/// state stays authoritative, so a failed write is logged and the live
/// signaling path keeps going.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("persistence backend error: {0}")]
    Backend(#[from] anyhow::Error),
}
