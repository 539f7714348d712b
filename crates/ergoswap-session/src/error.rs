use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session is closed")]
    Closed,

    #[error("Sync error: {0}")]
    Sync(#[from] ergoswap_sync::SyncError),

    #[error("Core error: {0}")]
    Core(#[from] ergoswap_core::CoreError),

    #[error("Control is read-only: {0}")]
    ReadOnly(&'static str),

    #[error("Confirmation step dropped without an outcome")]
    ConfirmationDropped,

    #[error("Session task failed: {0}")]
    Task(String),
}
