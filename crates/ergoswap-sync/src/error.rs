use thiserror::Error;

use crate::action::GateReason;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Submission blocked: {0}")]
    Blocked(GateReason),

    #[error("Form is incomplete: {0}")]
    Incomplete(&'static str),

    #[error("Core error: {0}")]
    Core(#[from] ergoswap_core::CoreError),
}
