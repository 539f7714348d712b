use ergoswap_sync::ConfirmationRequest;
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;
use tracing::info;

/// How the confirmation step ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfirmationOutcome {
    Confirmed,
    Cancelled,
}

/// Receives a validated swap and reports back once the user is done with it.
///
/// Implementations own `done` and must either send an outcome or drop it;
/// a dropped sender surfaces as `SessionError::ConfirmationDropped`.
pub trait ConfirmationStep: Send + Sync {
    fn open(&self, request: ConfirmationRequest, done: oneshot::Sender<ConfirmationOutcome>);
}

/// Confirms (or cancels) every request immediately
#[derive(Debug, Clone, Copy)]
pub struct AutoConfirm {
    outcome: ConfirmationOutcome,
}

impl AutoConfirm {
    pub fn confirming() -> Self {
        AutoConfirm {
            outcome: ConfirmationOutcome::Confirmed,
        }
    }

    pub fn cancelling() -> Self {
        AutoConfirm {
            outcome: ConfirmationOutcome::Cancelled,
        }
    }
}

impl Default for AutoConfirm {
    fn default() -> Self {
        Self::confirming()
    }
}

impl ConfirmationStep for AutoConfirm {
    fn open(&self, request: ConfirmationRequest, done: oneshot::Sender<ConfirmationOutcome>) {
        info!(
            "Confirmation: {} {} -> {} {} ({:?})",
            request.from.amount, request.from.asset.name, request.to.amount, request.to.asset.name,
            self.outcome
        );
        // Receiver may already be gone if the caller gave up
        let _ = done.send(self.outcome);
    }
}
