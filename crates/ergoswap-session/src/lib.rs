//! ErgoSwap Session - Async runtime around the swap form
//!
//! [`SwapSession`] owns the synchronizer on a tokio task and runs the
//! lookups it asks for. [`TokenControl`] is one amount/asset input with a
//! live wallet balance, and [`ConfirmationStep`] is where a submitted swap
//! is handed off.

pub mod confirmation;
pub mod error;
pub mod session;
pub mod token_control;

pub use confirmation::{AutoConfirm, ConfirmationOutcome, ConfirmationStep};
pub use error::SessionError;
pub use session::{SessionHandle, SessionState, Sources, Submission, SwapSession};
pub use token_control::{ReadOnly, TokenControl};
