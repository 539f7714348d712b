//! ErgoSwap Sync - Swap form state and submit gating
//!
//! This crate holds the swap form model, the single-owner reducer that keeps
//! the `from` and `to` fields consistent with the selected pool, and the
//! strategies that decide whether the form may be submitted.

pub mod action;
pub mod error;
pub mod event;
pub mod lookup;
pub mod model;
pub mod selection;
pub mod strategy;
pub mod synchronizer;

pub use action::{check, evaluate, submit, ActionState, GateReason};
pub use error::SyncError;
pub use event::{Command, FormEvent};
pub use lookup::{LookupTracker, QueryKey, Ticket};
pub use model::{FieldValue, FormModel, FormSnapshot, FormValues, Side};
pub use selection::select_best_pool;
pub use strategy::{ActionStrategy, ConfirmationRequest, Leg, Operation, SwapStrategy};
pub use synchronizer::Synchronizer;
