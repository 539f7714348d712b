//! ErgoSwap Sources - Pool, balance and asset data feeds
//!
//! The swap form consumes its data through the traits in [`source`]. Each
//! lookup is a stream so that later updates reach the form without a new
//! request. [`MemoryMarket`] serves all three from in-memory state.

pub mod config;
pub mod error;
pub mod memory;
pub mod source;

pub use config::{MarketConfig, PoolEntry};
pub use error::SourceError;
pub use memory::MemoryMarket;
pub use source::{AssetCatalog, BalanceSource, PoolSource};
