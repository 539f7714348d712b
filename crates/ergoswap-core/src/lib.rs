//! ErgoSwap Core - Assets, amounts and pool capabilities
//!
//! This crate provides the foundational types shared by the swap form:
//! asset identifiers, decimal token amounts, the pool pricing capability,
//! fee policy and wallet balance snapshots.

pub mod amount;
pub mod asset;
pub mod balance;
pub mod error;
pub mod fee;
pub mod id;
pub mod pool;

pub use amount::{Amount, TokenAmount, MAX_SCALE};
pub use asset::{Asset, AssetAmount, NATIVE_DECIMALS, NATIVE_NAME};
pub use balance::Balance;
pub use error::{CoreError, PoolError};
pub use fee::FeePolicy;
pub use id::{AssetId, PoolId};
pub use pool::{compute_pool_id, CpmmPool, Pool, SharedPool, DEFAULT_FEE_NUM, FEE_DENOM};
