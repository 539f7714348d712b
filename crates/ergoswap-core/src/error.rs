use thiserror::Error;

use crate::id::AssetId;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Too many fractional digits: {got}, max {max}")]
    ScaleTooLarge { got: usize, max: u8 },

    #[error("Amount overflow")]
    Overflow,

    #[error("Invalid id length")]
    InvalidIdLength,

    #[error("Hex decode error: {0}")]
    HexDecode(#[from] hex::FromHexError),
}

/// Signals returned by a pool's pricing operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PoolError {
    #[error("Insufficient liquidity")]
    InsufficientLiquidity,

    #[error("Asset {0} is not in pool")]
    AssetNotInPool(AssetId),

    #[error("Pool math overflow")]
    Overflow,
}
