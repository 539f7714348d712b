use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::asset::AssetAmount;
use crate::error::PoolError;
use crate::id::{AssetId, PoolId};

/// Fee denominator for constant-product pools
pub const FEE_DENOM: u128 = 1_000;
/// Default fee numerator (0.3% fee)
pub const DEFAULT_FEE_NUM: u128 = 997;

/// Pricing capability of a two-asset liquidity pool.
///
/// The swap form never looks inside a pool: it only asks for the reserves,
/// the liquidity-position size and the two conversions.
pub trait Pool: Send + Sync + fmt::Debug {
    fn id(&self) -> PoolId;

    /// Reserve of the first asset
    fn x(&self) -> &AssetAmount;

    /// Reserve of the second asset
    fn y(&self) -> &AssetAmount;

    /// Size of the liquidity position (LP tokens outstanding)
    fn lp(&self) -> u128;

    /// Amount received for giving `input`
    fn output_amount(&self, input: &AssetAmount) -> Result<AssetAmount, PoolError>;

    /// Amount to give in order to receive `output`; `None` when the pool
    /// cannot produce that much
    fn input_amount(&self, output: &AssetAmount) -> Option<AssetAmount>;

    /// Reserve held for `asset`, if the pool trades it
    fn reserve_of(&self, asset: &AssetId) -> Option<&AssetAmount> {
        if self.x().asset.id == *asset {
            Some(self.x())
        } else if self.y().asset.id == *asset {
            Some(self.y())
        } else {
            None
        }
    }

    /// Whether the pool trades exactly the pair `(a, b)` in either order
    fn has_pair(&self, a: &AssetId, b: &AssetId) -> bool {
        let (x, y) = (&self.x().asset.id, &self.y().asset.id);
        (x == a && y == b) || (x == b && y == a)
    }
}

pub type SharedPool = Arc<dyn Pool>;

/// Constant-product pool (`x * y = k`) with a proportional swap fee
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CpmmPool {
    pub pool_id: PoolId,
    pub x: AssetAmount,
    pub y: AssetAmount,
    pub lp: u128,
    pub fee_num: u128,
}

impl CpmmPool {
    pub fn new(x: AssetAmount, y: AssetAmount, lp: u128, nonce: u64) -> Self {
        let pool_id = compute_pool_id(&x.asset.id, &y.asset.id, nonce);
        CpmmPool {
            pool_id,
            x,
            y,
            lp,
            fee_num: DEFAULT_FEE_NUM,
        }
    }

    pub fn with_fee_num(mut self, fee_num: u128) -> Self {
        self.fee_num = fee_num;
        self
    }

    /// Reserves ordered as (side being paid in, side being paid out)
    fn sides(&self, asset_in: &AssetId) -> Option<(&AssetAmount, &AssetAmount)> {
        if self.x.asset.id == *asset_in {
            Some((&self.x, &self.y))
        } else if self.y.asset.id == *asset_in {
            Some((&self.y, &self.x))
        } else {
            None
        }
    }
}

impl Pool for CpmmPool {
    fn id(&self) -> PoolId {
        self.pool_id
    }

    fn x(&self) -> &AssetAmount {
        &self.x
    }

    fn y(&self) -> &AssetAmount {
        &self.y
    }

    fn lp(&self) -> u128 {
        self.lp
    }

    fn output_amount(&self, input: &AssetAmount) -> Result<AssetAmount, PoolError> {
        let (reserve_in, reserve_out) = self
            .sides(&input.asset.id)
            .ok_or(PoolError::AssetNotInPool(input.asset.id))?;
        if reserve_in.fractions == 0 || reserve_out.fractions == 0 {
            return Err(PoolError::InsufficientLiquidity);
        }

        // out = y * in * feeNum / (x * feeDenom + in * feeNum)
        let in_with_fee = input
            .fractions
            .checked_mul(self.fee_num)
            .ok_or(PoolError::Overflow)?;
        let numerator = reserve_out
            .fractions
            .checked_mul(in_with_fee)
            .ok_or(PoolError::Overflow)?;
        let denominator = reserve_in
            .fractions
            .checked_mul(FEE_DENOM)
            .and_then(|d| d.checked_add(in_with_fee))
            .ok_or(PoolError::Overflow)?;

        Ok(AssetAmount::new(
            reserve_out.asset.clone(),
            numerator / denominator,
        ))
    }

    fn input_amount(&self, output: &AssetAmount) -> Option<AssetAmount> {
        // sides() is keyed by the paid-in asset, so look up the opposite side
        let (reserve_out, reserve_in) = self.sides(&output.asset.id)?;
        if reserve_in.fractions == 0 || output.fractions >= reserve_out.fractions {
            return None;
        }
        if output.fractions == 0 {
            return Some(AssetAmount::new(reserve_in.asset.clone(), 0));
        }

        // in = x * out * feeDenom / ((y - out) * feeNum) + 1
        let numerator = reserve_in
            .fractions
            .checked_mul(output.fractions)?
            .checked_mul(FEE_DENOM)?;
        let denominator = (reserve_out.fractions - output.fractions).checked_mul(self.fee_num)?;
        if denominator == 0 {
            return None;
        }

        Some(AssetAmount::new(
            reserve_in.asset.clone(),
            numerator / denominator + 1,
        ))
    }
}

/// Deterministic pool id from its pair and a nonce. Pair order is ignored.
pub fn compute_pool_id(a: &AssetId, b: &AssetId, nonce: u64) -> PoolId {
    let (a, b) = if a <= b { (a, b) } else { (b, a) };
    let mut data = Vec::with_capacity(3 + 64 + 8);
    data.extend_from_slice(b"amm");
    data.extend_from_slice(a.as_bytes());
    data.extend_from_slice(b.as_bytes());
    data.extend_from_slice(&nonce.to_le_bytes());
    PoolId(*blake3::hash(&data).as_bytes())
}
