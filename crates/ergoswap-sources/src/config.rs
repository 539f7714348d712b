use ergoswap_core::{Amount, Asset, AssetAmount, AssetId, Balance, CpmmPool, FeePolicy, DEFAULT_FEE_NUM};
use serde::{Deserialize, Serialize};

use crate::error::SourceError;

/// Market description: known assets, pools, the wallet and fees
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MarketConfig {
    pub assets: Vec<Asset>,
    pub pools: Vec<PoolEntry>,
    #[serde(default)]
    pub wallet: Balance,
    #[serde(default)]
    pub fees: FeePolicy,
}

/// A constant-product pool with reserves in human units
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolEntry {
    pub x: AssetId,
    pub reserve_x: Amount,
    pub y: AssetId,
    pub reserve_y: Amount,
    pub lp: u64,
    #[serde(default)]
    pub nonce: u64,
    #[serde(default = "default_fee_num")]
    pub fee_num: u64,
}

fn default_fee_num() -> u64 {
    DEFAULT_FEE_NUM as u64
}

impl PoolEntry {
    /// Pool entry charging the default fee
    pub fn new(x: AssetId, reserve_x: Amount, y: AssetId, reserve_y: Amount, lp: u64, nonce: u64) -> Self {
        PoolEntry {
            x,
            reserve_x,
            y,
            reserve_y,
            lp,
            nonce,
            fee_num: default_fee_num(),
        }
    }
}

impl MarketConfig {
    pub fn asset(&self, id: &AssetId) -> Option<&Asset> {
        self.assets.iter().find(|a| a.id == *id)
    }

    /// Find an asset by name (case-insensitive) or hex id
    pub fn find_asset(&self, key: &str) -> Option<&Asset> {
        self.assets
            .iter()
            .find(|a| a.name.eq_ignore_ascii_case(key))
            .or_else(|| {
                AssetId::from_hex(key)
                    .ok()
                    .and_then(|id| self.asset(&id))
            })
    }

    /// Materialize the configured pools
    pub fn build_pools(&self) -> Result<Vec<CpmmPool>, SourceError> {
        self.pools
            .iter()
            .map(|entry| {
                let x = self
                    .asset(&entry.x)
                    .ok_or_else(|| SourceError::UnknownAsset(entry.x.to_hex()))?;
                let y = self
                    .asset(&entry.y)
                    .ok_or_else(|| SourceError::UnknownAsset(entry.y.to_hex()))?;
                if x.id == y.id {
                    return Err(SourceError::InvalidPool("Pool assets must differ".to_string()));
                }
                let pool = CpmmPool::new(
                    AssetAmount::from_amount(x, &entry.reserve_x)?,
                    AssetAmount::from_amount(y, &entry.reserve_y)?,
                    u128::from(entry.lp),
                    entry.nonce,
                );
                Ok(pool.with_fee_num(u128::from(entry.fee_num)))
            })
            .collect()
    }
}
