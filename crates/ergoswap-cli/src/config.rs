use std::path::PathBuf;

use anyhow::{Context, Result};
use ergoswap_core::{Amount, Asset, AssetId, Balance, FeePolicy};
use ergoswap_sources::{MarketConfig, PoolEntry};
use serde::{Deserialize, Serialize};

/// Well-known token ids used by the sample market
pub const SIGUSD_ID: &str = "03faf2cb329f2e90d6d23b58d91bbb6c046aa143261cc21f52fbe2824bfcbf04";
pub const SIGRSV_ID: &str = "003bd19d0187117f130b62e1bcab0939929ff5c7709f843c5c4dd158949285d0";

/// CLI configuration file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwapConfig {
    pub market: MarketConfig,
    /// How long to wait for lookups to land, in milliseconds
    #[serde(default = "default_settle_timeout_ms")]
    pub settle_timeout_ms: u64,
}

fn default_settle_timeout_ms() -> u64 {
    2_000
}

impl Default for SwapConfig {
    fn default() -> Self {
        SwapConfig {
            market: MarketConfig::default(),
            settle_timeout_ms: default_settle_timeout_ms(),
        }
    }
}

impl SwapConfig {
    /// Load config from file
    pub fn load(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {:?}", path))?;
        let config: SwapConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save config to file
    pub fn save(&self, path: &PathBuf) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Resolve an asset by name or hex id
    pub fn asset(&self, key: &str) -> Result<Asset> {
        self.market
            .find_asset(key)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("Unknown asset: {}", key))
    }
}

fn amount(s: &str) -> Result<Amount> {
    Ok(Amount::parse(s)?)
}

fn erg_pool(y: &Asset, reserve_x: &str, reserve_y: &str, lp: u64, nonce: u64) -> Result<PoolEntry> {
    Ok(PoolEntry::new(
        AssetId::NATIVE,
        amount(reserve_x)?,
        y.id,
        amount(reserve_y)?,
        lp,
        nonce,
    ))
}

/// Generate a sample market: ERG, SigUSD and SigRSV with a funded wallet
pub fn generate_sample_config() -> Result<SwapConfig> {
    let sigusd = Asset::new(AssetId::from_hex(SIGUSD_ID)?, "SigUSD", 2);
    let sigrsv = Asset::new(AssetId::from_hex(SIGRSV_ID)?, "SigRSV", 0);

    let wallet: Balance = [
        (AssetId::NATIVE, amount("250")?),
        (sigusd.id, amount("120.5")?),
    ]
    .into_iter()
    .collect();

    Ok(SwapConfig {
        market: MarketConfig {
            pools: vec![
                erg_pool(&sigusd, "500000", "750000", 1_000_000, 0)?,
                erg_pool(&sigusd, "20000", "29000", 40_000, 1)?,
                erg_pool(&sigrsv, "100000", "650000000", 300_000, 0)?,
            ],
            assets: vec![Asset::native(), sigusd, sigrsv],
            wallet,
            fees: FeePolicy::default(),
        },
        settle_timeout_ms: default_settle_timeout_ms(),
    })
}
