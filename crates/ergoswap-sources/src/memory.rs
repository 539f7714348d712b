use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use ergoswap_core::{Amount, Asset, AssetId, Balance, SharedPool};
use futures_util::future::{BoxFuture, FutureExt};
use futures_util::stream::{self, BoxStream, StreamExt};
use tokio::sync::watch;
use tracing::debug;

use crate::config::MarketConfig;
use crate::error::SourceError;
use crate::source::{AssetCatalog, BalanceSource, PoolSource};

/// In-memory market. Pool and wallet updates are pushed to every open
/// lookup stream.
pub struct MemoryMarket {
    assets: Vec<Asset>,
    pools: watch::Sender<Vec<SharedPool>>,
    wallet: watch::Sender<Balance>,
    /// Delay before the first emission of a pool lookup
    latency: Duration,
    offline: AtomicBool,
}

impl MemoryMarket {
    pub fn new(assets: Vec<Asset>, pools: Vec<SharedPool>, wallet: Balance) -> Self {
        let (pools, _) = watch::channel(pools);
        let (wallet, _) = watch::channel(wallet);
        MemoryMarket {
            assets,
            pools,
            wallet,
            latency: Duration::ZERO,
            offline: AtomicBool::new(false),
        }
    }

    pub fn from_config(config: &MarketConfig) -> Result<Self, SourceError> {
        let pools = config
            .build_pools()?
            .into_iter()
            .map(|p| Arc::new(p) as SharedPool)
            .collect();
        Ok(Self::new(config.assets.clone(), pools, config.wallet.clone()))
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// While offline, pool lookups fail
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Insert a pool or replace the one with the same id
    pub fn upsert_pool(&self, pool: SharedPool) {
        self.pools.send_modify(|pools| {
            match pools.iter_mut().find(|p| p.id() == pool.id()) {
                Some(existing) => *existing = pool,
                None => pools.push(pool),
            }
        });
    }

    pub fn set_balance(&self, asset: AssetId, amount: Amount) {
        self.wallet.send_modify(|wallet| wallet.set(asset, amount));
    }

    pub fn assets(&self) -> &[Asset] {
        &self.assets
    }

    fn paired_assets(&self, paired_with: &AssetId) -> Vec<Asset> {
        let pools = self.pools.borrow();
        self.assets
            .iter()
            .filter(|asset| {
                asset.id != *paired_with
                    && pools.iter().any(|p| p.has_pair(paired_with, &asset.id))
            })
            .cloned()
            .collect()
    }
}

impl PoolSource for MemoryMarket {
    fn lookup_pools(
        &self,
        base: AssetId,
        quote: Option<AssetId>,
    ) -> BoxStream<'static, Result<Vec<SharedPool>, SourceError>> {
        let Some(quote) = quote else {
            return stream::once(async { Ok(Vec::new()) }).boxed();
        };
        if self.offline.load(Ordering::SeqCst) {
            return stream::once(async { Err(SourceError::Unavailable("pools".to_string())) })
                .boxed();
        }

        debug!("Pool lookup {} / {}", base, quote);
        let latency = self.latency;
        let rx = self.pools.subscribe();
        stream::unfold((rx, true), move |(mut rx, first)| async move {
            if first {
                if !latency.is_zero() {
                    tokio::time::sleep(latency).await;
                }
            } else if rx.changed().await.is_err() {
                return None;
            }
            let pools: Vec<SharedPool> = rx
                .borrow_and_update()
                .iter()
                .filter(|p| p.has_pair(&base, &quote))
                .cloned()
                .collect();
            Some((Ok(pools), (rx, false)))
        })
        .boxed()
    }
}

impl BalanceSource for MemoryMarket {
    fn wallet_balance(&self) -> BoxStream<'static, Balance> {
        let rx = self.wallet.subscribe();
        stream::unfold((rx, true), |(mut rx, first)| async move {
            if !first && rx.changed().await.is_err() {
                return None;
            }
            let balance = rx.borrow_and_update().clone();
            Some((balance, (rx, false)))
        })
        .boxed()
    }
}

impl AssetCatalog for MemoryMarket {
    fn list_assets(&self) -> BoxFuture<'static, Result<Vec<Asset>, SourceError>> {
        let assets = self.assets.clone();
        async move { Ok(assets) }.boxed()
    }

    fn list_paired_assets(
        &self,
        paired_with: AssetId,
    ) -> BoxFuture<'static, Result<Vec<Asset>, SourceError>> {
        let assets = self.paired_assets(&paired_with);
        async move { Ok(assets) }.boxed()
    }
}
