use ergoswap_core::{Amount, Asset, AssetId, Balance, SharedPool};
use futures_util::future::BoxFuture;
use futures_util::stream::{BoxStream, StreamExt};

use crate::error::SourceError;

/// Feed of liquidity pools
pub trait PoolSource: Send + Sync {
    /// Pools trading `base`, narrowed to the pair when `quote` is given.
    /// Without a `quote` the stream yields one empty list.
    fn lookup_pools(
        &self,
        base: AssetId,
        quote: Option<AssetId>,
    ) -> BoxStream<'static, Result<Vec<SharedPool>, SourceError>>;
}

/// Feed of wallet balances
pub trait BalanceSource: Send + Sync {
    /// Current wallet snapshot, then every change
    fn wallet_balance(&self) -> BoxStream<'static, Balance>;

    /// Balance of a single asset
    fn balance_of(&self, asset: AssetId) -> BoxStream<'static, Amount> {
        self.wallet_balance()
            .map(move |balance| balance.get(&asset))
            .boxed()
    }
}

/// Catalog of known assets
pub trait AssetCatalog: Send + Sync {
    fn list_assets(&self) -> BoxFuture<'static, Result<Vec<Asset>, SourceError>>;

    /// Assets that share at least one pool with `paired_with`
    fn list_paired_assets(
        &self,
        paired_with: AssetId,
    ) -> BoxFuture<'static, Result<Vec<Asset>, SourceError>>;
}
