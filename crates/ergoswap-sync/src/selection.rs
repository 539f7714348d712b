use ergoswap_core::SharedPool;

/// Pick the pool with the largest liquidity position. On ties the first
/// pool encountered wins.
pub fn select_best_pool(pools: &[SharedPool]) -> Option<&SharedPool> {
    let mut best: Option<&SharedPool> = None;
    for pool in pools {
        match best {
            Some(current) if pool.lp() <= current.lp() => {}
            _ => best = Some(pool),
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use ergoswap_core::{Asset, AssetAmount, AssetId, CpmmPool};
    use std::sync::Arc;

    fn pool(lp: u128, nonce: u64) -> SharedPool {
        let token = Asset::new(AssetId::derive("SigUSD"), "SigUSD", 2);
        Arc::new(CpmmPool::new(
            AssetAmount::new(Asset::native(), 1_000),
            AssetAmount::new(token, 2_000),
            lp,
            nonce,
        ))
    }

    #[test]
    fn test_largest_lp_wins() {
        let pools = vec![pool(100, 1), pool(50, 2)];
        assert_eq!(select_best_pool(&pools).unwrap().id(), pools[0].id());

        let reversed = vec![pool(50, 2), pool(100, 1)];
        assert_eq!(select_best_pool(&reversed).unwrap().id(), reversed[1].id());
    }

    #[test]
    fn test_tie_keeps_first() {
        let pools = vec![pool(70, 1), pool(70, 2), pool(10, 3)];
        assert_eq!(select_best_pool(&pools).unwrap().id(), pools[0].id());
    }

    #[test]
    fn test_empty_list() {
        assert!(select_best_pool(&[]).is_none());
    }
}
