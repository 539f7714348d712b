//! Swap session integration tests

use std::sync::Arc;
use std::time::Duration;

use ergoswap_core::{
    Amount, Asset, AssetAmount, AssetId, Balance, CpmmPool, FeePolicy, Pool, SharedPool,
    TokenAmount,
};
use ergoswap_session::{
    AutoConfirm, ConfirmationOutcome, ConfirmationStep, SessionError, SessionHandle, SessionState,
    Sources, SwapSession,
};
use ergoswap_sources::MemoryMarket;
use ergoswap_sync::{
    ActionState, ConfirmationRequest, FieldValue, FormValues, GateReason, Operation, Side,
    SyncError,
};
use tokio::sync::oneshot;

const ERG: u128 = 1_000_000_000;

fn usd() -> Asset {
    Asset::new(AssetId::derive("SigUSD"), "SigUSD", 2)
}

fn rsv() -> Asset {
    Asset::new(AssetId::derive("SigRSV"), "SigRSV", 0)
}

fn amt(s: &str) -> Amount {
    Amount::parse(s).unwrap()
}

fn erg_pool(y: AssetAmount, lp: u128, nonce: u64) -> SharedPool {
    Arc::new(CpmmPool::new(
        AssetAmount::new(Asset::native(), 1_000_000 * ERG),
        y,
        lp,
        nonce,
    ))
}

/// Deep ERG/SigUSD pool at 1:2
fn deep_usd_pool() -> SharedPool {
    erg_pool(AssetAmount::new(usd(), 2_000_000 * 100), 100, 0)
}

fn shallow_usd_pool() -> SharedPool {
    erg_pool(AssetAmount::new(usd(), 1_000_000 * 100), 50, 1)
}

fn rsv_pool() -> SharedPool {
    erg_pool(AssetAmount::new(rsv(), 5_000_000), 10, 0)
}

fn market(erg_balance: &str) -> MemoryMarket {
    let wallet: Balance = [(AssetId::NATIVE, amt(erg_balance))].into_iter().collect();
    MemoryMarket::new(
        vec![Asset::native(), usd(), rsv()],
        vec![shallow_usd_pool(), deep_usd_pool(), rsv_pool()],
        wallet,
    )
}

fn spawn_with(
    market: &Arc<MemoryMarket>,
    initial: FormValues,
    step: Arc<dyn ConfirmationStep>,
) -> SessionHandle {
    SwapSession::spawn(
        Sources::from_market(market.clone()),
        initial,
        FeePolicy::default(),
        step,
    )
}

fn spawn(market: &Arc<MemoryMarket>, initial: FormValues) -> SessionHandle {
    spawn_with(market, initial, Arc::new(AutoConfirm::default()))
}

fn erg_to_usd() -> FormValues {
    FormValues {
        from: FieldValue::new(Some(Asset::native()), None),
        to: FieldValue::new(Some(usd()), None),
    }
}

fn amount_field(asset: Asset, amount: &str) -> FieldValue {
    FieldValue::new(Some(asset), Some(TokenAmount::from_input(amount).unwrap()))
}

fn quote(pool: &SharedPool, input: &str) -> Amount {
    pool.output_amount(&AssetAmount::from_amount(&Asset::native(), &amt(input)).unwrap())
        .unwrap()
        .to_amount()
}

async fn settled(handle: &SessionHandle) -> SessionState {
    tokio::time::timeout(Duration::from_secs(2), handle.settled())
        .await
        .expect("session did not settle")
        .unwrap()
}

async fn wait_for(
    handle: &SessionHandle,
    predicate: impl FnMut(&SessionState) -> bool,
) -> SessionState {
    tokio::time::timeout(Duration::from_secs(2), handle.wait_for(predicate))
        .await
        .expect("state never matched")
        .unwrap()
}

#[tokio::test]
async fn test_initial_pair_selects_largest_pool() {
    let market = Arc::new(market("100"));
    let handle = spawn(&market, erg_to_usd());

    let state = settled(&handle).await;
    let pool = state.form.pool.expect("pool selected");
    assert_eq!(pool.id, deep_usd_pool().id());
    assert_eq!(state.form.ratio, Some(amt("2")));
    assert_eq!(state.form.to_assets, vec![usd(), rsv()]);
    assert_eq!(state.action, ActionState::Blocked {
        reason: GateReason::AmountNotEntered
    });
}

#[tokio::test]
async fn test_from_amount_prices_to_side() {
    let market = Arc::new(market("100"));
    let handle = spawn(&market, erg_to_usd());
    settled(&handle).await;

    handle
        .edit_field(Side::From, amount_field(Asset::native(), "10"))
        .unwrap();
    let state = settled(&handle).await;

    let to = state.form.to.entered_amount().expect("to derived");
    assert_eq!(to, quote(&deep_usd_pool(), "10"));
    assert!(to > amt("19.9") && to < amt("20"));
    assert!(state.action.is_ready());
    assert!(state.gate.is_empty());
}

#[tokio::test]
async fn test_to_amount_prices_from_side() {
    let market = Arc::new(market("100"));
    let handle = spawn(&market, erg_to_usd());
    settled(&handle).await;

    handle
        .edit_field(Side::To, amount_field(usd(), "20"))
        .unwrap();
    let state = settled(&handle).await;

    let from = state.form.from.entered_amount().expect("from derived");
    assert!(from > amt("10") && from < amt("10.1"));
}

#[tokio::test]
async fn test_changing_from_asset_clears_pair() {
    let market = Arc::new(market("100"));
    let handle = spawn(&market, erg_to_usd());
    settled(&handle).await;

    handle
        .edit_field(Side::From, amount_field(usd(), "5"))
        .unwrap();
    let state = settled(&handle).await;

    assert_eq!(state.form.to, FieldValue::default());
    assert!(state.form.pool.is_none());
    assert_eq!(state.form.to_assets, vec![Asset::native()]);
    assert_eq!(state.action, ActionState::Blocked {
        reason: GateReason::TokensNotSelected
    });
}

#[tokio::test]
async fn test_latest_pair_wins() {
    let market = Arc::new(market("100").with_latency(Duration::from_millis(30)));
    let handle = spawn(&market, FormValues::initial());
    settled(&handle).await;

    handle
        .edit_field(Side::To, FieldValue::new(Some(usd()), None))
        .unwrap();
    handle
        .edit_field(Side::To, FieldValue::new(Some(rsv()), None))
        .unwrap();
    let state = settled(&handle).await;

    let pool = state.form.pool.expect("pool selected");
    assert_eq!(pool.id, rsv_pool().id());
    assert_eq!(state.form.to.asset, Some(rsv()));
}

#[tokio::test]
async fn test_failed_lookup_leaves_no_pool() {
    let market = Arc::new(market("100"));
    market.set_offline(true);
    let handle = spawn(&market, erg_to_usd());

    let state = settled(&handle).await;
    assert!(state.form.pool.is_none());

    handle
        .edit_field(Side::From, amount_field(Asset::native(), "10"))
        .unwrap();
    let state = settled(&handle).await;
    assert!(state.form.to.amount.is_none());
}

#[tokio::test]
async fn test_pool_updates_reach_open_session() {
    let market = Arc::new(market("100"));
    let handle = spawn(&market, erg_to_usd());
    settled(&handle).await;
    handle
        .edit_field(Side::From, amount_field(Asset::native(), "10"))
        .unwrap();
    settled(&handle).await;

    let deeper = erg_pool(AssetAmount::new(usd(), 4_000_000 * 100), 500, 2);
    market.upsert_pool(deeper.clone());

    let state = wait_for(&handle, |s| {
        s.form.pool.as_ref().map(|p| p.lp) == Some(500)
    })
    .await;
    assert_eq!(state.form.to.entered_amount(), Some(quote(&deeper, "10")));
}

#[tokio::test]
async fn test_requested_output_beyond_reserve_blocks() {
    let market = Arc::new(market("100"));
    let handle = spawn(&market, erg_to_usd());
    settled(&handle).await;

    handle
        .edit_field(Side::To, amount_field(usd(), "3000000"))
        .unwrap();
    let state = settled(&handle).await;

    assert!(state.form.from.amount.is_none());
    assert_eq!(state.action, ActionState::Blocked {
        reason: GateReason::LiquidityInsufficient
    });
}

#[tokio::test]
async fn test_wallet_updates_regate() {
    let market = Arc::new(market("0.001"));
    let handle = spawn(&market, erg_to_usd());
    settled(&handle).await;
    handle
        .edit_field(Side::From, amount_field(Asset::native(), "10"))
        .unwrap();

    let state = settled(&handle).await;
    assert_eq!(state.action, ActionState::Blocked {
        reason: GateReason::InsufficientToken("ERG".to_string())
    });
    assert!(state
        .gate
        .contains(&GateReason::InsufficientFeeToken("ERG".to_string())));

    market.set_balance(AssetId::NATIVE, amt("100"));
    wait_for(&handle, |s| s.action.is_ready()).await;
}

#[tokio::test]
async fn test_submit_hands_off_both_legs() {
    let market = Arc::new(market("100"));
    let handle = spawn(&market, erg_to_usd());
    settled(&handle).await;
    handle
        .edit_field(Side::From, amount_field(Asset::native(), "10"))
        .unwrap();
    settled(&handle).await;

    let submission = handle.submit().await.unwrap();
    assert_eq!(submission.outcome, ConfirmationOutcome::Confirmed);
    assert_eq!(submission.request.operation, Operation::Swap);
    assert_eq!(submission.request.from.amount, amt("10"));
    assert_eq!(submission.request.to.asset, usd());
    assert_eq!(submission.request.to.amount, quote(&deep_usd_pool(), "10"));
}

#[tokio::test]
async fn test_submit_blocked_by_fees() {
    // Enough for the swap itself but not for swap plus fees
    let market = Arc::new(market("10.005"));
    let handle = spawn(&market, erg_to_usd());
    settled(&handle).await;
    handle
        .edit_field(Side::From, amount_field(Asset::native(), "10"))
        .unwrap();
    settled(&handle).await;

    let err = handle.submit().await.unwrap_err();
    match err {
        SessionError::Sync(SyncError::Blocked(reason)) => {
            assert_eq!(reason, GateReason::InsufficientFeeToken("ERG".to_string()));
        }
        other => panic!("unexpected error: {}", other),
    }
}

struct Abandon;

impl ConfirmationStep for Abandon {
    fn open(&self, _request: ConfirmationRequest, done: oneshot::Sender<ConfirmationOutcome>) {
        drop(done);
    }
}

#[tokio::test]
async fn test_abandoned_confirmation() {
    let market = Arc::new(market("100"));
    let handle = spawn_with(&market, erg_to_usd(), Arc::new(Abandon));
    settled(&handle).await;
    handle
        .edit_field(Side::From, amount_field(Asset::native(), "1"))
        .unwrap();
    settled(&handle).await;

    assert!(matches!(
        handle.submit().await,
        Err(SessionError::ConfirmationDropped)
    ));
}

#[tokio::test]
async fn test_cancelled_confirmation() {
    let market = Arc::new(market("100"));
    let handle = spawn_with(&market, erg_to_usd(), Arc::new(AutoConfirm::cancelling()));
    settled(&handle).await;
    handle
        .edit_field(Side::From, amount_field(Asset::native(), "1"))
        .unwrap();
    settled(&handle).await;

    let submission = handle.submit().await.unwrap();
    assert_eq!(submission.outcome, ConfirmationOutcome::Cancelled);
}

#[tokio::test]
async fn test_shutdown_closes_state_feed() {
    let market = Arc::new(market("100"));
    let handle = spawn(&market, erg_to_usd());
    let mut observer = handle.subscribe();
    settled(&handle).await;

    handle.shutdown().await.unwrap();
    observer.borrow_and_update();
    assert!(observer.changed().await.is_err());
}
