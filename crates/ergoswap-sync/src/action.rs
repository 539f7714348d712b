use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::SyncError;
use crate::model::FormModel;
use crate::strategy::{ActionStrategy, ConfirmationRequest};

/// Why the submit action is disabled
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", content = "token", rename_all = "snake_case")]
pub enum GateReason {
    TokensNotSelected,
    LiquidityInsufficient,
    AmountNotEntered,
    InsufficientToken(String),
    InsufficientFeeToken(String),
}

impl fmt::Display for GateReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GateReason::TokensNotSelected => write!(f, "Tokens not selected"),
            GateReason::LiquidityInsufficient => write!(f, "Liquidity insufficient"),
            GateReason::AmountNotEntered => write!(f, "Amount not entered"),
            GateReason::InsufficientToken(name) => write!(f, "Insufficient {} balance", name),
            GateReason::InsufficientFeeToken(name) => {
                write!(f, "Insufficient {} balance for fees", name)
            }
        }
    }
}

/// State of the submit action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ActionState {
    Ready { caption: String },
    Blocked { reason: GateReason },
}

impl ActionState {
    pub fn is_ready(&self) -> bool {
        matches!(self, ActionState::Ready { .. })
    }
}

/// Every failing predicate, in the order they are reported
pub fn check<S: ActionStrategy + ?Sized>(strategy: &S, model: &FormModel) -> Vec<GateReason> {
    let mut reasons = Vec::new();
    if strategy.is_tokens_not_selected(model) {
        reasons.push(GateReason::TokensNotSelected);
    }
    if strategy.is_liquidity_insufficient(model) {
        reasons.push(GateReason::LiquidityInsufficient);
    }
    if strategy.is_amount_not_entered(model) {
        reasons.push(GateReason::AmountNotEntered);
    }
    if let Some(token) = strategy.insufficient_token_for_tx(model) {
        reasons.push(GateReason::InsufficientToken(token));
    }
    if let Some(token) = strategy.insufficient_token_for_fee(model) {
        reasons.push(GateReason::InsufficientFeeToken(token));
    }
    reasons
}

pub fn evaluate<S: ActionStrategy + ?Sized>(strategy: &S, model: &FormModel) -> ActionState {
    match check(strategy, model).into_iter().next() {
        Some(reason) => ActionState::Blocked { reason },
        None => ActionState::Ready {
            caption: strategy.action_caption().to_string(),
        },
    }
}

/// Build the confirmation hand-off if every predicate passes
pub fn submit<S: ActionStrategy + ?Sized>(
    strategy: &S,
    model: &FormModel,
) -> Result<ConfirmationRequest, SyncError> {
    match evaluate(strategy, model) {
        ActionState::Blocked { reason } => Err(SyncError::Blocked(reason)),
        ActionState::Ready { .. } => strategy.request(model),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FieldValue;
    use crate::strategy::{Operation, SwapStrategy};
    use ergoswap_core::{
        Amount, Asset, AssetAmount, AssetId, Balance, CpmmPool, FeePolicy, TokenAmount,
    };
    use std::sync::Arc;

    fn sigusd() -> Asset {
        Asset::new(AssetId::derive("SigUSD"), "SigUSD", 2)
    }

    fn amt(s: &str) -> Amount {
        Amount::parse(s).unwrap()
    }

    fn one_erg_fees() -> FeePolicy {
        FeePolicy {
            miner_fee: amt("0.5"),
            ui_fee: amt("0.25"),
            execution_fee: amt("0.25"),
        }
    }

    fn balance(erg: &str, usd: &str) -> Balance {
        [(AssetId::NATIVE, amt(erg)), (sigusd().id, amt(usd))]
            .into_iter()
            .collect()
    }

    /// ERG -> SigUSD form with a pool holding 100 SigUSD
    fn model(from: &str, to: &str) -> FormModel {
        let mut model = FormModel::default();
        model.from = FieldValue::new(
            Some(Asset::native()),
            Some(TokenAmount::from_input(from).unwrap()),
        );
        model.to = FieldValue::new(Some(sigusd()), Some(TokenAmount::from_input(to).unwrap()));
        model.pool = Some(Arc::new(CpmmPool::new(
            AssetAmount::new(Asset::native(), 50_000_000_000),
            AssetAmount::new(sigusd(), 10_000),
            1,
            0,
        )));
        model
    }

    #[test]
    fn test_ready_when_everything_passes() {
        let strategy = SwapStrategy::new(balance("100", "0"), one_erg_fees());
        let state = evaluate(&strategy, &model("10", "20"));
        assert_eq!(
            state,
            ActionState::Ready {
                caption: "Swap".to_string()
            }
        );
    }

    #[test]
    fn test_fee_token_shortfall_names_native_asset() {
        let strategy = SwapStrategy::new(balance("5", "0"), one_erg_fees());
        let form = model("10", "20");
        assert_eq!(strategy.insufficient_token_for_fee(&form), Some("ERG".to_string()));
        assert!(!evaluate(&strategy, &form).is_ready());
        assert!(check(&strategy, &form).contains(&GateReason::InsufficientFeeToken("ERG".into())));
    }

    #[test]
    fn test_fee_includes_amount_only_for_native_from() {
        let strategy = SwapStrategy::new(balance("1.5", "50"), one_erg_fees());
        let mut form = model("10", "20");
        form.from.asset = Some(sigusd());
        form.to.asset = Some(Asset::native());
        assert_eq!(strategy.insufficient_token_for_fee(&form), None);

        let poor = SwapStrategy::new(balance("0.9", "50"), one_erg_fees());
        assert_eq!(poor.insufficient_token_for_fee(&form), Some("ERG".to_string()));
    }

    #[test]
    fn test_tx_balance_shortfall_names_token() {
        let strategy = SwapStrategy::new(balance("100", "5"), one_erg_fees());
        let mut form = model("10", "20");
        form.from.asset = Some(sigusd());
        form.to.asset = Some(Asset::native());
        assert_eq!(strategy.insufficient_token_for_tx(&form), Some("SigUSD".to_string()));
    }

    #[test]
    fn test_liquidity_insufficient_regardless_of_balance() {
        let rich = SwapStrategy::new(balance("1000000", "0"), one_erg_fees());
        let form = model("10", "150");
        assert!(rich.is_liquidity_insufficient(&form));
        assert_eq!(
            evaluate(&rich, &form),
            ActionState::Blocked {
                reason: GateReason::LiquidityInsufficient
            }
        );
    }

    #[test]
    fn test_shortfall_flag_blocks() {
        let strategy = SwapStrategy::new(balance("100", "0"), one_erg_fees());
        let mut form = model("10", "20");
        form.liquidity_shortfall = true;
        assert!(strategy.is_liquidity_insufficient(&form));
    }

    #[test]
    fn test_missing_inputs() {
        let strategy = SwapStrategy::new(balance("100", "0"), one_erg_fees());
        let mut form = model("10", "20");
        form.to.amount = None;
        assert_eq!(
            evaluate(&strategy, &form),
            ActionState::Blocked {
                reason: GateReason::AmountNotEntered
            }
        );

        form.to.asset = None;
        assert_eq!(
            evaluate(&strategy, &form),
            ActionState::Blocked {
                reason: GateReason::TokensNotSelected
            }
        );
    }

    #[test]
    fn test_check_reports_in_gate_order() {
        let strategy = SwapStrategy::new(balance("5", "0"), one_erg_fees());
        let mut form = model("10", "20");
        form.to.amount = None;
        form.liquidity_shortfall = true;
        assert_eq!(
            check(&strategy, &form),
            vec![
                GateReason::LiquidityInsufficient,
                GateReason::AmountNotEntered,
                GateReason::InsufficientToken("ERG".to_string()),
                GateReason::InsufficientFeeToken("ERG".to_string()),
            ]
        );
        assert_eq!(
            evaluate(&strategy, &form),
            ActionState::Blocked {
                reason: GateReason::LiquidityInsufficient
            }
        );
    }

    #[test]
    fn test_zero_amount_counts_as_not_entered() {
        let strategy = SwapStrategy::new(balance("100", "0"), one_erg_fees());
        assert!(strategy.is_amount_not_entered(&model("0", "20")));
    }

    #[test]
    fn test_submit_builds_request() {
        let strategy = SwapStrategy::new(balance("100", "0"), one_erg_fees());
        let request = submit(&strategy, &model("10", "20")).unwrap();
        assert_eq!(request.operation, Operation::Swap);
        assert_eq!(request.from.amount, amt("10"));
        assert_eq!(request.to.asset, sigusd());
    }

    #[test]
    fn test_submit_blocked() {
        let strategy = SwapStrategy::new(balance("5", "0"), one_erg_fees());
        let err = submit(&strategy, &model("10", "20")).unwrap_err();
        assert!(matches!(err, SyncError::Blocked(GateReason::InsufficientToken(ref t)) if t == "ERG"));
    }

    #[test]
    fn test_reason_messages() {
        assert_eq!(GateReason::AmountNotEntered.to_string(), "Amount not entered");
        assert_eq!(
            GateReason::InsufficientToken("SigUSD".into()).to_string(),
            "Insufficient SigUSD balance"
        );
    }
}
