use ergoswap_core::{Amount, Asset, AssetId, Balance, FeePolicy, NATIVE_NAME};
use serde::{Deserialize, Serialize};

use crate::error::SyncError;
use crate::model::{FieldValue, FormModel};

/// Kind of operation handed to the confirmation step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum Operation {
    Swap,
}

/// One resolved leg of an operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leg {
    pub asset: Asset,
    pub amount: Amount,
}

impl Leg {
    fn from_field(field: &FieldValue, which: &'static str) -> Result<Self, SyncError> {
        let asset = field.asset.clone().ok_or(SyncError::Incomplete(which))?;
        let amount = field.entered_amount().ok_or(SyncError::Incomplete(which))?;
        Ok(Leg { asset, amount })
    }
}

/// What the confirmation step receives
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmationRequest {
    pub operation: Operation,
    pub from: Leg,
    pub to: Leg,
}

/// Validation and submission rules for one operation kind
pub trait ActionStrategy: Send + Sync {
    fn operation(&self) -> Operation;

    /// Label of the submit action when it is enabled
    fn action_caption(&self) -> &str;

    /// Name of the fee asset when the wallet cannot cover the fees
    fn insufficient_token_for_fee(&self, model: &FormModel) -> Option<String>;

    /// Name of the asset the wallet holds too little of
    fn insufficient_token_for_tx(&self, model: &FormModel) -> Option<String>;

    fn is_amount_not_entered(&self, model: &FormModel) -> bool;

    fn is_tokens_not_selected(&self, model: &FormModel) -> bool;

    fn is_liquidity_insufficient(&self, model: &FormModel) -> bool;

    /// Build the hand-off for the confirmation step
    fn request(&self, model: &FormModel) -> Result<ConfirmationRequest, SyncError>;
}

/// Gating rules of the swap screen
#[derive(Debug, Clone, Default)]
pub struct SwapStrategy {
    balance: Balance,
    fees: FeePolicy,
}

impl SwapStrategy {
    pub fn new(balance: Balance, fees: FeePolicy) -> Self {
        SwapStrategy { balance, fees }
    }

    pub fn balance(&self) -> &Balance {
        &self.balance
    }

    pub fn set_balance(&mut self, balance: Balance) {
        self.balance = balance;
    }

    pub fn fees(&self) -> &FeePolicy {
        &self.fees
    }
}

impl ActionStrategy for SwapStrategy {
    fn operation(&self) -> Operation {
        Operation::Swap
    }

    fn action_caption(&self) -> &str {
        "Swap"
    }

    fn insufficient_token_for_fee(&self, model: &FormModel) -> Option<String> {
        let fees = self.fees.total().ok();
        let spent = match model.from.entered_amount() {
            Some(amount) if model.from.asset.as_ref().is_some_and(|a| a.is_native()) => {
                fees.and_then(|f| f.checked_add(amount))
            }
            _ => fees,
        };

        // Overflowing sums can never be covered
        let covered = spent.is_some_and(|required| required <= self.balance.get(&AssetId::NATIVE));
        (!covered).then(|| NATIVE_NAME.to_string())
    }

    fn insufficient_token_for_tx(&self, model: &FormModel) -> Option<String> {
        let asset = model.from.asset.as_ref()?;
        let amount = model.from.entered_amount()?;
        (amount > self.balance.get(&asset.id)).then(|| asset.name.clone())
    }

    fn is_amount_not_entered(&self, model: &FormModel) -> bool {
        model.from.entered_amount().is_none() || model.to.entered_amount().is_none()
    }

    fn is_tokens_not_selected(&self, model: &FormModel) -> bool {
        model.from.asset.is_none() || model.to.asset.is_none()
    }

    fn is_liquidity_insufficient(&self, model: &FormModel) -> bool {
        if model.liquidity_shortfall {
            return true;
        }
        let (Some(pool), Some(to_asset), Some(requested)) = (
            model.active_pool(),
            model.to.asset.as_ref(),
            model.to.entered_amount(),
        ) else {
            return false;
        };
        match pool.reserve_of(&to_asset.id) {
            Some(reserve) => requested > reserve.to_amount(),
            None => false,
        }
    }

    fn request(&self, model: &FormModel) -> Result<ConfirmationRequest, SyncError> {
        Ok(ConfirmationRequest {
            operation: self.operation(),
            from: Leg::from_field(&model.from, "from")?,
            to: Leg::from_field(&model.to, "to")?,
        })
    }
}
