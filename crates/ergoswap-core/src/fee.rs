use serde::{Deserialize, Serialize};

use crate::amount::Amount;
use crate::asset::NATIVE_DECIMALS;
use crate::error::CoreError;

/// Default miner fee (0.002 ERG)
pub const DEFAULT_MINER_FEE: u128 = 2_000_000;
/// Default UI fee (0.01 ERG)
pub const DEFAULT_UI_FEE: u128 = 10_000_000;
/// Default execution fee (0.002 ERG)
pub const DEFAULT_EXECUTION_FEE: u128 = 2_000_000;

/// Fees charged on every operation, all denominated in the native asset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeePolicy {
    /// Network (protocol) fee paid to miners
    pub miner_fee: Amount,
    /// Fee collected by the interface operator
    pub ui_fee: Amount,
    /// Fee paid to the off-chain executor of the order
    pub execution_fee: Amount,
}

impl Default for FeePolicy {
    fn default() -> Self {
        FeePolicy {
            miner_fee: Amount::from_fractions(DEFAULT_MINER_FEE, NATIVE_DECIMALS),
            ui_fee: Amount::from_fractions(DEFAULT_UI_FEE, NATIVE_DECIMALS),
            execution_fee: Amount::from_fractions(DEFAULT_EXECUTION_FEE, NATIVE_DECIMALS),
        }
    }
}

impl FeePolicy {
    /// Sum of all fees in native units
    pub fn total(&self) -> Result<Amount, CoreError> {
        self.miner_fee
            .checked_add(self.ui_fee)
            .and_then(|sum| sum.checked_add(self.execution_fee))
            .ok_or(CoreError::Overflow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_total() {
        let fees = FeePolicy::default();
        assert_eq!(fees.total().unwrap(), Amount::parse("0.014").unwrap());
    }
}
