use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::amount::Amount;
use crate::id::AssetId;

/// Snapshot of wallet balances keyed by asset id
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Balance {
    amounts: HashMap<AssetId, Amount>,
}

impl Balance {
    pub fn new() -> Self {
        Self::default()
    }

    /// Balance of an asset; unknown assets hold zero
    pub fn get(&self, asset: &AssetId) -> Amount {
        self.amounts.get(asset).copied().unwrap_or(Amount::ZERO)
    }

    pub fn set(&mut self, asset: AssetId, amount: Amount) {
        self.amounts.insert(asset, amount);
    }

    pub fn contains(&self, asset: &AssetId) -> bool {
        self.amounts.contains_key(asset)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AssetId, &Amount)> {
        self.amounts.iter()
    }

    pub fn len(&self) -> usize {
        self.amounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.amounts.is_empty()
    }
}

impl FromIterator<(AssetId, Amount)> for Balance {
    fn from_iter<I: IntoIterator<Item = (AssetId, Amount)>>(iter: I) -> Self {
        Balance {
            amounts: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_asset_is_zero() {
        let balance = Balance::new();
        assert!(balance.get(&AssetId::NATIVE).is_zero());
    }

    #[test]
    fn test_json_keys_are_hex() {
        let mut balance = Balance::new();
        balance.set(AssetId::NATIVE, Amount::parse("5").unwrap());
        let json = serde_json::to_string(&balance).unwrap();
        assert!(json.contains(&"0".repeat(64)));
        let back: Balance = serde_json::from_str(&json).unwrap();
        assert_eq!(back, balance);
    }
}
