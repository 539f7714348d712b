use serde::{Deserialize, Serialize};

use crate::amount::Amount;
use crate::error::CoreError;
use crate::id::AssetId;

/// Ticker of the chain's native asset
pub const NATIVE_NAME: &str = "ERG";
/// Decimal places of the chain's native asset
pub const NATIVE_DECIMALS: u8 = 9;

/// Metadata for a chain-tracked fungible token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    /// Stable chain-level token id
    pub id: AssetId,
    /// Display name
    pub name: String,
    /// Fractional digits the chain encodes for this asset
    pub decimals: u8,
}

impl Asset {
    pub fn new(id: AssetId, name: impl Into<String>, decimals: u8) -> Self {
        Asset {
            id,
            name: name.into(),
            decimals,
        }
    }

    /// Metadata for the native asset
    pub fn native() -> Self {
        Asset::new(AssetId::NATIVE, NATIVE_NAME, NATIVE_DECIMALS)
    }

    pub fn is_native(&self) -> bool {
        self.id.is_native()
    }
}

/// An amount of an asset in base units
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetAmount {
    pub asset: Asset,
    pub fractions: u128,
}

impl AssetAmount {
    pub fn new(asset: Asset, fractions: u128) -> Self {
        AssetAmount { asset, fractions }
    }

    /// Convert a human amount into base units, truncating extra digits
    pub fn from_amount(asset: &Asset, amount: &Amount) -> Result<Self, CoreError> {
        let fractions = amount.to_fractions(asset.decimals)?;
        Ok(AssetAmount::new(asset.clone(), fractions))
    }

    pub fn to_amount(&self) -> Amount {
        Amount::from_fractions(self.fractions, self.asset.decimals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_native_asset() {
        let erg = Asset::native();
        assert!(erg.is_native());
        assert_eq!(erg.name, "ERG");
        assert_eq!(erg.decimals, 9);
    }

    #[test]
    fn test_asset_amount_conversion() {
        let sigusd = Asset::new(AssetId::derive("SigUSD"), "SigUSD", 2);
        let amount = Amount::parse("12.345").unwrap();
        let aa = AssetAmount::from_amount(&sigusd, &amount).unwrap();
        assert_eq!(aa.fractions, 1234);
        assert_eq!(aa.to_amount(), Amount::parse("12.34").unwrap());
    }
}
