use ergoswap_core::{Amount, Asset, AssetAmount, AssetId, PoolId, SharedPool, TokenAmount};
use serde::{Deserialize, Serialize};

/// Which leg of the swap a value belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    From,
    To,
}

/// One token control: an optional asset and an optional amount
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldValue {
    #[serde(default)]
    pub asset: Option<Asset>,
    #[serde(default)]
    pub amount: Option<TokenAmount>,
}

impl FieldValue {
    pub fn new(asset: Option<Asset>, amount: Option<TokenAmount>) -> Self {
        FieldValue { asset, amount }
    }

    pub fn asset_id(&self) -> Option<AssetId> {
        self.asset.as_ref().map(|a| a.id)
    }

    /// Amount value, treating zero as not entered
    pub fn entered_amount(&self) -> Option<Amount> {
        self.amount
            .as_ref()
            .map(|a| a.value)
            .filter(|v| !v.is_zero())
    }

    pub fn with_asset(mut self, asset: Asset) -> Self {
        self.asset = Some(asset);
        self
    }

    pub fn with_amount(mut self, amount: TokenAmount) -> Self {
        self.amount = Some(amount);
        self
    }
}

/// The user-editable part of the form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormValues {
    #[serde(default)]
    pub from: FieldValue,
    #[serde(default)]
    pub to: FieldValue,
}

impl FormValues {
    /// Values a fresh swap form starts with: native asset on the `from` side
    pub fn initial() -> Self {
        FormValues {
            from: FieldValue::new(Some(Asset::native()), None),
            to: FieldValue::default(),
        }
    }

    pub fn field(&self, side: Side) -> &FieldValue {
        match side {
            Side::From => &self.from,
            Side::To => &self.to,
        }
    }
}

/// Swap form state. Only the synchronizer mutates it.
#[derive(Debug, Clone, Default)]
pub struct FormModel {
    pub from: FieldValue,
    pub to: FieldValue,
    pub pool: Option<SharedPool>,
    /// Set when the selected pool could not price the `from` amount
    pub liquidity_shortfall: bool,
    /// Assets offered by the `to` picker
    pub to_assets: Vec<Asset>,
}

impl FormModel {
    pub fn new(initial: FormValues) -> Self {
        FormModel {
            from: initial.from,
            to: initial.to,
            ..Default::default()
        }
    }

    pub fn values(&self) -> FormValues {
        FormValues {
            from: self.from.clone(),
            to: self.to.clone(),
        }
    }

    pub fn field_mut(&mut self, side: Side) -> &mut FieldValue {
        match side {
            Side::From => &mut self.from,
            Side::To => &mut self.to,
        }
    }

    /// The selected pool, but only while it still trades the current pair
    pub fn active_pool(&self) -> Option<&SharedPool> {
        let from = self.from.asset_id()?;
        let to = self.to.asset_id()?;
        self.pool.as_ref().filter(|p| p.has_pair(&from, &to))
    }

    pub fn pool_id(&self) -> Option<PoolId> {
        self.pool.as_ref().map(|p| p.id())
    }

    /// Spot price of one `from` unit expressed in `to` units
    pub fn ratio(&self) -> Option<Amount> {
        let pool = self.active_pool()?;
        let from = self.from.asset.as_ref()?;
        let to = self.to.asset.as_ref()?;
        let reserve_from = pool.reserve_of(&from.id)?;
        let reserve_to = pool.reserve_of(&to.id)?;
        if reserve_from.fractions == 0 {
            return None;
        }
        let scale = 10u128.checked_pow(u32::from(from.decimals))?;
        let price = reserve_to.fractions.checked_mul(scale)? / reserve_from.fractions;
        Some(Amount::from_fractions(price, to.decimals))
    }

    pub fn snapshot(&self) -> FormSnapshot {
        FormSnapshot {
            from: self.from.clone(),
            to: self.to.clone(),
            pool: self.pool.as_ref().map(|p| PoolSummary {
                id: p.id(),
                x: p.x().clone(),
                y: p.y().clone(),
                lp: p.lp(),
            }),
            ratio: self.ratio(),
            liquidity_shortfall: self.liquidity_shortfall,
            to_assets: self.to_assets.clone(),
        }
    }
}

/// Serializable view of a pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolSummary {
    pub id: PoolId,
    pub x: AssetAmount,
    pub y: AssetAmount,
    pub lp: u128,
}

/// Serializable copy of the form state, published to observers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormSnapshot {
    pub from: FieldValue,
    pub to: FieldValue,
    pub pool: Option<PoolSummary>,
    pub ratio: Option<Amount>,
    pub liquidity_shortfall: bool,
    pub to_assets: Vec<Asset>,
}
