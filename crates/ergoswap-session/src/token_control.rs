use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use ergoswap_core::{Amount, Asset, AssetId, TokenAmount};
use ergoswap_sources::BalanceSource;
use ergoswap_sync::FieldValue;
use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::error::SessionError;

/// Which parts of a token control the user may change
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadOnly {
    #[default]
    Editable,
    Amount,
    Asset,
    Both,
}

impl ReadOnly {
    pub fn amount_locked(self) -> bool {
        matches!(self, ReadOnly::Amount | ReadOnly::Both)
    }

    pub fn asset_locked(self) -> bool {
        matches!(self, ReadOnly::Asset | ReadOnly::Both)
    }
}

/// One amount input paired with an asset picker.
///
/// While an asset is selected a watcher task follows the wallet balance of
/// that asset. Selecting another asset replaces the watcher; clearing the
/// asset clears the balance.
pub struct TokenControl {
    label: String,
    value: FieldValue,
    readonly: ReadOnly,
    assets: Vec<Asset>,
    balances: Arc<dyn BalanceSource>,
    balance_tx: watch::Sender<Option<Amount>>,
    generation: Arc<AtomicU64>,
    watcher: Option<JoinHandle<()>>,
}

impl TokenControl {
    pub fn new(label: impl Into<String>, balances: Arc<dyn BalanceSource>) -> Self {
        let (balance_tx, _) = watch::channel(None);
        TokenControl {
            label: label.into(),
            value: FieldValue::default(),
            readonly: ReadOnly::Editable,
            assets: Vec::new(),
            balances,
            balance_tx,
            generation: Arc::new(AtomicU64::new(0)),
            watcher: None,
        }
    }

    pub fn with_readonly(mut self, readonly: ReadOnly) -> Self {
        self.readonly = readonly;
        self
    }

    /// Assets offered by the picker
    pub fn with_assets(mut self, assets: Vec<Asset>) -> Self {
        self.assets = assets;
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn value(&self) -> &FieldValue {
        &self.value
    }

    pub fn readonly(&self) -> ReadOnly {
        self.readonly
    }

    pub fn assets(&self) -> &[Asset] {
        &self.assets
    }

    pub fn set_assets(&mut self, assets: Vec<Asset>) {
        self.assets = assets;
    }

    /// User edit of the amount
    pub fn set_amount(&mut self, amount: Option<TokenAmount>) -> Result<(), SessionError> {
        if self.readonly.amount_locked() {
            return Err(SessionError::ReadOnly("amount"));
        }
        self.value.amount = amount;
        Ok(())
    }

    /// User edit of the amount as typed text. Blank input clears it.
    pub fn set_amount_input(&mut self, input: &str) -> Result<(), SessionError> {
        let amount = if input.trim().is_empty() {
            None
        } else {
            Some(TokenAmount::from_input(input)?)
        };
        self.set_amount(amount)
    }

    /// User pick of the asset
    pub fn set_asset(&mut self, asset: Option<Asset>) -> Result<(), SessionError> {
        if self.readonly.asset_locked() {
            return Err(SessionError::ReadOnly("asset"));
        }
        let previous = self.value.asset_id();
        self.value.asset = asset;
        self.resubscribe_if_changed(previous);
        Ok(())
    }

    /// Overwrite the whole value, e.g. with what the form derived.
    /// Read-only flags only restrict user edits.
    pub fn set_value(&mut self, value: FieldValue) {
        let previous = self.value.asset_id();
        self.value = value;
        self.resubscribe_if_changed(previous);
    }

    /// Wallet balance of the selected asset, once known
    pub fn balance(&self) -> Option<Amount> {
        *self.balance_tx.borrow()
    }

    pub fn subscribe_balance(&self) -> watch::Receiver<Option<Amount>> {
        self.balance_tx.subscribe()
    }

    fn resubscribe_if_changed(&mut self, previous: Option<AssetId>) {
        let current = self.value.asset_id();
        if current == previous && (current.is_none() || self.watcher.is_some()) {
            return;
        }

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(watcher) = self.watcher.take() {
            watcher.abort();
        }
        self.balance_tx.send_replace(None);

        let Some(asset) = current else {
            debug!("{}: asset cleared", self.label);
            return;
        };
        debug!("{}: following balance of {}", self.label, asset);

        let mut stream = self.balances.balance_of(asset);
        let balance_tx = self.balance_tx.clone();
        let latest = Arc::clone(&self.generation);
        self.watcher = Some(tokio::spawn(async move {
            while let Some(amount) = stream.next().await {
                // An aborted watcher may still be mid-flight on another worker
                balance_tx.send_if_modified(|current| {
                    if latest.load(Ordering::SeqCst) != generation || *current == Some(amount) {
                        return false;
                    }
                    *current = Some(amount);
                    true
                });
            }
        }));
    }
}

impl Drop for TokenControl {
    fn drop(&mut self) {
        if let Some(watcher) = self.watcher.take() {
            watcher.abort();
        }
    }
}
