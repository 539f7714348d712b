use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use ergoswap_core::Amount;
use ergoswap_session::{
    AutoConfirm, SessionHandle, SessionState, Sources, Submission, SwapSession, TokenControl,
};
use ergoswap_sources::MemoryMarket;
use ergoswap_sync::{FormValues, Side};
use serde::Serialize;
use tracing::debug;

use crate::config::SwapConfig;

/// Form state plus the wallet balance shown next to each control
#[derive(Debug, Serialize)]
pub struct Report {
    #[serde(flatten)]
    pub state: SessionState,
    pub from_balance: Option<Amount>,
    pub to_balance: Option<Amount>,
}

/// Drives a swap session the way a user would, through two token controls
pub struct FormDriver {
    config: SwapConfig,
    handle: SessionHandle,
    from: TokenControl,
    to: TokenControl,
    timeout: Duration,
}

impl FormDriver {
    pub fn start(config: SwapConfig, initial: FormValues) -> Result<Self> {
        let market = Arc::new(MemoryMarket::from_config(&config.market)?);
        let handle = SwapSession::spawn(
            Sources::from_market(market.clone()),
            initial.clone(),
            config.market.fees.clone(),
            Arc::new(AutoConfirm::default()),
        );

        let mut from = TokenControl::new("From", market.clone())
            .with_assets(config.market.assets.clone());
        let mut to = TokenControl::new("To", market);
        from.set_value(initial.from);
        to.set_value(initial.to);

        Ok(FormDriver {
            timeout: Duration::from_millis(config.settle_timeout_ms),
            config,
            handle,
            from,
            to,
        })
    }

    fn control_mut(&mut self, side: Side) -> &mut TokenControl {
        match side {
            Side::From => &mut self.from,
            Side::To => &mut self.to,
        }
    }

    /// Apply a user edit to one control and forward it to the session.
    /// An empty `amount` clears the field.
    pub fn edit(&mut self, side: Side, asset: Option<&str>, amount: Option<&str>) -> Result<()> {
        let asset = asset.map(|key| self.config.asset(key)).transpose()?;
        let control = self.control_mut(side);
        if let Some(asset) = asset {
            control.set_asset(Some(asset))?;
        }
        if let Some(input) = amount {
            control.set_amount_input(input)?;
        }
        debug!("{} edited: {:?}", control.label(), control.value());
        let value = control.value().clone();
        self.handle.edit_field(side, value)?;
        Ok(())
    }

    /// Wait for pending lookups, then mirror the form into the controls
    pub async fn settle(&mut self) -> Result<Report> {
        let state = tokio::time::timeout(self.timeout, self.handle.settled())
            .await
            .context("Timed out waiting for lookups")??;

        self.from.set_value(state.form.from.clone());
        self.to.set_value(state.form.to.clone());
        self.to.set_assets(state.form.to_assets.clone());

        let from_balance = wait_balance(&self.from, self.timeout).await;
        let to_balance = wait_balance(&self.to, self.timeout).await;
        Ok(Report {
            state,
            from_balance,
            to_balance,
        })
    }

    pub async fn submit(&self) -> Result<Submission> {
        Ok(self.handle.submit().await?)
    }

    pub async fn shutdown(self) -> Result<()> {
        self.handle.shutdown().await?;
        Ok(())
    }
}

async fn wait_balance(control: &TokenControl, timeout: Duration) -> Option<Amount> {
    control.value().asset.as_ref()?;
    let mut rx = control.subscribe_balance();
    let balance = match tokio::time::timeout(timeout, rx.wait_for(|b| b.is_some())).await {
        Ok(Ok(balance)) => *balance,
        _ => None,
    };
    balance
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::generate_sample_config;
    use ergoswap_sync::{ActionState, FieldValue, GateReason};

    fn amt(s: &str) -> Amount {
        Amount::parse(s).unwrap()
    }

    fn start(from: &str, to: &str) -> FormDriver {
        let config = generate_sample_config().unwrap();
        let initial = FormValues {
            from: FieldValue::new(Some(config.asset(from).unwrap()), None),
            to: FieldValue::new(Some(config.asset(to).unwrap()), None),
        };
        FormDriver::start(config, initial).unwrap()
    }

    #[tokio::test]
    async fn test_quote_against_sample_market() {
        let mut driver = start("ERG", "SigUSD");
        let report = driver.settle().await.unwrap();
        assert_eq!(report.state.form.pool.as_ref().unwrap().lp, 1_000_000);
        assert_eq!(report.from_balance, Some(amt("250")));
        assert_eq!(report.to_balance, Some(amt("120.5")));

        driver.edit(Side::From, None, Some("10")).unwrap();
        let report = driver.settle().await.unwrap();
        let to = report.state.form.to.entered_amount().unwrap();
        assert!(to > amt("14.9") && to < amt("15"));
        assert!(report.state.action.is_ready());

        let submission = driver.submit().await.unwrap();
        assert_eq!(submission.request.from.amount, amt("10"));
        driver.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_switching_from_asset() {
        let mut driver = start("ERG", "SigRSV");
        driver.settle().await.unwrap();

        driver.edit(Side::From, Some("SigUSD"), Some("1")).unwrap();
        let report = driver.settle().await.unwrap();
        assert!(report.state.form.to.asset.is_none());
        assert_eq!(report.to_balance, None);
        assert_eq!(
            report.state.action,
            ActionState::Blocked {
                reason: GateReason::TokensNotSelected
            }
        );
    }

    #[tokio::test]
    async fn test_unknown_asset_rejected() {
        let mut driver = start("ERG", "SigUSD");
        assert!(driver.edit(Side::To, Some("DOGE"), None).is_err());
    }
}
