use ergoswap_core::{AssetAmount, PoolError, SharedPool, TokenAmount};
use tracing::{debug, warn};

use crate::event::{Command, FormEvent};
use crate::lookup::{LookupTracker, QueryKey, Ticket};
use crate::model::{FieldValue, FormModel, FormValues, Side};
use crate::selection::select_best_pool;

/// Single owner of the swap form state.
///
/// Every change arrives as a [`FormEvent`]; `reduce` applies the
/// reconciliation rules in a fixed order and returns the lookups the
/// caller has to run. Lookup results come back through `reduce` too, so
/// nothing else ever writes to the model.
#[derive(Debug, Clone)]
pub struct Synchronizer {
    model: FormModel,
    lookups: LookupTracker,
}

impl Synchronizer {
    pub fn new(initial: FormValues) -> Self {
        Synchronizer {
            model: FormModel::new(initial),
            lookups: LookupTracker::new(),
        }
    }

    pub fn model(&self) -> &FormModel {
        &self.model
    }

    /// Lookups needed right after mount: the `to` picker list for the
    /// initial `from` asset, and pools if the initial values name a pair.
    pub fn start(&mut self) -> Vec<Command> {
        let mut commands = vec![Command::LookupPairedAssets {
            ticket: self.lookups.issue(QueryKey::PairedAssets),
            paired_with: self.model.from.asset_id(),
        }];
        if let (Some(base), Some(quote)) = (self.model.from.asset_id(), self.model.to.asset_id()) {
            commands.push(Command::LookupPools {
                ticket: self.lookups.issue(QueryKey::Pools),
                base,
                quote: Some(quote),
            });
        }
        commands
    }

    pub fn reduce(&mut self, event: FormEvent) -> Vec<Command> {
        match event {
            FormEvent::ValuesChanged(values) => self.on_values_change(values),
            FormEvent::PoolsResolved { ticket, pools } => {
                self.on_pools_resolved(ticket, pools);
                Vec::new()
            }
            FormEvent::PoolsFailed { ticket, reason } => {
                if self.lookups.is_current(&ticket) {
                    warn!("Pool lookup failed: {}", reason);
                    self.clear_pool();
                }
                Vec::new()
            }
            FormEvent::PairedAssetsResolved { ticket, assets } => {
                if self.lookups.is_current(&ticket) {
                    self.model.to_assets = assets;
                } else {
                    debug!("Discarding superseded asset list (gen {})", ticket.generation);
                }
                Vec::new()
            }
        }
    }

    fn on_values_change(&mut self, next: FormValues) -> Vec<Command> {
        let prev = self.model.values();
        let mut commands = Vec::new();

        self.model.from = next.from.clone();
        self.model.to = next.to.clone();

        let from_amount_changed = next.from.amount != prev.from.amount;
        let to_amount_changed = next.to.amount != prev.to.amount;

        // 1. New `from` asset: the old pair is gone
        if next.from.asset_id() != prev.from.asset_id() {
            debug!("from asset changed, clearing to and pool");
            self.model.to = FieldValue::default();
            self.model.pool = None;
            self.model.liquidity_shortfall = false;
            commands.push(Command::LookupPairedAssets {
                ticket: self.lookups.issue(QueryKey::PairedAssets),
                paired_with: next.from.asset_id(),
            });
            match next.from.asset_id() {
                Some(base) => commands.push(Command::LookupPools {
                    ticket: self.lookups.issue(QueryKey::Pools),
                    base,
                    quote: None,
                }),
                None => self.lookups.invalidate(QueryKey::Pools),
            }
        }

        // 2. New `to` asset with both sides chosen: look up the pair
        if let (Some(base), Some(quote)) = (self.model.from.asset_id(), self.model.to.asset_id()) {
            if next.to.asset_id() != prev.to.asset_id() {
                debug!("to asset changed, looking up pools for pair");
                commands.push(Command::LookupPools {
                    ticket: self.lookups.issue(QueryKey::Pools),
                    base,
                    quote: Some(quote),
                });
            }
        }

        // A pool priced for another pair is never reused
        if self.model.pool.is_some() && self.model.active_pool().is_none() {
            debug!("pool no longer matches the pair, dropping it");
            self.model.pool = None;
            self.model.liquidity_shortfall = false;
        }

        let pool = self.model.active_pool().cloned();

        // 3. / 4. No price yet: the opposite amount would be stale
        if pool.is_none() {
            if from_amount_changed {
                self.model.to.amount = None;
            }
            if to_amount_changed {
                self.model.from.amount = None;
            }
        }

        // 5. / 6. Price the opposite side through the pool. Both sources
        // are the submitted values, never an amount derived in this pass.
        if let Some(pool) = pool {
            if from_amount_changed {
                self.derive(Side::To, &next.from, &pool);
            }
            if to_amount_changed {
                self.derive(Side::From, &next.to, &pool);
            }
        }

        commands
    }

    // 7. Re-select the pool once a lookup lands
    fn on_pools_resolved(&mut self, ticket: Ticket, pools: Vec<SharedPool>) {
        if !self.lookups.is_current(&ticket) {
            debug!("Discarding superseded pool list (gen {})", ticket.generation);
            return;
        }

        let candidates: Vec<SharedPool> = match (self.model.from.asset_id(), self.model.to.asset_id()) {
            (Some(from), Some(to)) => pools.into_iter().filter(|p| p.has_pair(&from, &to)).collect(),
            _ => Vec::new(),
        };

        let best = match select_best_pool(&candidates) {
            Some(best) => best.clone(),
            None => {
                debug!("No pool for the current pair");
                self.clear_pool();
                return;
            }
        };

        if self.model.pool_id() == Some(best.id()) {
            return;
        }
        debug!("Selected pool {} (lp {})", best.id(), best.lp());
        self.model.pool = Some(best.clone());
        self.model.liquidity_shortfall = false;

        if self.model.from.amount.is_some() {
            let from = self.model.from.clone();
            self.derive(Side::To, &from, &best);
        } else if self.model.to.amount.is_some() {
            let to = self.model.to.clone();
            self.derive(Side::From, &to, &best);
        }
    }

    /// Drop the pool and any amount that was priced through it
    fn clear_pool(&mut self) {
        self.model.pool = None;
        self.model.liquidity_shortfall = false;
        if self.model.from.amount.is_some() {
            self.model.to.amount = None;
        }
    }

    /// Recompute the amount on `target` from `source`, the opposite field
    fn derive(&mut self, target: Side, source: &FieldValue, pool: &SharedPool) {
        self.model.liquidity_shortfall = false;
        let source_amount = match (&source.asset, &source.amount) {
            (Some(asset), Some(amount)) => AssetAmount::from_amount(asset, &amount.value).ok(),
            _ => None,
        };

        let derived = match (target, source_amount) {
            (_, None) => None,
            (Side::To, Some(input)) => match pool.output_amount(&input) {
                Ok(out) => Some(out),
                Err(PoolError::InsufficientLiquidity) => {
                    debug!("Pool {} cannot price {} units", pool.id(), input.fractions);
                    self.model.liquidity_shortfall = true;
                    None
                }
                Err(e) => {
                    debug!("Forward conversion failed: {}", e);
                    None
                }
            },
            (Side::From, Some(output)) => pool.input_amount(&output),
        };

        self.model.field_mut(target).amount =
            derived.map(|a| TokenAmount::from_value(a.to_amount()));
    }
}
