use ergoswap_core::{Asset, AssetId, SharedPool};

use crate::lookup::Ticket;
use crate::model::FormValues;

/// Messages consumed by the synchronizer, in arrival order
#[derive(Debug, Clone)]
pub enum FormEvent {
    /// The user edited one or more fields; carries the full new values
    ValuesChanged(FormValues),
    /// A pool lookup produced a list
    PoolsResolved { ticket: Ticket, pools: Vec<SharedPool> },
    /// A pool lookup terminated without a list
    PoolsFailed { ticket: Ticket, reason: String },
    /// Assets that can be paired with the `from` asset
    PairedAssetsResolved { ticket: Ticket, assets: Vec<Asset> },
}

/// Side effects requested by the synchronizer. The owner runs them and
/// feeds the results back as `FormEvent`s.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Look up pools trading `base`, narrowed to `quote` when present
    LookupPools {
        ticket: Ticket,
        base: AssetId,
        quote: Option<AssetId>,
    },
    /// List assets for the `to` picker; `None` lists everything
    LookupPairedAssets {
        ticket: Ticket,
        paired_with: Option<AssetId>,
    },
}

impl Command {
    pub fn ticket(&self) -> Ticket {
        match self {
            Command::LookupPools { ticket, .. } => *ticket,
            Command::LookupPairedAssets { ticket, .. } => *ticket,
        }
    }
}
