use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Logical query a lookup answers. A newer request for the same key
/// supersedes every older one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QueryKey {
    Pools,
    PairedAssets,
    Balance,
}

/// Tag attached to a lookup request and echoed back with its result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ticket {
    pub key: QueryKey,
    pub generation: u64,
}

/// Generation counters per query key (last request wins)
#[derive(Debug, Clone, Default)]
pub struct LookupTracker {
    latest: HashMap<QueryKey, u64>,
}

impl LookupTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a new ticket for `key`, superseding all earlier ones
    pub fn issue(&mut self, key: QueryKey) -> Ticket {
        let generation = self.latest.entry(key).or_insert(0);
        *generation += 1;
        Ticket {
            key,
            generation: *generation,
        }
    }

    /// Supersede in-flight requests for `key` without issuing a new one
    pub fn invalidate(&mut self, key: QueryKey) {
        self.issue(key);
    }

    pub fn is_current(&self, ticket: &Ticket) -> bool {
        self.latest.get(&ticket.key) == Some(&ticket.generation)
    }
}
