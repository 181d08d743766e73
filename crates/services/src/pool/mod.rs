//! Per-track working set of sampled cards.

mod batch;
mod cache;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use vocab_core::model::Track;

pub use batch::CardPool;
pub use cache::PoolCache;

/// Default number of cards sampled into one batch.
pub const DEFAULT_BATCH_SIZE: u32 = 50;
/// Default age after which a batch is re-sampled.
pub const DEFAULT_TTL_SECS: i64 = 5 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolConfig {
    pub batch_size: u32,
    pub ttl: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            ttl: Duration::seconds(DEFAULT_TTL_SECS),
        }
    }
}

impl PoolConfig {
    #[must_use]
    pub fn with_batch_size(mut self, batch_size: u32) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    #[must_use]
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}

/// Occupancy and usage counters for one track, for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PoolStats {
    pub track: Track,
    pub pool_size: usize,
    pub shown: usize,
    pub available: usize,
    pub total_cards_used: u64,
    pub generation: u64,
    pub last_refresh: Option<DateTime<Utc>>,
}
