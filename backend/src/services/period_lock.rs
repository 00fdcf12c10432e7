//! Per-(business, period) write serialization
//!
//! Every ledger-changing operation holds the lock for its key from the first
//! read to the commit, so two sales can never both pass a sufficiency check
//! against the same stale level. Unrelated keys never contend.

use std::sync::Arc;

use dashmap::DashMap;
use shared::Period;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

/// Idle entries are dropped once the registry grows past this size
const PRUNE_THRESHOLD: usize = 1024;

/// Ledger partition a writer must own
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LedgerKey {
    pub business_id: Uuid,
    pub period: Period,
}

impl LedgerKey {
    pub fn new(business_id: Uuid, period: Period) -> Self {
        Self {
            business_id,
            period,
        }
    }

    /// Stable text form, hashed into the database advisory lock id
    pub fn advisory_name(&self) -> String {
        format!(
            "inventory:{}:{}:{}:{}",
            self.business_id, self.period.year, self.period.month, self.period.week
        )
    }
}

/// In-process registry of per-key async locks
#[derive(Clone, Default)]
pub struct PeriodLocks {
    inner: Arc<DashMap<LedgerKey, Arc<Mutex<()>>>>,
}

impl PeriodLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive ownership of `key`; released when the guard drops
    pub async fn lock(&self, key: LedgerKey) -> OwnedMutexGuard<()> {
        if self.inner.len() > PRUNE_THRESHOLD {
            self.prune();
        }
        // Clone the Arc out so no map shard stays locked across the await.
        let mutex = self.inner.entry(key).or_default().clone();
        mutex.lock_owned().await
    }

    /// Drop entries nobody holds or waits on
    pub fn prune(&self) {
        self.inner.retain(|_, mutex| Arc::strong_count(mutex) > 1);
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
