//! Per-account write locks.
//!
//! Every posting and reversal on an account runs while holding that
//! account's lock, so balance reads and writes inside one unit of work never
//! interleave with another writer on the same account. Unrelated accounts
//! proceed concurrently.

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use surebank_types::AccountId;

/// Lock table shared across requests.
#[derive(Default)]
pub struct AccountLocks {
    locks: DashMap<AccountId, Arc<Mutex<()>>>,
}

impl AccountLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for the account's lock. Released when the guard drops.
    pub async fn acquire(&self, account_id: AccountId) -> OwnedMutexGuard<()> {
        // Clone the Arc out so the map shard is not held across the await.
        let lock = Arc::clone(
            &self
                .locks
                .entry(account_id)
                .or_insert_with(|| Arc::new(Mutex::new(()))),
        );
        lock.lock_owned().await
    }

    /// Number of accounts that have been locked at least once.
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}
