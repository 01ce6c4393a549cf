//! Per-invoice mutual exclusion inside one server process.
//!
//! The database transaction is what actually keeps the ledger consistent;
//! this lock queues writers for the same invoice so they do not pile up on
//! SQLite's busy timeout.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

#[derive(Clone, Default)]
pub struct AggregateLocks {
    slots: Arc<Mutex<HashMap<i64, Arc<AsyncMutex<()>>>>>,
}

impl AggregateLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits until no other caller holds the lock for `aggregate_id`.
    pub async fn acquire(&self, aggregate_id: i64) -> OwnedMutexGuard<()> {
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            // drop slots nobody is waiting on
            slots.retain(|id, slot| *id == aggregate_id || Arc::strong_count(slot) > 1);
            slots
                .entry(aggregate_id)
                .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                .clone()
        };
        slot.lock_owned().await
    }
}
