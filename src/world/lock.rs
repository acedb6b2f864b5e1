//! Per-directory locking for generation and reflow

use crate::types::NodeId;
use parking_lot::{Mutex, MutexGuard};
use std::collections::HashMap;
use std::sync::Arc;

/// Hands out one mutex per directory id.
///
/// Work on different directories never contends; two passes over the same
/// directory are serialized.
#[derive(Debug, Default)]
pub struct RoomLockManager {
    locks: Mutex<HashMap<NodeId, Arc<Mutex<()>>>>,
}

impl RoomLockManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lease on `dir_id`'s lock. The entry is forgotten when the last lease
    /// is dropped, on every exit path.
    pub fn lease(&self, dir_id: &NodeId) -> RoomLease<'_> {
        RoomLease {
            manager: self,
            lock: self.lock_for(dir_id),
        }
    }

    /// Lock handle for `dir_id`; hold its guard for the whole pass.
    pub fn lock_for(&self, dir_id: &NodeId) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock();
        locks
            .entry(dir_id.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    pub fn tracked(&self) -> usize {
        self.locks.lock().len()
    }
}

/// A held reference to one directory's lock
pub struct RoomLease<'a> {
    manager: &'a RoomLockManager,
    lock: Arc<Mutex<()>>,
}

impl RoomLease<'_> {
    pub fn lock(&self) -> MutexGuard<'_, ()> {
        self.lock.lock()
    }
}

impl Drop for RoomLease<'_> {
    fn drop(&mut self) {
        // Our own handle is still alive here and counts once more.
        self.manager.locks.lock().retain(|_, lock| {
            let own = usize::from(Arc::ptr_eq(lock, &self.lock));
            Arc::strong_count(lock) > 1 + own
        });
    }
}
