use std::sync::Arc;

use super::{manager::Manager, PoolInner};

/// A capacity slot reserved for a record that is still being created.
///
/// Dropping the guard without calling [`SlotGuard::commit`] hands the slot back and wakes
/// one waiter, so a failed connect never leaks capacity.
pub struct SlotGuard<M: Manager> {
    pool: Arc<PoolInner<M>>,
    committed: bool,
}

impl<M: Manager> SlotGuard<M> {
    pub(crate) fn new(pool: Arc<PoolInner<M>>) -> Self {
        Self {
            pool,
            committed: false,
        }
    }

    /// The record now owns the slot.
    pub fn commit(mut self) {
        self.committed = true;
    }
}

impl<M: Manager> Drop for SlotGuard<M> {
    fn drop(&mut self) {
        if !self.committed {
            self.pool.free_slot();
        }
    }
}
