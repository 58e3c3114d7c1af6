use std::{
    fmt,
    time::{Duration, Instant},
};

use serde_derive::Serialize;

/// Capacity accounting, guarded by the pool mutex.
#[derive(Debug, Default)]
#[non_exhaustive]
pub struct PoolState {
    /// Records alive right now, checked out or idle.
    pub in_use: u32,
}

impl PoolState {
    pub(crate) fn try_reserve(&mut self, capacity: u32) -> bool {
        if self.in_use < capacity {
            self.in_use += 1;
            true
        } else {
            false
        }
    }

    pub(crate) fn free(&mut self) {
        self.in_use = self.in_use.saturating_sub(1);
    }
}

/// Identity a pool assigns to each record it creates, in creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct RecordId(pub u64);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct RecordState {
    pub created: Instant,
    pub last_used: Instant,
}

impl Default for RecordState {
    fn default() -> Self {
        let now = Instant::now();
        Self {
            created: now,
            last_used: now,
        }
    }
}

impl RecordState {
    pub fn age(&self) -> Duration {
        self.created.elapsed()
    }

    pub fn idle_time(&self) -> Duration {
        self.last_used.elapsed()
    }

    pub fn touch(&mut self) {
        self.last_used = Instant::now();
    }
}
