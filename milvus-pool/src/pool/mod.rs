pub mod config;
pub mod error;
pub mod guard;
pub mod manager;
pub mod record;
pub mod scoped;
pub mod state;
pub mod stats;

use std::{
    fmt,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Instant,
};

use config::PoolConfig;
use crossbeam_queue::ArrayQueue;
use error::{PoolError, PoolResult};
use guard::SlotGuard;
use manager::Manager;
use parking_lot::{Condvar, Mutex};
use record::ConnectionRecord;
use scoped::ScopedConnection;
use state::{PoolState, RecordId};
use stats::{PoolStats, UsageDuration, UsageHistory};
use tracing::{debug, trace};
use url::Url;

use crate::connection::ConnectionOptions;

/// Bounded pool of connections to a single endpoint.
///
/// Clones share the same records, capacity and usage history.
pub struct Pool<M: Manager> {
    inner: Arc<PoolInner<M>>,
}

impl<M: Manager> Clone for Pool<M> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<M: Manager> Pool<M> {
    /// Fails with [`PoolError::Configuration`] if `manager` cannot serve the configured handler.
    pub fn new(manager: M, options: ConnectionOptions) -> PoolResult<Self> {
        if !manager.supports(options.handler()) {
            return Err(PoolError::Configuration(format!(
                "handler {} is not supported by this connection manager",
                options.handler()
            )));
        }
        if options.pool_size() == 0 {
            return Err(PoolError::Configuration(
                "pool_size must be at least 1".into(),
            ));
        }

        Ok(Self {
            inner: PoolInner::new_arc(manager, options),
        })
    }

    /// Check out a connection.
    ///
    /// An idle connection is reused when there is one, otherwise a new one is created while
    /// the pool is under capacity. At capacity a non-blocking fetch fails at once with
    /// [`PoolError::PoolExhausted`]; a blocking fetch waits up to the configured
    /// `wait_timeout` for a connection to be released first. A blocking fetch below
    /// capacity opens a new connection rather than waiting for an idle one.
    /// A `wait_timeout` too large to form a deadline waits without limit.
    pub fn fetch(&self, block: bool) -> PoolResult<ScopedConnection<M>> {
        self.inner.fetch(block)
    }

    /// Return a record to the idle queue. [`ScopedConnection`] calls this on close.
    pub fn release(&self, record: ConnectionRecord<M>) {
        self.inner.release(record)
    }

    pub fn record_duration(&self, id: RecordId, duration: UsageDuration) {
        self.inner.record_duration(id, duration)
    }

    pub fn stats(&self) -> PoolStats {
        self.inner.stats()
    }

    /// Connections currently open, checked out or idle.
    pub fn count(&self) -> u32 {
        self.inner.count()
    }

    /// Connections currently checked out.
    pub fn active_count(&self) -> u32 {
        self.inner.active_count()
    }

    pub fn idle_count(&self) -> u32 {
        self.inner.idle_records.len() as u32
    }

    pub fn capacity(&self) -> u32 {
        self.inner.config.pool_size
    }

    pub fn endpoint(&self) -> &Url {
        self.inner.options.endpoint()
    }

    pub fn config(&self) -> &PoolConfig {
        &self.inner.config
    }
}

impl<M: Manager> fmt::Debug for Pool<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pool")
            .field("endpoint", &self.endpoint().as_str())
            .field("capacity", &self.capacity())
            .field("count", &self.count())
            .field("idle", &self.idle_count())
            .finish()
    }
}

enum Checkout<M: Manager> {
    Idle(ConnectionRecord<M>),
    Reserved(SlotGuard<M>),
}

pub struct PoolInner<M: Manager> {
    manager: M,
    options: ConnectionOptions,
    config: PoolConfig,
    state: Mutex<PoolState>,
    released: Condvar,
    idle_records: ArrayQueue<ConnectionRecord<M>>,
    history: Mutex<UsageHistory>,
    next_id: AtomicU64,
}

impl<M: Manager> PoolInner<M> {
    pub fn new_arc(manager: M, options: ConnectionOptions) -> Arc<Self> {
        let config = PoolConfig::from(&options);

        Arc::new(Self {
            manager,
            options,
            config,
            state: Mutex::new(PoolState::default()),
            released: Condvar::new(),
            idle_records: ArrayQueue::new(config.pool_size as usize),
            history: Mutex::new(UsageHistory::default()),
            next_id: AtomicU64::new(0),
        })
    }

    pub fn fetch(self: &Arc<Self>, block: bool) -> PoolResult<ScopedConnection<M>> {
        match self.checkout(block)? {
            Checkout::Idle(record) => {
                trace!(record_id = %record.id(), "reusing idle connection");
                Ok(ScopedConnection::new(self.clone(), record))
            }
            Checkout::Reserved(guard) => self.create(guard),
        }
    }

    /// Admission runs entirely under the state lock. Only the slot is reserved here; the
    /// connection itself is created after the lock is dropped.
    fn checkout(self: &Arc<Self>, block: bool) -> PoolResult<Checkout<M>> {
        let deadline = Instant::now().checked_add(self.config.wait_timeout);
        let mut state = self.state.lock();

        loop {
            if let Some(record) = self.idle_records.pop() {
                return Ok(Checkout::Idle(record));
            }

            if state.try_reserve(self.config.pool_size) {
                return Ok(Checkout::Reserved(SlotGuard::new(self.clone())));
            }

            let expired = deadline.map_or(false, |deadline| Instant::now() >= deadline);
            if !block || expired {
                debug!(
                    endpoint = %self.options.endpoint(),
                    in_use = state.in_use,
                    block,
                    "connection pool exhausted"
                );
                return Err(PoolError::PoolExhausted {
                    wait_timeout: self.config.wait_timeout,
                });
            }

            match deadline {
                Some(deadline) => {
                    self.released.wait_until(&mut state, deadline);
                }
                None => self.released.wait(&mut state),
            }
        }
    }

    fn create(self: &Arc<Self>, guard: SlotGuard<M>) -> PoolResult<ScopedConnection<M>> {
        let id = RecordId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let record = ConnectionRecord::new(id, &self.manager, &self.options)?;
        guard.commit();

        debug!(
            record_id = %id,
            endpoint = %self.options.endpoint(),
            handler = %self.options.handler(),
            "created pooled connection"
        );
        Ok(ScopedConnection::new(self.clone(), record))
    }

    pub fn release(&self, record: ConnectionRecord<M>) {
        let id = record.id();
        match self.idle_records.push(record) {
            Ok(()) => {
                trace!(record_id = %id, "connection returned to pool");
                let _state = self.state.lock();
                self.released.notify_one();
            }
            Err(record) => {
                debug!(record_id = %record.id(), "idle queue full, dropping connection");
            }
        }
    }

    pub(crate) fn free_slot(&self) {
        let mut state = self.state.lock();
        state.free();
        self.released.notify_one();
    }

    pub fn record_duration(&self, id: RecordId, duration: UsageDuration) {
        trace!(record_id = %id, elapsed = ?duration.value(), "recording connection usage");
        self.history.lock().record(id, duration);
    }

    pub fn stats(&self) -> PoolStats {
        self.history.lock().stats()
    }

    pub fn count(&self) -> u32 {
        self.state.lock().in_use
    }

    pub fn active_count(&self) -> u32 {
        let state = self.state.lock();
        state
            .in_use
            .saturating_sub(self.idle_records.len() as u32)
    }

    pub(crate) fn manager(&self) -> &M {
        &self.manager
    }
}
