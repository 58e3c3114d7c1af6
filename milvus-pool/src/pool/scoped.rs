use std::{fmt, sync::Arc};

use super::{
    error::{PoolError, PoolResult},
    manager::Manager,
    record::ConnectionRecord,
    state::RecordId,
    stats::UsageDuration,
    PoolInner,
};

/// A connection checked out of a [`Pool`](super::Pool).
///
/// The connection goes back to the pool, and its usage time is recorded, when the handle is
/// closed or dropped. Once closed, every accessor fails with [`PoolError::UseAfterClose`].
pub struct ScopedConnection<M: Manager> {
    pool: Arc<PoolInner<M>>,
    record: Option<ConnectionRecord<M>>,
    duration: Option<UsageDuration>,
    closed: bool,
}

impl<M: Manager> ScopedConnection<M> {
    pub(crate) fn new(pool: Arc<PoolInner<M>>, record: ConnectionRecord<M>) -> Self {
        Self {
            pool,
            record: Some(record),
            duration: Some(UsageDuration::start()),
            closed: false,
        }
    }

    /// The underlying connection, pinged first if the pool was configured with pre-ping.
    pub fn client(&mut self) -> PoolResult<&mut M::Connection> {
        if self.closed {
            return Err(PoolError::UseAfterClose);
        }
        let record = self.record.as_mut().ok_or(PoolError::UseAfterClose)?;
        record.connection(self.pool.manager())
    }

    pub fn record(&self) -> PoolResult<&ConnectionRecord<M>> {
        if self.closed {
            return Err(PoolError::UseAfterClose);
        }
        self.record.as_ref().ok_or(PoolError::UseAfterClose)
    }

    pub fn conn_id(&self) -> Option<RecordId> {
        self.record.as_ref().map(|record| record.id())
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Return the connection to the pool. Calling this again is a no-op.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;

        if let Some(record) = self.record.take() {
            if let Some(mut duration) = self.duration.take() {
                duration.stop();
                self.pool.record_duration(record.id(), duration);
            }
            self.pool.release(record);
        }
    }
}

impl<M: Manager> Drop for ScopedConnection<M> {
    fn drop(&mut self) {
        self.close();
    }
}

impl<M: Manager> fmt::Debug for ScopedConnection<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopedConnection")
            .field("record", &self.record)
            .field("closed", &self.closed)
            .finish()
    }
}
