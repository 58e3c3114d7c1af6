use std::{fmt, time::Duration};

use url::Url;

use super::{
    error::{PoolError, PoolResult},
    manager::Manager,
    state::{RecordId, RecordState},
};
use crate::connection::{ConnectionOptions, Credentials};

/// Timeout for the liveness check run before checkout.
pub const PRE_PING_TIMEOUT: Duration = Duration::from_secs(2);

/// One connection owned by a pool, idle or checked out.
pub struct ConnectionRecord<M: Manager> {
    id: RecordId,
    endpoint: Url,
    recycle: Option<Duration>,
    pre_ping: bool,
    credentials: Option<Credentials>,
    state: RecordState,
    connection: M::Connection,
}

impl<M: Manager> ConnectionRecord<M> {
    pub(crate) fn new(id: RecordId, manager: &M, options: &ConnectionOptions) -> PoolResult<Self> {
        let connection = manager
            .connect(options.handler(), options.endpoint())
            .map_err(PoolError::connectivity)?;

        Ok(Self {
            id,
            endpoint: options.endpoint().clone(),
            recycle: options.recycle(),
            pre_ping: options.pre_ping(),
            credentials: options.credentials().cloned(),
            state: RecordState::default(),
            connection,
        })
    }

    /// Hand out the connection, probing the server first when pre-ping is enabled.
    ///
    /// A failed check comes back as [`PoolError::Connectivity`]; it is not retried.
    pub(crate) fn connection(&mut self, manager: &M) -> PoolResult<&mut M::Connection> {
        if self.pre_ping {
            manager
                .ping(
                    &mut self.connection,
                    self.credentials.as_ref(),
                    PRE_PING_TIMEOUT,
                )
                .map_err(PoolError::connectivity)?;
        }
        self.state.touch();
        Ok(&mut self.connection)
    }

    pub fn id(&self) -> RecordId {
        self.id
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Configured maximum age. Records are not retired when they exceed it.
    pub fn recycle(&self) -> Option<Duration> {
        self.recycle
    }

    pub fn age(&self) -> Duration {
        self.state.age()
    }

    pub fn idle_time(&self) -> Duration {
        self.state.idle_time()
    }
}

impl<M: Manager> fmt::Debug for ConnectionRecord<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionRecord")
            .field("id", &self.id)
            .field("endpoint", &self.endpoint.as_str())
            .field("recycle", &self.recycle)
            .field("pre_ping", &self.pre_ping)
            .field("age", &self.age())
            .finish()
    }
}
