use std::time::Duration;

use thiserror::Error;

pub type PoolResult<T> = Result<T, PoolError>;

#[derive(Debug, Error)]
pub enum PoolError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("connection pool is full, no connection released within {wait_timeout:?}")]
    PoolExhausted { wait_timeout: Duration },

    #[error("connection has been closed")]
    UseAfterClose,

    #[error("failed to reach the server: {0}")]
    Connectivity(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl PoolError {
    pub(crate) fn connectivity<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        PoolError::Connectivity(Box::new(err))
    }

    /// Exhaustion is the only error a caller can expect to clear by trying again later.
    pub fn is_exhausted(&self) -> bool {
        matches!(self, PoolError::PoolExhausted { .. })
    }
}
