use std::time::Duration;

use crate::connection::ConnectionOptions;

#[derive(Debug, Clone, Copy)]
#[non_exhaustive]
pub struct PoolConfig {
    pub pool_size: u32,
    pub wait_timeout: Duration,
    pub recycle: Option<Duration>,
}

impl PoolConfig {
    pub fn new(pool_size: u32) -> Self {
        Self {
            pool_size,
            ..Default::default()
        }
    }

    pub fn with_wait_timeout(mut self, wait_timeout: Option<Duration>) -> Self {
        self.wait_timeout = wait_timeout.unwrap_or(Duration::from_secs(10));
        self
    }

    pub fn with_recycle(mut self, recycle: Option<Duration>) -> Self {
        self.recycle = recycle;
        self
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            pool_size: 10,
            wait_timeout: Duration::from_secs(10),
            recycle: None,
        }
    }
}

impl From<&ConnectionOptions> for PoolConfig {
    fn from(options: &ConnectionOptions) -> Self {
        PoolConfig::new(options.pool_size())
            .with_wait_timeout(Some(options.wait_timeout()))
            .with_recycle(options.recycle())
    }
}
