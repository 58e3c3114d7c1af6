//! Bounded, thread-safe connection pool for a single Milvus endpoint.
//!
//! ```no_run
//! # use milvus_pool::{ConnectionOptions, Manager, Pool, PoolResult};
//! # fn run<M: Manager>(manager: M) -> PoolResult<()> {
//! let options = ConnectionOptions::builder()
//!     .endpoint("tcp://localhost:19530")
//!     .pool_size(4)
//!     .pre_ping(true)
//!     .build()?;
//! let pool = Pool::new(manager, options)?;
//!
//! let mut conn = pool.fetch(true)?;
//! let _client = conn.client()?;
//! // `conn` goes back to the pool when it is dropped.
//! # Ok(())
//! # }
//! ```

pub mod connection;
pub mod pool;
pub mod tcp;

pub use connection::{ConnectionOptions, ConnectionOptionsBuilder, Credentials, HandlerKind};
pub use pool::{
    config::PoolConfig,
    error::{PoolError, PoolResult},
    manager::Manager,
    record::{ConnectionRecord, PRE_PING_TIMEOUT},
    scoped::ScopedConnection,
    state::RecordId,
    stats::{ConnectionStats, PoolStats, UsageDuration, MAX_DURATIONS_PER_RECORD},
    Pool,
};
pub use tcp::{TcpConnection, TcpManager};
