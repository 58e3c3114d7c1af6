use std::time::Duration;

use url::Url;

use crate::connection::{Credentials, HandlerKind};

/// Builds and checks the connections a pool hands out.
///
/// The pool treats `Connection` as opaque: whatever protocol operations the caller runs
/// through a checked-out handle belong to the implementor.
pub trait Manager: 'static + Send + Sync {
    type Connection: Send;
    type Error: std::error::Error + Send + Sync + 'static;

    /// Whether this manager can build connections for `kind`.
    fn supports(&self, kind: HandlerKind) -> bool {
        matches!(kind, HandlerKind::Grpc | HandlerKind::Http)
    }

    /// Create the connection a new pool record will own.
    fn connect(&self, kind: HandlerKind, endpoint: &Url) -> Result<Self::Connection, Self::Error>;

    /// Lightweight liveness check, run before checkout when pre-ping is enabled.
    fn ping(
        &self,
        conn: &mut Self::Connection,
        credentials: Option<&Credentials>,
        timeout: Duration,
    ) -> Result<(), Self::Error>;
}
