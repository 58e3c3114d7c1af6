use std::{fmt, str::FromStr, time::Duration};

use url::Url;

use crate::pool::error::{PoolError, PoolResult};

/// Transport family used to talk to the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandlerKind {
    Grpc,
    Http,
}

impl FromStr for HandlerKind {
    type Err = PoolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GRPC" => Ok(HandlerKind::Grpc),
            "HTTP" => Ok(HandlerKind::Http),
            _ => Err(PoolError::Configuration(
                "Unknown handler type. Use GRPC or HTTP".into(),
            )),
        }
    }
}

impl fmt::Display for HandlerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandlerKind::Grpc => write!(f, "GRPC"),
            HandlerKind::Http => write!(f, "HTTP"),
        }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

pub struct ConnectionOptionsBuilder {
    endpoint: String,
    options: ConnectionOptions,
}

impl ConnectionOptionsBuilder {
    pub fn endpoint<T>(mut self, endpoint: T) -> Self
    where
        T: Into<String>,
    {
        self.endpoint = endpoint.into();
        self
    }

    pub fn handler(mut self, handler: HandlerKind) -> Self {
        self.options.handler = handler;
        self
    }

    pub fn pool_size(mut self, pool_size: u32) -> Self {
        self.options.pool_size = pool_size;
        self
    }

    /// Maximum age of a connection. Stored and reported only; records are never retired by age.
    pub fn recycle(mut self, recycle: Option<Duration>) -> Self {
        self.options.recycle = recycle;
        self
    }

    /// How long a blocking fetch waits for a connection to be released.
    pub fn wait_timeout(mut self, wait_timeout: Duration) -> Self {
        self.options.wait_timeout = wait_timeout;
        self
    }

    /// Check the server is reachable before every checkout.
    pub fn pre_ping(mut self, pre_ping: bool) -> Self {
        self.options.pre_ping = pre_ping;
        self
    }

    pub fn credentials(mut self, username: &str, password: &str) -> Self {
        self.options.credentials = Some(Credentials {
            username: String::from(username),
            password: String::from(password),
        });
        self
    }

    pub fn build(mut self) -> PoolResult<ConnectionOptions> {
        self.options.endpoint = Url::parse(&self.endpoint).map_err(|e| {
            PoolError::Configuration(format!("invalid endpoint {:?}: {}", self.endpoint, e))
        })?;
        if self.options.pool_size == 0 {
            return Err(PoolError::Configuration(
                "pool_size must be at least 1".into(),
            ));
        }
        Ok(self.options)
    }
}

#[derive(Clone, Debug)]
pub struct ConnectionOptions {
    pub(crate) endpoint: Url,
    pub(crate) handler: HandlerKind,
    pub(crate) pool_size: u32,
    pub(crate) recycle: Option<Duration>,
    pub(crate) wait_timeout: Duration,
    pub(crate) pre_ping: bool,
    pub(crate) credentials: Option<Credentials>,
}

pub(crate) const DEFAULT_ENDPOINT: &str = "tcp://localhost:19530";

impl Default for ConnectionOptions {
    fn default() -> ConnectionOptions {
        ConnectionOptions {
            endpoint: Url::parse(DEFAULT_ENDPOINT).expect("default endpoint is a valid url"),
            handler: HandlerKind::Grpc,
            pool_size: 10,
            recycle: None,
            wait_timeout: Duration::from_secs(10),
            pre_ping: false,
            credentials: None,
        }
    }
}

impl ConnectionOptions {
    pub fn builder() -> ConnectionOptionsBuilder {
        ConnectionOptionsBuilder {
            endpoint: String::from(DEFAULT_ENDPOINT),
            options: ConnectionOptions::default(),
        }
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn handler(&self) -> HandlerKind {
        self.handler
    }

    pub fn pool_size(&self) -> u32 {
        self.pool_size
    }

    pub fn recycle(&self) -> Option<Duration> {
        self.recycle
    }

    pub fn wait_timeout(&self) -> Duration {
        self.wait_timeout
    }

    pub fn pre_ping(&self) -> bool {
        self.pre_ping
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    pub fn into_builder(self) -> ConnectionOptionsBuilder {
        ConnectionOptionsBuilder {
            endpoint: self.endpoint.to_string(),
            options: self,
        }
    }
}

impl TryFrom<&str> for ConnectionOptions {
    type Error = PoolError;

    fn try_from(endpoint: &str) -> Result<Self, Self::Error> {
        ConnectionOptions::builder().endpoint(endpoint).build()
    }
}
