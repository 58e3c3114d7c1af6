//! Plain TCP [`Manager`] for deployments that only need socket-level reachability.
//!
//! Protocol handlers layer their own framing on top of the stream handed out by
//! [`TcpConnection::stream`]. The pre-ping check opens a separate short-lived socket to the
//! peer and leaves that stream in place.

use std::{
    io,
    net::{SocketAddr, TcpStream, ToSocketAddrs},
    time::Duration,
};

use tracing::debug;
use url::Url;

use crate::{
    connection::{Credentials, HandlerKind},
    pool::manager::Manager,
};

const DEFAULT_GRPC_PORT: u16 = 19530;
const DEFAULT_HTTP_PORT: u16 = 19121;

#[derive(Debug, Clone)]
pub struct TcpManager {
    connect_timeout: Duration,
}

impl TcpManager {
    pub fn new(connect_timeout: Duration) -> Self {
        Self { connect_timeout }
    }
}

impl Default for TcpManager {
    fn default() -> Self {
        Self::new(Duration::from_secs(10))
    }
}

#[derive(Debug)]
pub struct TcpConnection {
    addr: SocketAddr,
    stream: TcpStream,
}

impl TcpConnection {
    fn open(addr: SocketAddr, timeout: Duration) -> io::Result<Self> {
        let stream = TcpStream::connect_timeout(&addr, timeout)?;
        stream.set_nodelay(true)?;
        Ok(Self { addr, stream })
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn stream(&mut self) -> &mut TcpStream {
        &mut self.stream
    }
}

fn resolve(kind: HandlerKind, endpoint: &Url) -> io::Result<SocketAddr> {
    let host = endpoint
        .host_str()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "endpoint has no host"))?;
    let port = endpoint.port().unwrap_or(match kind {
        HandlerKind::Grpc => DEFAULT_GRPC_PORT,
        HandlerKind::Http => DEFAULT_HTTP_PORT,
    });

    (host, port).to_socket_addrs()?.next().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::NotFound,
            format!("no address found for {}:{}", host, port),
        )
    })
}

impl Manager for TcpManager {
    type Connection = TcpConnection;
    type Error = io::Error;

    fn connect(&self, kind: HandlerKind, endpoint: &Url) -> io::Result<TcpConnection> {
        let addr = resolve(kind, endpoint)?;
        debug!(%addr, handler = %kind, "opening tcp connection");
        TcpConnection::open(addr, self.connect_timeout)
    }

    /// Checks the peer still accepts connections; the pooled stream is left untouched.
    /// Credentials are left to the protocol layer.
    fn ping(
        &self,
        conn: &mut TcpConnection,
        _credentials: Option<&Credentials>,
        timeout: Duration,
    ) -> io::Result<()> {
        TcpStream::connect_timeout(&conn.addr, timeout)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::net::TcpListener;

    use super::*;

    #[test]
    fn it_should_connect() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let endpoint = Url::parse(&format!("tcp://127.0.0.1:{}", port)).unwrap();

        let manager = TcpManager::default();
        let mut conn = manager.connect(HandlerKind::Grpc, &endpoint).unwrap();
        assert_eq!(conn.peer_addr().port(), port);
        let local = conn.stream().local_addr().unwrap();

        manager
            .ping(&mut conn, None, Duration::from_secs(2))
            .unwrap();
        assert_eq!(conn.stream().local_addr().unwrap(), local);
    }

    #[test]
    fn default_port_follows_handler() {
        let endpoint = Url::parse("tcp://127.0.0.1").unwrap();

        assert_eq!(
            resolve(HandlerKind::Grpc, &endpoint).unwrap().port(),
            DEFAULT_GRPC_PORT
        );
        assert_eq!(
            resolve(HandlerKind::Http, &endpoint).unwrap().port(),
            DEFAULT_HTTP_PORT
        );
    }

    #[test]
    fn pooled_tcp_connections_are_reused() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let options = crate::ConnectionOptions::builder()
            .endpoint(format!("tcp://127.0.0.1:{}", port))
            .pool_size(2)
            .pre_ping(true)
            .build()
            .unwrap();
        let pool = crate::Pool::new(TcpManager::default(), options).unwrap();

        let mut conn = pool.fetch(false).unwrap();
        assert_eq!(conn.client().unwrap().peer_addr().port(), port);
        let id = conn.conn_id();
        drop(conn);

        let conn = pool.fetch(false).unwrap();
        assert_eq!(conn.conn_id(), id);
        assert_eq!(pool.count(), 1);
    }

    #[test]
    fn ping_fails_when_server_is_gone() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let endpoint = Url::parse(&format!("tcp://127.0.0.1:{}", port)).unwrap();

        let manager = TcpManager::default();
        let mut conn = manager.connect(HandlerKind::Grpc, &endpoint).unwrap();
        drop(listener);

        assert!(manager
            .ping(&mut conn, None, Duration::from_millis(500))
            .is_err());
    }
}
