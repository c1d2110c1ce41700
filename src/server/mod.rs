//! Async TCP connection handler using Tokio.
//!
//! Accepts TCP connections and runs one parsing session per connection in its
//! own task. Each session reads a single request, hands it to the handler,
//! writes the response and closes the connection.

use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, error, info, warn};

use crate::config::ServerConfig;
use crate::http::{Request, RequestError, Response, read_request};

/// Errors produced by the server.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to bind to {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
}

/// Accepts connections and parses one request from each.
///
/// # Examples
///
/// ```rust,no_run
/// use httpfromtcp::config::ServerConfig;
/// use httpfromtcp::http::Response;
/// use httpfromtcp::server::Server;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let server = Server::bind(ServerConfig::default()).await?;
///     server.run(|_req| async { Response::default() }).await?;
///     Ok(())
/// }
/// ```
pub struct Server {
    listener: TcpListener,
    local_addr: SocketAddr,
    config: Arc<ServerConfig>,
}

impl Server {
    /// Binds to `config.address`.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Bind`] if the address cannot be bound.
    pub async fn bind(config: ServerConfig) -> Result<Self, ServerError> {
        let listener = TcpListener::bind(&config.address)
            .await
            .map_err(|e| ServerError::Bind {
                addr: config.address.clone(),
                source: e,
            })?;
        let local_addr = listener.local_addr()?;
        Ok(Self {
            listener,
            local_addr,
            config: Arc::new(config),
        })
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Accepts connections until the task is dropped, spawning a session for each.
    ///
    /// Accept failures are logged and do not stop the loop.
    pub async fn run<H, F>(self, handler: H) -> Result<(), ServerError>
    where
        H: Fn(Request) -> F + Send + Sync + 'static,
        F: Future<Output = Response> + Send + 'static,
    {
        let handler = Arc::new(handler);
        info!(address = %self.local_addr, "listening");

        loop {
            let (stream, peer_addr) = match self.listener.accept().await {
                Ok(pair) => pair,
                Err(e) => {
                    error!(error = %e, "failed to accept connection");
                    continue;
                }
            };

            debug!(peer = %peer_addr, "connection accepted");
            let handler = Arc::clone(&handler);
            let config = Arc::clone(&self.config);

            tokio::spawn(async move {
                match handle_connection(stream, &config, handler).await {
                    Ok(()) => debug!(peer = %peer_addr, "connection closed"),
                    Err(e) => {
                        warn!(peer = %peer_addr, error = %e, kind = ?e.kind(), "session failed")
                    }
                }
            });
        }
    }
}

/// Runs one parsing session. Parse errors close the connection without a response.
async fn handle_connection<H, F>(
    mut stream: TcpStream,
    config: &ServerConfig,
    handler: Arc<H>,
) -> Result<(), RequestError>
where
    H: Fn(Request) -> F + Send + Sync + 'static,
    F: Future<Output = Response> + Send + 'static,
{
    let request = match config.read_timeout() {
        Some(limit) => tokio::time::timeout(limit, read_request(&mut stream, &config.reader))
            .await
            .map_err(|_| io::Error::new(io::ErrorKind::TimedOut, "request read timed out"))??,
        None => read_request(&mut stream, &config.reader).await?,
    };

    debug!(
        method = request.method(),
        target = request.target(),
        "dispatching request"
    );

    let response = handler(request).await;
    stream.write_all(&response.into_bytes()).await?;
    stream.shutdown().await?;
    Ok(())
}
