//! # httpfromtcp
//!
//! An incremental HTTP/1.1 request parser that reads straight from a TCP
//! byte stream. Bytes may arrive in any split; the parser keeps what it
//! cannot use yet and picks up where it left off on the next read.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use httpfromtcp::config::ServerConfig;
//! use httpfromtcp::http::Response;
//! use httpfromtcp::server::Server;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let server = Server::bind(ServerConfig::default()).await?;
//!     server.run(|req| async move {
//!         println!("{req}");
//!         Response::default()
//!     }).await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod http;
pub mod server;

pub use config::ServerConfig;
pub use http::{Headers, Request, RequestError, RequestLine, Response, StatusCode};
pub use server::{Server, ServerError};
