//! Prints every request received on `HTTPFROMTCP_ADDR` (default `127.0.0.1:42069`).
//!
//! ```text
//! RUST_LOG=debug cargo run --example tcplistener
//! curl -X POST -d 'hello' http://127.0.0.1:42069/coffee
//! ```

use httpfromtcp::config::ServerConfig;
use httpfromtcp::http::Response;
use httpfromtcp::server::Server;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let server = Server::bind(ServerConfig::from_env()).await?;
    info!(address = %server.local_addr(), "tcplistener ready");

    tokio::select! {
        result = server.run(|req| async move {
            println!("{req}");
            Response::default()
        }) => result?,
        _ = tokio::signal::ctrl_c() => info!("shutting down"),
    }

    Ok(())
}
