//! Read-only TFTP server
//!
//! Serves files from a single directory over UDP per RFC 1350. Clients
//! download with plain RRQ/ACK exchanges; writes and option negotiation
//! are not supported.

use tftp_server::TftpServer;
use tracing::{error, info};
use std::env;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    info!("Starting TFTP server");

    // Load configuration from environment variables
    let bind = env::var("TFTP_BIND").unwrap_or_else(|_| "0.0.0.0:69".to_string());
    let root = env::var("TFTP_ROOT").unwrap_or_else(|_| ".".to_string());

    info!("Configuration:");
    info!("  Bind address: {}", bind);
    info!("  Served directory: {}", root);

    let server = TftpServer::bind(bind.as_str(), root).await.map_err(|e| {
        error!("Cannot listen on {}: {}", bind, e);
        e
    })?;

    server.run().await?;

    Ok(())
}
