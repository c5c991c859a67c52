//! Main TFTP server implementation.
//!
//! Owns the UDP socket and runs the dispatch loop: receive one datagram,
//! classify it, and hand it to the transfer state machine on its own
//! task so one client's file I/O never delays another's.

use crate::error::TftpError;
use crate::packet::{self, BLOCK_SIZE, ErrorCode, Request};
use crate::session::SessionTable;
use crate::transfer::Transfer;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::{ToSocketAddrs, UdpSocket};
use tracing::{error, info, warn};

/// Read-only TFTP server: one bound UDP socket plus the session table
/// shared with the per-packet handler tasks.
#[derive(Debug, Clone)]
pub struct TftpServer {
    socket: Arc<UdpSocket>,
    sessions: Arc<SessionTable>,
    transfer: Arc<Transfer>,
}

impl TftpServer {
    /// Binds the server socket and prepares an empty session table.
    ///
    /// Files are served from `root`; requested names are confined to that
    /// directory. Fails if the address cannot be bound.
    pub async fn bind(addr: impl ToSocketAddrs, root: impl Into<PathBuf>) -> Result<Self, TftpError> {
        let socket = Arc::new(UdpSocket::bind(addr).await?);
        let sessions = Arc::new(SessionTable::new());
        let transfer = Arc::new(Transfer::new(
            Arc::clone(&socket),
            Arc::clone(&sessions),
            root.into(),
        ));
        Ok(TftpServer {
            socket,
            sessions,
            transfer,
        })
    }

    /// The address the server socket is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, TftpError> {
        Ok(self.socket.local_addr()?)
    }

    /// Number of transfers currently in progress.
    pub async fn session_count(&self) -> usize {
        self.sessions.len().await
    }

    /// Runs the dispatch loop until the process terminates.
    ///
    /// Each valid RRQ or ACK is handled on a spawned task; malformed
    /// datagrams are answered inline with error code 4. Receive errors
    /// are logged and the loop continues.
    pub async fn run(&self) -> Result<(), TftpError> {
        info!("TFTP server listening on {}", self.local_addr()?);

        let mut buf = [0u8; BLOCK_SIZE];
        loop {
            let (len, peer) = match self.socket.recv_from(&mut buf).await {
                Ok(received) => received,
                Err(e) => {
                    error!("Receive failed: {}", e);
                    continue;
                }
            };
            let SocketAddr::V4(peer) = peer else {
                // The socket is IPv4-only; this arm is for completeness.
                warn!("Dropping datagram from non-IPv4 peer {}", peer);
                continue;
            };

            let request = match packet::parse_request(&buf[..len]) {
                Ok(request) => request,
                Err(e) => {
                    warn!("Invalid packet from {}: {}", peer, e);
                    if let Err(e) = self
                        .transfer
                        .send_error(ErrorCode::IllegalOperation, peer)
                        .await
                    {
                        error!("Cannot send error to {}: {}", peer, e);
                    }
                    continue;
                }
            };

            let transfer = Arc::clone(&self.transfer);
            tokio::spawn(async move {
                let result = match request {
                    Request::Rrq { filename } => transfer.handle_rrq(peer, &filename).await,
                    Request::Ack { block } => transfer.handle_ack(peer, block).await,
                };
                if let Err(e) = result {
                    error!("Failed to respond to {}: {}", peer, e);
                }
            });
        }
    }
}
