//! Transfer state machine.
//!
//! Decides, for each inbound RRQ or ACK, which data block to send next
//! and when a transfer is finished. Transfers are seek-based: every block
//! is read from the offset its number implies, so a duplicate ACK simply
//! re-reads and re-sends the same block instead of desynchronizing a
//! forward-only stream.

use crate::error::TftpError;
use crate::packet::{self, BLOCK_SIZE, ErrorCode};
use crate::session::{Session, SessionTable};
use crate::tid::Tid;
use std::io::SeekFrom;
use std::net::SocketAddrV4;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio::net::UdpSocket;
use tokio::sync::Mutex;
use tracing::{error, warn};

/// Drives transfers for all clients: opens files on RRQ, advances block
/// numbers on ACK, and signals end-of-file or errors per RFC 1350.
#[derive(Debug)]
pub struct Transfer {
    socket: Arc<UdpSocket>,
    sessions: Arc<SessionTable>,
    root: PathBuf,
}

impl Transfer {
    /// Creates a state machine sending on `socket` and serving files from
    /// `root`.
    #[must_use]
    pub fn new(socket: Arc<UdpSocket>, sessions: Arc<SessionTable>, root: PathBuf) -> Self {
        Transfer {
            socket,
            sessions,
            root,
        }
    }

    /// Handles a read request: opens the file, registers a session for
    /// the peer's TID, and sends block 1.
    ///
    /// A filename that escapes the served directory is answered with
    /// error code 4; a file that cannot be opened with error code 1.
    /// Neither creates a session.
    pub async fn handle_rrq(&self, peer: SocketAddrV4, filename: &str) -> Result<(), TftpError> {
        if !is_confined(filename) {
            warn!("Invalid file name {:?} from {}", filename, peer);
            return self.send_error(ErrorCode::IllegalOperation, peer).await;
        }

        let file = match File::open(self.root.join(filename)).await {
            Ok(file) => file,
            Err(e) => {
                warn!("File not found for {}: {:?} ({})", peer, filename, e);
                return self.send_error(ErrorCode::FileNotFound, peer).await;
            }
        };

        let tid = Tid::new(peer);
        let session = self.sessions.insert(tid, Session::new(file)).await;
        self.send_block(tid, &session, 1, peer).await
    }

    /// Handles an acknowledgment: sends the block after the acked one.
    ///
    /// An ACK whose TID has no session is logged and dropped without a
    /// response; the transaction may have completed already, or never
    /// existed, and no action is safe to take on the client's behalf.
    pub async fn handle_ack(&self, peer: SocketAddrV4, acked: u16) -> Result<(), TftpError> {
        let tid = Tid::new(peer);
        let Some(session) = self.sessions.lookup(tid).await else {
            warn!("Unknown TID {} (ACK for block {})", tid, acked);
            return Ok(());
        };
        let Some(block) = acked.checked_add(1) else {
            // The 16-bit block field has no successor for 65535.
            warn!("Block number overflow from {}, dropping ACK", peer);
            return Ok(());
        };
        self.send_block(tid, &session, block, peer).await
    }

    /// Reads block `block` from the session's file and sends it to `peer`.
    ///
    /// A full 512-byte read keeps the session alive awaiting the next
    /// ACK. A short read (including an empty one) is the terminal block:
    /// it is sent and the session is removed, closing the file. A read
    /// failure is answered with error code 2 and also ends the session.
    async fn send_block(
        &self,
        tid: Tid,
        session: &Arc<Mutex<Session>>,
        block: u16,
        peer: SocketAddrV4,
    ) -> Result<(), TftpError> {
        let mut payload = vec![0u8; BLOCK_SIZE];
        let offset = u64::from(block - 1) * BLOCK_SIZE as u64;

        let filled = {
            let mut session = session.lock().await;
            match read_at(&mut session.file, offset, &mut payload).await {
                Ok(filled) => {
                    session.next_block = session.next_block.max(block);
                    filled
                }
                Err(e) => {
                    error!("Cannot read block {} for {}: {}", block, tid, e);
                    drop(session);
                    self.sessions.remove(tid).await;
                    return self.send_error(ErrorCode::DiskError, peer).await;
                }
            }
        };
        payload.truncate(filled);

        // Remove before sending so the transfer is already finished from
        // the table's point of view when the client sees the last block.
        if filled < BLOCK_SIZE {
            self.sessions.remove(tid).await;
        }

        self.socket
            .send_to(&packet::data_packet(block, &payload), peer)
            .await?;
        Ok(())
    }

    /// Sends a 5-byte ERROR packet with an empty message.
    pub async fn send_error(&self, code: ErrorCode, peer: SocketAddrV4) -> Result<(), TftpError> {
        self.socket
            .send_to(&packet::error_packet(code), peer)
            .await?;
        Ok(())
    }
}

/// Seeks to `offset` and fills as much of `buf` as the file provides.
///
/// Short reads before EOF are retried so a block is only ever shorter
/// than the buffer at the true end of the file.
async fn read_at(file: &mut File, offset: u64, buf: &mut [u8]) -> std::io::Result<usize> {
    file.seek(SeekFrom::Start(offset)).await?;
    let mut filled = 0;
    while filled < buf.len() {
        let n = file.read(&mut buf[filled..]).await?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}

/// Whether `name` is a bare file name inside the served directory.
///
/// Accepts exactly the strings whose base name equals the literal request,
/// which rejects separators, `..`, `.`, and the empty string.
fn is_confined(name: &str) -> bool {
    Path::new(name).file_name() == Some(std::ffi::OsStr::new(name))
}
