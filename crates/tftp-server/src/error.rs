//! TFTP server errors

use thiserror::Error;

/// Errors that can occur while serving TFTP transfers.
#[derive(Debug, Error)]
pub enum TftpError {
    /// Datagram that is not a well-formed RRQ or ACK
    #[error("malformed packet: {0}")]
    Malformed(&'static str),

    /// Socket or file I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
