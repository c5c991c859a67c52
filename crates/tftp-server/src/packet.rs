//! TFTP wire format (RFC 1350).
//!
//! Only the packet types this server exchanges are modeled: inbound RRQ
//! and ACK, outbound DATA and ERROR. WRQ is recognized by opcode solely
//! so it can be rejected as an illegal operation.

use crate::error::TftpError;

/// The fixed TFTP block size: every DATA packet carries at most this many
/// payload bytes, and the first shorter payload terminates the transfer.
pub const BLOCK_SIZE: usize = 512;

/// TFTP packet opcodes, 16-bit big-endian on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum Opcode {
    /// Read request (client -> server)
    Rrq = 1,
    /// Write request (rejected; this server is read-only)
    Wrq = 2,
    /// Data block (server -> client)
    Data = 3,
    /// Acknowledgment of a data block (client -> server)
    Ack = 4,
    /// Error notification (server -> client)
    Error = 5,
}

/// TFTP error codes emitted by this server.
///
/// The wire field is 16 bits; only the low byte is significant for the
/// codes we send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ErrorCode {
    /// Requested file could not be opened
    FileNotFound = 1,
    /// Read from an open file failed mid-transfer
    DiskError = 2,
    /// Malformed datagram, unsupported opcode, or path-escaping filename
    IllegalOperation = 4,
}

/// One inbound datagram, classified by the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// Read request for a file in the served directory
    Rrq {
        /// Requested filename, as sent (confinement is checked later)
        filename: String,
    },
    /// Acknowledgment of one data block
    Ack {
        /// Block number being acknowledged
        block: u16,
    },
}

/// Parses one inbound datagram into a [`Request`].
///
/// Accepts only RRQ (opcode 1) and ACK (opcode 4). The RRQ filename is the
/// NUL-terminated byte run starting at offset 2; the mode field that
/// follows it is ignored and not validated. Anything else — a datagram
/// shorter than 4 bytes, another opcode, a missing filename terminator —
/// is malformed and answered with error code 4 by the caller.
pub fn parse_request(datagram: &[u8]) -> Result<Request, TftpError> {
    if datagram.len() < 4 {
        return Err(TftpError::Malformed("datagram shorter than 4 bytes"));
    }
    match u16::from_be_bytes([datagram[0], datagram[1]]) {
        1 => {
            let rest = &datagram[2..];
            let terminator = rest
                .iter()
                .position(|&b| b == 0)
                .ok_or(TftpError::Malformed("filename is not NUL-terminated"))?;
            let filename = std::str::from_utf8(&rest[..terminator])
                .map_err(|_| TftpError::Malformed("filename is not valid netascii"))?;
            Ok(Request::Rrq {
                filename: filename.to_string(),
            })
        }
        4 => Ok(Request::Ack {
            block: u16::from_be_bytes([datagram[2], datagram[3]]),
        }),
        _ => Err(TftpError::Malformed("unsupported opcode")),
    }
}

/// Encodes a DATA packet: `{0x00, 0x03, block (u16 BE), payload}`.
///
/// `payload` must be at most [`BLOCK_SIZE`] bytes; a shorter (or empty)
/// payload signals end of transfer to the client.
#[must_use]
pub fn data_packet(block: u16, payload: &[u8]) -> Vec<u8> {
    debug_assert!(payload.len() <= BLOCK_SIZE);
    let mut packet = Vec::with_capacity(4 + payload.len());
    packet.extend_from_slice(&(Opcode::Data as u16).to_be_bytes());
    packet.extend_from_slice(&block.to_be_bytes());
    packet.extend_from_slice(payload);
    packet
}

/// Encodes an ERROR packet: `{0x00, 0x05, 0x00, code, 0x00}`.
///
/// The message string is left empty (a lone NUL); clients only act on the
/// code.
#[must_use]
pub fn error_packet(code: ErrorCode) -> [u8; 5] {
    [0, Opcode::Error as u8, 0, code as u8, 0]
}
