//! Read-only TFTP server (RFC 1350).
//!
//! Listens on a single UDP port, accepts read requests (RRQ), and streams
//! the requested file back in 512-byte blocks driven by client
//! acknowledgments (ACK). Write requests, option negotiation, and
//! transports other than UDP/IPv4 are out of scope.
//!
//! Clients are correlated across stateless datagrams by a 6-byte
//! transaction id derived from their source address and port; each id
//! maps to one in-progress session holding the open file and the block
//! position. A DATA block shorter than 512 bytes ends the transfer.

pub mod error;
pub mod packet;
pub mod server;
pub mod session;
pub mod tid;
pub mod transfer;


pub use error::*;
pub use server::*;
