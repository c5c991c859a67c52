//! Transaction identity derivation.
//!
//! TFTP runs over stateless UDP, so the server correlates packets into
//! transfers by the sender's address alone: the 4 IPv4 octets followed by
//! the 16-bit source port, big-endian. The encoding is injective over
//! (address, port), so distinct clients can never collide.

use std::fmt;
use std::net::{Ipv4Addr, SocketAddrV4};

/// A TFTP transaction identifier: 6 bytes derived from the client's IPv4
/// address and UDP source port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tid([u8; 6]);

impl Tid {
    /// Derives the TID for a peer address. Pure; no side effects.
    #[must_use]
    pub fn new(peer: SocketAddrV4) -> Self {
        let mut bytes = [0u8; 6];
        bytes[..4].copy_from_slice(&peer.ip().octets());
        bytes[4..].copy_from_slice(&peer.port().to_be_bytes());
        Tid(bytes)
    }

    /// The raw 6-byte encoding.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 6] {
        &self.0
    }
}

impl fmt::Display for Tid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ip = Ipv4Addr::new(self.0[0], self.0[1], self.0[2], self.0[3]);
        let port = u16::from_be_bytes([self.0[4], self.0[5]]);
        write!(f, "{ip}:{port}")
    }
}
