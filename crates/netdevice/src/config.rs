//! Library configuration.
//!
//! A [`Config`] is a plain value: it is passed to the calls that need it and
//! never stored globally.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::netlink::builder::DEFAULT_CAPACITY;

/// Default receive buffer for ACK/error replies.
pub const DEFAULT_ACK_BUFFER_SIZE: usize = 8 * 1024;

/// Default receive buffer for multicast notifications.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 32 * 1024;

/// Socket family used for `ifreq` ioctls.
///
/// Devices that only expose CAN interfaces may lack IP sockets entirely; on
/// those, ioctls have to go through a CAN raw socket instead.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum SocketDomain {
    /// `AF_INET` datagram socket.
    #[default]
    Inet,
    /// `PF_CAN` raw socket.
    Can,
}

impl SocketDomain {
    /// `(domain, type, protocol)` arguments for `socket(2)`.
    pub(crate) fn socket_args(self) -> (libc::c_int, libc::c_int, libc::c_int) {
        match self {
            SocketDomain::Inet => (libc::AF_INET, libc::SOCK_DGRAM, 0),
            SocketDomain::Can => (libc::PF_CAN, libc::SOCK_RAW, libc::CAN_RAW),
        }
    }
}

/// Tunables shared by the transport, the builders it hands out and the
/// ifreq probe.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Config {
    /// Family of the socket used for ifreq ioctls.
    pub socket_domain: SocketDomain,
    /// Buffer size for a single ACK read.
    pub ack_buffer_size: usize,
    /// Buffer size for a single notification read.
    pub event_buffer_size: usize,
    /// Capacity of request builders created by a connection.
    pub message_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            socket_domain: SocketDomain::default(),
            ack_buffer_size: DEFAULT_ACK_BUFFER_SIZE,
            event_buffer_size: DEFAULT_EVENT_BUFFER_SIZE,
            message_capacity: DEFAULT_CAPACITY,
        }
    }
}

impl Config {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the ifreq socket family.
    pub fn socket_domain(mut self, domain: SocketDomain) -> Self {
        self.socket_domain = domain;
        self
    }

    /// Set the ACK receive buffer size.
    pub fn ack_buffer_size(mut self, size: usize) -> Self {
        self.ack_buffer_size = size;
        self
    }

    /// Set the notification receive buffer size.
    pub fn event_buffer_size(mut self, size: usize) -> Self {
        self.event_buffer_size = size;
        self
    }

    /// Set the request builder capacity.
    pub fn message_capacity(mut self, capacity: usize) -> Self {
        self.message_capacity = capacity;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.socket_domain, SocketDomain::Inet);
        assert_eq!(config.ack_buffer_size, 8192);
        assert_eq!(config.event_buffer_size, 32768);
        assert_eq!(config.message_capacity, 128);
    }

    #[test]
    fn test_setters() {
        let config = Config::new()
            .socket_domain(SocketDomain::Can)
            .message_capacity(512)
            .ack_buffer_size(4096)
            .event_buffer_size(65536);
        assert_eq!(config.socket_domain, SocketDomain::Can);
        assert_eq!(config.message_capacity, 512);
        assert_eq!(config.ack_buffer_size, 4096);
        assert_eq!(config.event_buffer_size, 65536);
    }

    #[test]
    fn test_socket_args() {
        assert_eq!(
            SocketDomain::Inet.socket_args(),
            (libc::AF_INET, libc::SOCK_DGRAM, 0)
        );
        assert_eq!(SocketDomain::Can.socket_args().0, libc::PF_CAN);
    }
}
