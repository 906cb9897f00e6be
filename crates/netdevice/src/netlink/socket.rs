//! Async netlink socket: bind, send to the kernel, receive whole datagrams.

use std::os::unix::io::{AsRawFd, RawFd};
use std::sync::atomic::{AtomicU32, Ordering};
use std::task::{Context, Poll};

use bytes::BytesMut;
use netlink_sys::{Socket, SocketAddr, protocols};
use tokio::io::Interest;
use tokio::io::unix::AsyncFd;

use super::error::{Error, Result};

/// Netlink protocol families.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    /// Routing/device hook (ip link, ip addr, ...)
    Route,
    /// Any other netlink protocol number.
    Other(isize),
}

impl Protocol {
    fn as_isize(self) -> isize {
        match self {
            Protocol::Route => protocols::NETLINK_ROUTE,
            Protocol::Other(id) => id,
        }
    }
}

/// Per-socket request sequence counter.
///
/// Starts at 0 and wraps on overflow.
#[derive(Debug, Default)]
pub struct Sequence(AtomicU32);

impl Sequence {
    /// Counter whose next value is `start`.
    pub fn starting_at(start: u32) -> Self {
        Self(AtomicU32::new(start))
    }

    /// Take the next sequence number.
    pub fn next(&self) -> u32 {
        self.0.fetch_add(1, Ordering::Relaxed)
    }
}

/// One datagram read from a netlink socket.
#[derive(Debug, Clone)]
pub struct Datagram {
    data: Vec<u8>,
    len: usize,
}

impl Datagram {
    /// Wrap received bytes; `len` is the size the kernel reported, which
    /// exceeds `data.len()` when the datagram did not fit the buffer.
    pub fn new(data: Vec<u8>, len: usize) -> Self {
        Self { data, len }
    }

    /// The bytes that fit into the receive buffer.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Full datagram length as reported by the kernel.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if the datagram carried no bytes at all.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Check if part of the datagram was dropped.
    pub fn is_truncated(&self) -> bool {
        self.len > self.data.len()
    }

    /// Take the received bytes, failing if the datagram was truncated.
    pub fn into_complete(self) -> Result<Vec<u8>> {
        if self.is_truncated() {
            return Err(Error::Truncated {
                expected: self.len,
                actual: self.data.len(),
            });
        }
        Ok(self.data)
    }
}

/// Non-blocking netlink socket registered with the tokio reactor.
pub struct NetlinkSocket {
    fd: AsyncFd<Socket>,
    seq: Sequence,
    /// Port id the kernel assigned at bind.
    pid: u32,
    groups: u32,
    protocol: Protocol,
}

impl NetlinkSocket {
    /// Create a new netlink socket for the given protocol.
    pub fn new(protocol: Protocol) -> Result<Self> {
        Self::with_groups(protocol, 0)
    }

    /// Create a socket bound to a multicast group mask (`RTMGRP_*` bits).
    ///
    /// Creation and bind errors are returned here; a socket that exists is
    /// always usable.
    pub fn with_groups(protocol: Protocol, groups: u32) -> Result<Self> {
        let mut socket = Socket::new(protocol.as_isize())?;
        socket.set_non_blocking(true)?;

        let mut addr = SocketAddr::new(0, groups);
        socket.bind(&addr)?;
        socket.get_address(&mut addr)?;
        let pid = addr.port_number();

        let fd = AsyncFd::new(socket)?;
        tracing::debug!(?protocol, pid, groups, "netlink socket bound");

        Ok(Self {
            fd,
            seq: Sequence::default(),
            pid,
            groups,
            protocol,
        })
    }

    /// Get the next sequence number.
    pub fn next_seq(&self) -> u32 {
        self.seq.next()
    }

    pub(crate) fn sequence(&self) -> &Sequence {
        &self.seq
    }

    /// Get the local port ID.
    pub fn pid(&self) -> u32 {
        self.pid
    }

    /// Get the multicast group mask.
    pub fn groups(&self) -> u32 {
        self.groups
    }

    /// Get the protocol.
    pub fn protocol(&self) -> Protocol {
        self.protocol
    }

    /// Send a message to the kernel in a single datagram.
    pub async fn send(&self, msg: &[u8]) -> Result<()> {
        let kernel = SocketAddr::new(0, 0);
        loop {
            let mut guard = self.fd.ready(Interest::WRITABLE).await?;

            match guard.try_io(|inner| inner.get_ref().send_to(msg, &kernel, 0)) {
                Ok(result) => {
                    let sent = result?;
                    if sent != msg.len() {
                        return Err(Error::Io(std::io::Error::new(
                            std::io::ErrorKind::WriteZero,
                            format!("short netlink send: {} of {} bytes", sent, msg.len()),
                        )));
                    }
                    return Ok(());
                }
                Err(_would_block) => continue,
            }
        }
    }

    /// Receive one datagram into a buffer of `capacity` bytes.
    ///
    /// The read uses `MSG_TRUNC`, so an oversized datagram is reported
    /// through [`Datagram::is_truncated`] instead of being cut silently.
    pub async fn recv_datagram(&self, capacity: usize) -> Result<Datagram> {
        let mut buf = BytesMut::with_capacity(capacity);

        loop {
            let mut guard = self.fd.ready(Interest::READABLE).await?;

            match guard.try_io(|inner| inner.get_ref().recv(&mut buf, libc::MSG_TRUNC)) {
                Ok(result) => {
                    let len = result?;
                    return Ok(Datagram::new(buf.to_vec(), len));
                }
                Err(_would_block) => continue,
            }
        }
    }

    /// Poll form of [`recv_datagram`](Self::recv_datagram), for `Stream` impls.
    pub fn poll_recv(&self, cx: &mut Context<'_>, capacity: usize) -> Poll<Result<Datagram>> {
        let mut buf = BytesMut::with_capacity(capacity);

        loop {
            let mut guard = match self.fd.poll_read_ready(cx) {
                Poll::Ready(Ok(guard)) => guard,
                Poll::Ready(Err(e)) => return Poll::Ready(Err(e.into())),
                Poll::Pending => return Poll::Pending,
            };

            match guard.try_io(|inner| inner.get_ref().recv(&mut buf, libc::MSG_TRUNC)) {
                Ok(result) => match result {
                    Ok(len) => return Poll::Ready(Ok(Datagram::new(buf.to_vec(), len))),
                    Err(e) => return Poll::Ready(Err(e.into())),
                },
                Err(_would_block) => continue,
            }
        }
    }
}

impl AsRawFd for NetlinkSocket {
    fn as_raw_fd(&self) -> RawFd {
        self.fd.get_ref().as_raw_fd()
    }
}

/// Multicast groups for NETLINK_ROUTE.
///
/// `RTNLGRP_*` are group numbers (as used with `NETLINK_ADD_MEMBERSHIP`);
/// `RTMGRP_*` are the legacy bind-time bitmask values.
pub mod rtnetlink_groups {
    pub const RTNLGRP_LINK: u32 = 1;
    pub const RTNLGRP_IPV4_IFADDR: u32 = 5;
    pub const RTNLGRP_IPV6_IFADDR: u32 = 9;

    pub const RTMGRP_LINK: u32 = group_mask(RTNLGRP_LINK);
    pub const RTMGRP_IPV4_IFADDR: u32 = group_mask(RTNLGRP_IPV4_IFADDR);
    pub const RTMGRP_IPV6_IFADDR: u32 = group_mask(RTNLGRP_IPV6_IFADDR);

    /// Bind-time mask bit for a group number (0 for groups past 32).
    pub const fn group_mask(group: u32) -> u32 {
        if group == 0 || group > 32 {
            0
        } else {
            1 << (group - 1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::rtnetlink_groups::*;
    use super::*;

    #[test]
    fn test_sequence_is_gapless() {
        let seq = Sequence::default();
        let first = seq.next();
        let second = seq.next();
        assert_eq!(first, 0);
        assert_eq!(second, first + 1);
    }

    #[test]
    fn test_sequence_wraps() {
        let seq = Sequence::starting_at(u32::MAX);
        assert_eq!(seq.next(), u32::MAX);
        assert_eq!(seq.next(), 0);
    }

    #[test]
    fn test_group_masks() {
        assert_eq!(RTMGRP_LINK, 0x1);
        assert_eq!(RTMGRP_IPV4_IFADDR, 0x10);
        assert_eq!(RTMGRP_IPV6_IFADDR, 0x100);
        assert_eq!(group_mask(0), 0);
        assert_eq!(group_mask(33), 0);
    }

    #[test]
    fn test_datagram_truncation() {
        let full = Datagram::new(vec![1, 2, 3], 3);
        assert!(!full.is_truncated());
        assert_eq!(full.into_complete().unwrap(), vec![1, 2, 3]);

        let cut = Datagram::new(vec![1, 2], 9000);
        assert!(cut.is_truncated());
        assert!(matches!(
            cut.into_complete(),
            Err(Error::Truncated {
                expected: 9000,
                actual: 2
            })
        ));
    }
}
