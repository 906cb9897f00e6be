//! Wire framing: `nlmsghdr`, `nlmsgerr` and a walker over a receive buffer.

use super::error::{Error, Result};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

pub const NLMSG_ALIGNTO: usize = 4;

/// Round `len` up to the 4-byte netlink boundary.
#[inline]
pub const fn nlmsg_align(len: usize) -> usize {
    (len + NLMSG_ALIGNTO - 1) & !(NLMSG_ALIGNTO - 1)
}

pub const NLMSG_HDRLEN: usize = nlmsg_align(size_of::<NlMsgHdr>());

/// `struct nlmsghdr`.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct NlMsgHdr {
    /// Total length, header included.
    pub nlmsg_len: u32,
    pub nlmsg_type: u16,
    pub nlmsg_flags: u16,
    pub nlmsg_seq: u32,
    /// Port id of the sender; 0 for the kernel.
    pub nlmsg_pid: u32,
}

fn read_prefix<T: FromBytes>(data: &[u8]) -> Result<T> {
    T::read_from_prefix(data)
        .map(|(value, _)| value)
        .map_err(|_| Error::Truncated {
            expected: size_of::<T>(),
            actual: data.len(),
        })
}

impl NlMsgHdr {
    /// A header with no payload yet; seq and pid are left at zero.
    pub fn new(msg_type: u16, flags: u16) -> Self {
        Self {
            nlmsg_len: NLMSG_HDRLEN as u32,
            nlmsg_type: msg_type,
            nlmsg_flags: flags,
            ..Self::default()
        }
    }

    pub fn payload_len(&self) -> usize {
        (self.nlmsg_len as usize).saturating_sub(NLMSG_HDRLEN)
    }

    pub fn is_error(&self) -> bool {
        self.nlmsg_type == NlMsgType::ERROR
    }

    pub fn is_done(&self) -> bool {
        self.nlmsg_type == NlMsgType::DONE
    }

    pub fn as_bytes(&self) -> &[u8] {
        <Self as IntoBytes>::as_bytes(self)
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        read_prefix(data)
    }
}

/// Message types this crate sends or listens for.
pub struct NlMsgType;

impl NlMsgType {
    pub const ERROR: u16 = 2;
    pub const DONE: u16 = 3;

    pub const RTM_NEWLINK: u16 = 16;
    pub const RTM_DELLINK: u16 = 17;
    pub const RTM_GETLINK: u16 = 18;
    pub const RTM_NEWADDR: u16 = 20;
    pub const RTM_DELADDR: u16 = 21;
}

pub const NLM_F_REQUEST: u16 = 0x01;
pub const NLM_F_ACK: u16 = 0x04;
// NEW request modifiers
pub const NLM_F_EXCL: u16 = 0x200;
pub const NLM_F_CREATE: u16 = 0x400;

/// Walks the messages packed into one datagram.
///
/// A header claiming a length outside the buffer ends the walk with an error.
pub struct MessageIter<'a> {
    rest: &'a [u8],
}

impl<'a> MessageIter<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { rest: data }
    }

    fn fail(&mut self, err: Error) -> Option<Result<(NlMsgHdr, &'a [u8])>> {
        self.rest = &[];
        Some(Err(err))
    }
}

impl<'a> Iterator for MessageIter<'a> {
    type Item = Result<(NlMsgHdr, &'a [u8])>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.rest.len() < NLMSG_HDRLEN {
            return None;
        }
        let header = match NlMsgHdr::from_bytes(self.rest) {
            Ok(header) => header,
            Err(e) => return self.fail(e),
        };

        let len = header.nlmsg_len as usize;
        if !(NLMSG_HDRLEN..=self.rest.len()).contains(&len) {
            return self.fail(Error::InvalidMessage(format!(
                "message length {len} outside buffer of {}",
                self.rest.len()
            )));
        }

        let payload = &self.rest[NLMSG_HDRLEN..len];
        let next = nlmsg_align(len).min(self.rest.len());
        self.rest = &self.rest[next..];
        Some(Ok((header, payload)))
    }
}

/// `struct nlmsgerr`: an ACK when `error` is 0, otherwise a negated errno.
#[repr(C)]
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct NlMsgError {
    pub error: i32,
    /// Header of the request being answered.
    pub msg: NlMsgHdr,
}

impl NlMsgError {
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        read_prefix(data)
    }

    pub fn is_ack(&self) -> bool {
        self.error == 0
    }
}
