//! Message builder for constructing netlink messages.
//!
//! A [`MessageBuilder`] owns a fixed capacity. An append that would not fit
//! writes nothing and marks the builder bad for good; [`MessageBuilder::finish`]
//! then refuses to produce bytes, so a partially built request can never
//! reach the kernel.

use zerocopy::{FromZeros, Immutable, IntoBytes};

use super::attr::{AttrValue, NLA_F_NESTED, NLA_HDRLEN, NlAttr, nla_align};
use super::error::{Error, Result};
use super::message::{NLMSG_HDRLEN, NlMsgHdr, nlmsg_align};

/// Default buffer capacity in bytes, header included.
pub const DEFAULT_CAPACITY: usize = 128;

/// Token returned when starting a nested attribute.
///
/// Must be handed back to [`MessageBuilder::nest_end`], innermost nest first.
#[derive(Debug)]
#[must_use = "nested attributes must be closed with nest_end"]
pub struct NestToken {
    /// Offset of the nested attribute header in the attribute area.
    offset: usize,
    /// Number of nests already open when this one started.
    depth: usize,
}

/// Builder for constructing netlink messages.
///
/// `T` is the fixed, type-specific payload that follows the netlink header
/// (e.g. [`IfInfoMsg`](crate::netlink::types::link::IfInfoMsg)).
#[derive(Debug, Clone)]
pub struct MessageBuilder<T> {
    header: NlMsgHdr,
    payload: T,
    attrs: Vec<u8>,
    capacity: usize,
    nests: Vec<usize>,
    good: bool,
}

impl<T> MessageBuilder<T>
where
    T: FromZeros + IntoBytes + Immutable,
{
    /// Create a new message builder with the given type and flags.
    pub fn new(msg_type: u16, flags: u16) -> Self {
        Self::with_capacity(msg_type, flags, DEFAULT_CAPACITY)
    }

    /// Create a builder with an explicit buffer capacity.
    ///
    /// A capacity too small for the header and payload yields a builder that
    /// is bad from the start.
    pub fn with_capacity(msg_type: u16, flags: u16, capacity: usize) -> Self {
        let fixed = Self::fixed_len();
        Self {
            header: NlMsgHdr::new(msg_type, flags),
            payload: T::new_zeroed(),
            attrs: Vec::with_capacity(capacity.saturating_sub(fixed)),
            capacity,
            nests: Vec::new(),
            good: fixed <= capacity,
        }
    }

    fn fixed_len() -> usize {
        NLMSG_HDRLEN + nlmsg_align(std::mem::size_of::<T>())
    }

    /// Get the current message length.
    pub fn len(&self) -> usize {
        Self::fixed_len() + self.attrs.len()
    }

    /// Check if no attributes have been written.
    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }

    /// Total buffer capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// True iff no append has ever overflowed the buffer.
    pub fn is_good(&self) -> bool {
        self.good
    }

    /// Header as it will be sent, with the current length filled in.
    pub fn header(&self) -> NlMsgHdr {
        NlMsgHdr {
            nlmsg_len: self.len() as u32,
            ..self.header
        }
    }

    /// The fixed payload.
    pub fn payload(&self) -> &T {
        &self.payload
    }

    /// Mutable access to the fixed payload (e.g. to set an interface index).
    pub fn payload_mut(&mut self) -> &mut T {
        &mut self.payload
    }

    fn overflow(&mut self, attr_type: u16, needed: usize) {
        tracing::debug!(
            attr_type,
            needed,
            len = self.len(),
            capacity = self.capacity,
            "netlink message overflow, builder marked bad"
        );
        self.good = false;
    }

    /// Append an attribute with a tagged value.
    ///
    /// No-op on a bad builder. If the padded attribute does not fit, nothing
    /// is written and the builder turns bad.
    pub fn append(&mut self, attr_type: u16, value: AttrValue<'_>) {
        if !self.good {
            return;
        }

        let attr_len = NLA_HDRLEN + value.len();
        let padded = nla_align(attr_len);
        if attr_len > u16::MAX as usize || self.len() + padded > self.capacity {
            self.overflow(attr_type, padded);
            return;
        }

        let start = self.attrs.len();
        self.attrs
            .extend_from_slice(NlAttr::new(attr_type, value.len()).as_bytes());
        self.attrs.resize(start + padded, 0);
        value.write_to(&mut self.attrs[start + NLA_HDRLEN..start + attr_len]);
    }

    /// Append an attribute with the given type and data.
    pub fn append_attr(&mut self, attr_type: u16, data: &[u8]) {
        self.append(attr_type, AttrValue::Bytes(data));
    }

    /// Append an empty (flag) attribute with no payload.
    pub fn append_attr_empty(&mut self, attr_type: u16) {
        self.append(attr_type, AttrValue::Bytes(&[]));
    }

    /// Append a null-terminated string attribute.
    pub fn append_attr_str(&mut self, attr_type: u16, value: &str) {
        self.append(attr_type, AttrValue::Str(value));
    }

    /// Append a u8 attribute.
    pub fn append_attr_u8(&mut self, attr_type: u16, value: u8) {
        self.append(attr_type, AttrValue::U8(value));
    }

    /// Append a u16 attribute (native endian).
    pub fn append_attr_u16(&mut self, attr_type: u16, value: u16) {
        self.append(attr_type, AttrValue::U16(value));
    }

    /// Append a u32 attribute (native endian).
    pub fn append_attr_u32(&mut self, attr_type: u16, value: u32) {
        self.append(attr_type, AttrValue::U32(value));
    }

    /// Append a u64 attribute (native endian).
    pub fn append_attr_u64(&mut self, attr_type: u16, value: u64) {
        self.append(attr_type, AttrValue::U64(value));
    }

    /// Start a nested attribute. Returns a token to finalize it.
    pub fn nest_start(&mut self, attr_type: u16) -> NestToken {
        let token = NestToken {
            offset: self.attrs.len(),
            depth: self.nests.len(),
        };
        self.nests.push(token.offset);

        if self.good {
            if self.len() + NLA_HDRLEN > self.capacity {
                self.overflow(attr_type, NLA_HDRLEN);
            } else {
                // Placeholder header, length patched by nest_end
                let attr = NlAttr::new(attr_type | NLA_F_NESTED, 0);
                self.attrs.extend_from_slice(attr.as_bytes());
            }
        }

        token
    }

    /// End a nested attribute started with `nest_start`.
    ///
    /// Only the innermost open nest may be closed; any other token is
    /// rejected and nothing is patched.
    pub fn nest_end(&mut self, token: NestToken) -> Result<()> {
        let innermost = self.nests.last().copied();
        if innermost != Some(token.offset) || token.depth + 1 != self.nests.len() {
            return Err(Error::NestOrder {
                depth: token.depth,
                open: self.nests.len(),
            });
        }
        self.nests.pop();

        if !self.good {
            return Ok(());
        }

        let len = self.attrs.len() - token.offset;
        if len > u16::MAX as usize {
            self.overflow(NLA_F_NESTED, len);
            return Ok(());
        }
        self.attrs[token.offset..token.offset + 2].copy_from_slice(&(len as u16).to_ne_bytes());
        Ok(())
    }

    /// Number of nests currently open.
    pub fn open_nests(&self) -> usize {
        self.nests.len()
    }

    /// Set the sequence number.
    pub fn set_seq(&mut self, seq: u32) {
        self.header.nlmsg_seq = seq;
    }

    /// Set the port ID.
    pub fn set_pid(&mut self, pid: u32) {
        self.header.nlmsg_pid = pid;
    }

    /// OR additional flags into the header.
    pub fn add_flags(&mut self, flags: u16) {
        self.header.nlmsg_flags |= flags;
    }

    /// Finalize and return the message bytes.
    pub fn finish(self) -> Result<Vec<u8>> {
        if !self.good {
            return Err(Error::BufferOverflow {
                capacity: self.capacity,
            });
        }
        if !self.nests.is_empty() {
            return Err(Error::UnclosedNest {
                open: self.nests.len(),
            });
        }

        let header = self.header();
        let mut buf = Vec::with_capacity(self.len());
        buf.extend_from_slice(header.as_bytes());
        buf.extend_from_slice(self.payload.as_bytes());
        buf.resize(Self::fixed_len(), 0);
        buf.extend_from_slice(&self.attrs);
        Ok(buf)
    }
}
