//! `nlattr` framing: the 4-byte TLV header, encodable values and decoders.

use super::error::{Error, Result};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

pub const NLA_ALIGNTO: usize = 4;
pub const NLA_HDRLEN: usize = size_of::<NlAttr>();

pub const NLA_F_NESTED: u16 = 1 << 15;
pub const NLA_F_NET_BYTEORDER: u16 = 1 << 14;
pub const NLA_TYPE_MASK: u16 = !(NLA_F_NESTED | NLA_F_NET_BYTEORDER);

/// Round `len` up to the attribute boundary.
#[inline]
pub const fn nla_align(len: usize) -> usize {
    len.div_ceil(NLA_ALIGNTO) * NLA_ALIGNTO
}

/// `struct nlattr` (same layout as `struct rtattr`).
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct NlAttr {
    /// Header plus payload, padding excluded.
    pub nla_len: u16,
    /// Type id, possibly carrying NLA_F_* bits.
    pub nla_type: u16,
}

impl NlAttr {
    /// Header for `data_len` payload bytes. Callers keep the total within `u16`.
    pub fn new(attr_type: u16, data_len: usize) -> Self {
        Self {
            nla_len: (NLA_HDRLEN + data_len) as u16,
            nla_type: attr_type,
        }
    }

    /// Type id with NLA_F_* bits stripped.
    pub fn kind(&self) -> u16 {
        self.nla_type & NLA_TYPE_MASK
    }

    pub fn is_nested(&self) -> bool {
        self.nla_type & NLA_F_NESTED != 0
    }

    pub fn payload_len(&self) -> usize {
        usize::from(self.nla_len).saturating_sub(NLA_HDRLEN)
    }

    pub fn as_bytes(&self) -> &[u8] {
        <Self as IntoBytes>::as_bytes(self)
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        match Self::read_from_prefix(data) {
            Ok((attr, _)) => Ok(attr),
            Err(_) => Err(Error::Truncated {
                expected: NLA_HDRLEN,
                actual: data.len(),
            }),
        }
    }
}

/// Attribute value, tagged by encoding.
///
/// Integers are written in native byte order, strings with their
/// terminating NUL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrValue<'a> {
    /// Raw bytes, written as-is.
    Bytes(&'a [u8]),
    /// NUL-terminated string.
    Str(&'a str),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    I32(i32),
}

impl AttrValue<'_> {
    /// Encoded payload length, without header or padding.
    pub fn len(&self) -> usize {
        match self {
            AttrValue::Bytes(b) => b.len(),
            AttrValue::Str(s) => s.len() + 1,
            AttrValue::U8(_) => 1,
            AttrValue::U16(_) => 2,
            AttrValue::U32(_) | AttrValue::I32(_) => 4,
            AttrValue::U64(_) => 8,
        }
    }

    /// A zero-length payload, as used by flag attributes.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Write the payload into `out`, which must be exactly `len()` bytes.
    pub(crate) fn write_to(&self, out: &mut [u8]) {
        match self {
            AttrValue::Bytes(b) => out.copy_from_slice(b),
            AttrValue::Str(s) => {
                out[..s.len()].copy_from_slice(s.as_bytes());
                out[s.len()] = 0;
            }
            AttrValue::U8(v) => out[0] = *v,
            AttrValue::U16(v) => out.copy_from_slice(&v.to_ne_bytes()),
            AttrValue::U32(v) => out.copy_from_slice(&v.to_ne_bytes()),
            AttrValue::U64(v) => out.copy_from_slice(&v.to_ne_bytes()),
            AttrValue::I32(v) => out.copy_from_slice(&v.to_ne_bytes()),
        }
    }
}

/// Yields `(type, payload)` pairs from a run of attributes.
///
/// Stops silently at the first header whose length does not fit.
pub struct AttrIter<'a> {
    rest: &'a [u8],
}

impl<'a> AttrIter<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { rest: data }
    }

    /// True once nothing that could hold another header remains.
    pub fn is_empty(&self) -> bool {
        self.rest.len() < NLA_HDRLEN
    }

    fn next_raw(&mut self) -> Option<(NlAttr, &'a [u8])> {
        let attr = NlAttr::from_bytes(self.rest).ok()?;
        let len = usize::from(attr.nla_len);
        if !(NLA_HDRLEN..=self.rest.len()).contains(&len) {
            return None;
        }
        let payload = &self.rest[NLA_HDRLEN..len];
        self.rest = &self.rest[nla_align(len).min(self.rest.len())..];
        Some((attr, payload))
    }
}

impl<'a> Iterator for AttrIter<'a> {
    type Item = (u16, &'a [u8]);

    fn next(&mut self) -> Option<Self::Item> {
        self.next_raw().map(|(attr, payload)| (attr.kind(), payload))
    }
}

/// A decoded attribute tree.
///
/// Attributes carrying `NLA_F_NESTED` are decoded recursively; everything
/// else is kept as raw payload bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrNode {
    Value {
        kind: u16,
        /// Payload without padding.
        data: Vec<u8>,
    },
    Nested {
        kind: u16,
        /// Children in wire order.
        children: Vec<AttrNode>,
    },
}

impl AttrNode {
    /// Decode every attribute in `data`.
    pub fn parse_all(data: &[u8]) -> Result<Vec<AttrNode>> {
        let mut iter = AttrIter::new(data);
        let mut nodes = Vec::new();
        while let Some((attr, payload)) = iter.next_raw() {
            let kind = attr.kind();
            nodes.push(if attr.is_nested() {
                AttrNode::Nested {
                    kind,
                    children: Self::parse_all(payload)?,
                }
            } else {
                AttrNode::Value {
                    kind,
                    data: payload.to_vec(),
                }
            });
        }
        if !iter.is_empty() {
            return Err(Error::InvalidAttribute(format!(
                "{} trailing bytes after last attribute",
                iter.rest.len()
            )));
        }
        Ok(nodes)
    }

    /// Attribute type, flags masked off.
    pub fn kind(&self) -> u16 {
        match self {
            AttrNode::Value { kind, .. } | AttrNode::Nested { kind, .. } => *kind,
        }
    }
}

/// Typed reads of attribute payloads. Integers are native-endian.
pub mod get {
    use super::{Error, Result};

    fn array<const N: usize>(data: &[u8], what: &str) -> Result<[u8; N]> {
        data.get(..N)
            .and_then(|bytes| bytes.try_into().ok())
            .ok_or_else(|| Error::InvalidAttribute(format!("truncated {what} attribute")))
    }

    pub fn u8(data: &[u8]) -> Result<u8> {
        array::<1>(data, "u8").map(|[b]| b)
    }

    pub fn u16_ne(data: &[u8]) -> Result<u16> {
        array(data, "u16").map(u16::from_ne_bytes)
    }

    pub fn u32_ne(data: &[u8]) -> Result<u32> {
        array(data, "u32").map(u32::from_ne_bytes)
    }

    pub fn i32_ne(data: &[u8]) -> Result<i32> {
        array(data, "i32").map(i32::from_ne_bytes)
    }

    /// Text up to the first NUL, or the whole payload if there is none.
    pub fn string(data: &[u8]) -> Result<&str> {
        let text = data.split(|&b| b == 0).next().unwrap_or_default();
        std::str::from_utf8(text)
            .map_err(|e| Error::InvalidAttribute(format!("invalid UTF-8: {e}")))
    }
}
