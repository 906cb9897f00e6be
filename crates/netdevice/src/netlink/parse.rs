//! Parser combinators and traits for strongly-typed netlink message parsing.
//!
//! This module provides:
//! - `FromNetlink` trait for parsing netlink message payloads
//! - Core parser combinators using winnow

use winnow::error::{ContextError, ErrMode};
use winnow::prelude::*;
use winnow::token::take;

use super::attr::{NLA_HDRLEN, NLA_TYPE_MASK, nla_align};
use super::error::{Error, Result};

/// Result type for winnow parsers.
pub type PResult<T> = core::result::Result<T, ErrMode<ContextError>>;

/// Trait for types that can be parsed from netlink wire format.
pub trait FromNetlink: Sized {
    /// Parse from a mutable byte slice reference.
    /// The slice is advanced past the consumed bytes.
    fn parse(input: &mut &[u8]) -> PResult<Self>;

    /// Parse from a complete message payload.
    fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut input = data;
        Self::parse(&mut input).map_err(|e| Error::Parse(format!("{:?}", e)))
    }
}

/// Hard parse failure (no backtracking).
pub(crate) fn cut<T>() -> PResult<T> {
    Err(ErrMode::Cut(ContextError::new()))
}

/// Parse a u16 in native endian.
pub fn parse_u16_ne(input: &mut &[u8]) -> PResult<u16> {
    let bytes = parse_bytes(input, 2)?;
    Ok(u16::from_ne_bytes([bytes[0], bytes[1]]))
}

/// Take exactly `len` bytes.
pub fn parse_bytes<'a>(input: &mut &'a [u8], len: usize) -> PResult<&'a [u8]> {
    if input.len() < len {
        return cut();
    }
    take(len).parse_next(input)
}

/// Parse a netlink attribute header and return (type, payload).
///
/// The type has its flag bits masked off; trailing padding is consumed.
pub fn parse_attr<'a>(input: &mut &'a [u8]) -> PResult<(u16, &'a [u8])> {
    let len = parse_u16_ne(input)? as usize;
    let attr_type = parse_u16_ne(input)?;

    if len < NLA_HDRLEN {
        return cut();
    }

    let payload = parse_bytes(input, len - NLA_HDRLEN)?;

    // Padding may be missing on the last attribute of a message
    let padding = (nla_align(len) - len).min(input.len());
    parse_bytes(input, padding)?;

    Ok((attr_type & NLA_TYPE_MASK, payload))
}

/// Parse all attributes from remaining input.
///
/// Stops at the first malformed attribute; what was parsed so far is kept.
pub fn parse_attrs<'a>(input: &mut &'a [u8]) -> PResult<Vec<(u16, &'a [u8])>> {
    let mut attrs = Vec::new();
    while input.len() >= NLA_HDRLEN {
        match parse_attr(input) {
            Ok(attr) => attrs.push(attr),
            Err(_) => break,
        }
    }
    Ok(attrs)
}

/// Parse a string from bytes (null-terminated or not).
pub fn parse_string_from_bytes(data: &[u8]) -> String {
    let end = data.iter().position(|&b| b == 0).unwrap_or(data.len());
    String::from_utf8_lossy(&data[..end]).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::netlink::attr::{NLA_F_NESTED, NlAttr};

    #[test]
    fn test_parse_attr_consumes_padding() {
        let mut data = Vec::new();
        data.extend_from_slice(NlAttr::new(3 | NLA_F_NESTED, 1).as_bytes());
        data.extend_from_slice(&[7, 0, 0, 0]);
        data.extend_from_slice(NlAttr::new(4, 0).as_bytes());

        let mut input = data.as_slice();
        let (kind, payload) = parse_attr(&mut input).unwrap();
        assert_eq!(kind, 3);
        assert_eq!(payload, &[7]);
        assert_eq!(input.len(), 4);
    }

    #[test]
    fn test_parse_attrs_stops_on_garbage() {
        let mut data = Vec::new();
        data.extend_from_slice(NlAttr::new(1, 0).as_bytes());
        data.extend_from_slice(&[0xff, 0x00, 0x01, 0x00]);

        let mut input = data.as_slice();
        let attrs = parse_attrs(&mut input).unwrap();
        assert_eq!(attrs, vec![(1, &[][..])]);
    }

    #[test]
    fn test_string_from_bytes() {
        assert_eq!(parse_string_from_bytes(b"can0\0\0\0"), "can0");
        assert_eq!(parse_string_from_bytes(b"eth1"), "eth1");
    }
}
