//! `ifaddrmsg` and the IFA_* attributes read from address notifications.

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// `struct ifaddrmsg`.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct IfAddrMsg {
    /// AF_INET or AF_INET6.
    pub ifa_family: u8,
    pub ifa_prefixlen: u8,
    pub ifa_flags: u8,
    pub ifa_scope: u8,
    /// Index of the owning interface.
    pub ifa_index: u32,
}

super::fixed_header!(IfAddrMsg);

impl IfAddrMsg {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_family(self, ifa_family: u8) -> Self {
        Self { ifa_family, ..self }
    }

    pub fn with_prefixlen(self, ifa_prefixlen: u8) -> Self {
        Self {
            ifa_prefixlen,
            ..self
        }
    }

    pub fn with_index(self, ifa_index: u32) -> Self {
        Self { ifa_index, ..self }
    }
}

pub mod ifa {
    pub const IFA_ADDRESS: u16 = 1;
    pub const IFA_LOCAL: u16 = 2;
    /// Interface name, with a `:suffix` for aliases.
    pub const IFA_LABEL: u16 = 3;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout() {
        assert_eq!(IfAddrMsg::SIZE, 8);

        let msg = IfAddrMsg::new()
            .with_family(libc::AF_INET as u8)
            .with_prefixlen(24)
            .with_index(3);
        let bytes = msg.as_bytes();
        assert_eq!(bytes[0], libc::AF_INET as u8);
        assert_eq!(bytes[1], 24);
        assert_eq!(IfAddrMsg::from_bytes(bytes).unwrap(), msg);
        assert!(IfAddrMsg::from_bytes(&bytes[..5]).is_err());
    }
}
