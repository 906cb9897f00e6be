//! `ifinfomsg`, IFF_* flags and the IFLA_* attributes this crate reads or writes.

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// `struct ifinfomsg`.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct IfInfoMsg {
    pub ifi_family: u8,
    pub __ifi_pad: u8,
    /// ARPHRD_* device type.
    pub ifi_type: u16,
    pub ifi_index: i32,
    pub ifi_flags: u32,
    /// Bits of `ifi_flags` the kernel should apply; zero leaves flags untouched.
    pub ifi_change: u32,
}

super::fixed_header!(IfInfoMsg);

impl IfInfoMsg {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_index(self, ifi_index: i32) -> Self {
        Self { ifi_index, ..self }
    }

    /// Administrative state, not carrier.
    pub fn is_up(&self) -> bool {
        self.ifi_flags & iff::UP != 0
    }
}

pub mod iff {
    pub const UP: u32 = libc::IFF_UP as u32;
    pub const RUNNING: u32 = libc::IFF_RUNNING as u32;
}

pub mod ifla {
    pub const IFLA_IFNAME: u16 = 3;
    pub const IFLA_MTU: u16 = 4;
    /// Parent index for stacked devices such as VLANs.
    pub const IFLA_LINK: u16 = 5;
    pub const IFLA_LINKINFO: u16 = 18;
}

/// Children of IFLA_LINKINFO.
pub mod info {
    pub const IFLA_INFO_KIND: u16 = 1;
    pub const IFLA_INFO_DATA: u16 = 2;
}

/// Children of IFLA_INFO_DATA for kind "vlan".
pub mod vlan {
    pub const IFLA_VLAN_ID: u16 = 1;
}
