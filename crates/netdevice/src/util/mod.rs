//! Interface helpers outside netlink: name/index lookup and ifreq ioctls.

pub mod ifname;
pub mod ifreq;

pub use ifname::{index_to_name, list_interfaces, name_to_index, validate};
pub use ifreq::{IfreqProbe, InterfaceProbe};
