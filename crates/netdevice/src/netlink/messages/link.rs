//! Strongly-typed link message.

use crate::netlink::parse::{
    FromNetlink, PResult, cut, parse_attrs, parse_bytes, parse_string_from_bytes,
};
use crate::netlink::types::link::{IfInfoMsg, ifla, info};

/// Link message (RTM_NEWLINK / RTM_DELLINK payload).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkMessage {
    /// Fixed-size header.
    pub(crate) header: IfInfoMsg,
    /// Interface name (IFLA_IFNAME).
    pub(crate) name: Option<String>,
    /// MTU (IFLA_MTU).
    pub(crate) mtu: Option<u32>,
    /// Link kind from IFLA_LINKINFO/IFLA_INFO_KIND (e.g. "vlan", "vcan").
    pub(crate) kind: Option<String>,
}

impl LinkMessage {
    /// Get the fixed header.
    pub fn header(&self) -> &IfInfoMsg {
        &self.header
    }

    /// Get the interface index.
    pub fn ifindex(&self) -> u32 {
        self.header.ifi_index as u32
    }

    /// Get the interface name.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Get the MTU.
    pub fn mtu(&self) -> Option<u32> {
        self.mtu
    }

    /// Get the link kind.
    pub fn kind(&self) -> Option<&str> {
        self.kind.as_deref()
    }

    /// Check the administrative up flag (IFF_UP).
    pub fn is_up(&self) -> bool {
        self.header.is_up()
    }

    /// Get the raw IFF_* flags.
    pub fn flags(&self) -> u32 {
        self.header.ifi_flags
    }
}

impl FromNetlink for LinkMessage {
    fn parse(input: &mut &[u8]) -> PResult<Self> {
        let header_bytes = parse_bytes(input, IfInfoMsg::SIZE)?;
        let header = match IfInfoMsg::from_bytes(header_bytes) {
            Ok(header) => header,
            Err(_) => return cut(),
        };

        let mut msg = LinkMessage {
            header,
            ..Default::default()
        };

        for (attr_type, data) in parse_attrs(input)? {
            match attr_type {
                ifla::IFLA_IFNAME => msg.name = Some(parse_string_from_bytes(data)),
                ifla::IFLA_MTU if data.len() >= 4 => {
                    msg.mtu = Some(u32::from_ne_bytes([data[0], data[1], data[2], data[3]]));
                }
                ifla::IFLA_LINKINFO => {
                    let mut nested = data;
                    for (info_type, info_data) in parse_attrs(&mut nested)? {
                        if info_type == info::IFLA_INFO_KIND {
                            msg.kind = Some(parse_string_from_bytes(info_data));
                        }
                    }
                }
                _ => {}
            }
        }

        Ok(msg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::netlink::builder::MessageBuilder;
    use crate::netlink::message::{NLMSG_HDRLEN, NlMsgType};
    use crate::netlink::types::link::iff;

    #[test]
    fn test_parse_new_link() {
        let mut builder =
            MessageBuilder::<IfInfoMsg>::with_capacity(NlMsgType::RTM_NEWLINK, 0, 256);
        builder.payload_mut().ifi_index = 5;
        builder.payload_mut().ifi_flags = iff::UP | iff::RUNNING;
        builder.append_attr_str(ifla::IFLA_IFNAME, "can0");
        builder.append_attr_u32(ifla::IFLA_MTU, 16);
        let nest = builder.nest_start(ifla::IFLA_LINKINFO);
        builder.append_attr_str(info::IFLA_INFO_KIND, "vcan");
        builder.nest_end(nest).unwrap();
        let msg = builder.finish().unwrap();

        let link = LinkMessage::from_bytes(&msg[NLMSG_HDRLEN..]).unwrap();
        assert_eq!(link.ifindex(), 5);
        assert_eq!(link.name(), Some("can0"));
        assert_eq!(link.mtu(), Some(16));
        assert_eq!(link.kind(), Some("vcan"));
        assert!(link.is_up());
    }

    #[test]
    fn test_parse_without_name() {
        let header = IfInfoMsg::new().with_index(2);
        let link = LinkMessage::from_bytes(zerocopy::IntoBytes::as_bytes(&header)).unwrap();
        assert_eq!(link.name(), None);
        assert!(!link.is_up());
    }

    #[test]
    fn test_short_header_fails() {
        assert!(LinkMessage::from_bytes(&[0; 8]).is_err());
    }
}
