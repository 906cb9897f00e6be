//! Strongly-typed address message.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use crate::netlink::parse::{
    FromNetlink, PResult, cut, parse_attrs, parse_bytes, parse_string_from_bytes,
};
use crate::netlink::types::addr::{IfAddrMsg, ifa};

/// Address message (RTM_NEWADDR / RTM_DELADDR payload).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressMessage {
    /// Fixed-size header.
    pub(crate) header: IfAddrMsg,
    /// Address (IFA_ADDRESS).
    pub(crate) address: Option<IpAddr>,
    /// Local address (IFA_LOCAL).
    pub(crate) local: Option<IpAddr>,
    /// Interface label (IFA_LABEL), IPv4 only.
    pub(crate) label: Option<String>,
}

impl AddressMessage {
    /// Get the fixed header.
    pub fn header(&self) -> &IfAddrMsg {
        &self.header
    }

    /// Get the address family.
    pub fn family(&self) -> u8 {
        self.header.ifa_family
    }

    /// Check if this is an IPv4 address.
    pub fn is_ipv4(&self) -> bool {
        self.header.ifa_family == libc::AF_INET as u8
    }

    /// Get the prefix length.
    pub fn prefix_len(&self) -> u8 {
        self.header.ifa_prefixlen
    }

    /// Get the interface index.
    pub fn ifindex(&self) -> u32 {
        self.header.ifa_index
    }

    /// Get the interface label.
    ///
    /// For IPv4 this is the interface name, or `name:alias` for aliases.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Get the primary address (local or address).
    pub fn primary_address(&self) -> Option<&IpAddr> {
        self.local.as_ref().or(self.address.as_ref())
    }
}

fn ip_addr(data: &[u8], family: u8) -> Option<IpAddr> {
    match family as i32 {
        libc::AF_INET => {
            let octets: [u8; 4] = data.get(..4)?.try_into().ok()?;
            Some(IpAddr::V4(Ipv4Addr::from(octets)))
        }
        libc::AF_INET6 => {
            let octets: [u8; 16] = data.get(..16)?.try_into().ok()?;
            Some(IpAddr::V6(Ipv6Addr::from(octets)))
        }
        _ => None,
    }
}

impl FromNetlink for AddressMessage {
    fn parse(input: &mut &[u8]) -> PResult<Self> {
        let header_bytes = parse_bytes(input, IfAddrMsg::SIZE)?;
        let header = match IfAddrMsg::from_bytes(header_bytes) {
            Ok(header) => header,
            Err(_) => return cut(),
        };

        let mut msg = AddressMessage {
            header,
            ..Default::default()
        };

        for (attr_type, data) in parse_attrs(input)? {
            match attr_type {
                ifa::IFA_ADDRESS => msg.address = ip_addr(data, header.ifa_family),
                ifa::IFA_LOCAL => msg.local = ip_addr(data, header.ifa_family),
                ifa::IFA_LABEL => msg.label = Some(parse_string_from_bytes(data)),
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

    #[test]
    fn test_parse_ipv4_address() {
        let mut builder = MessageBuilder::<IfAddrMsg>::new(NlMsgType::RTM_NEWADDR, 0);
        *builder.payload_mut() = IfAddrMsg::new()
            .with_family(libc::AF_INET as u8)
            .with_prefixlen(24)
            .with_index(3);
        builder.append_attr(ifa::IFA_ADDRESS, &[192, 168, 1, 10]);
        builder.append_attr(ifa::IFA_LOCAL, &[192, 168, 1, 10]);
        builder.append_attr_str(ifa::IFA_LABEL, "eth0");
        let msg = builder.finish().unwrap();

        let addr = AddressMessage::from_bytes(&msg[NLMSG_HDRLEN..]).unwrap();
        assert!(addr.is_ipv4());
        assert_eq!(addr.ifindex(), 3);
        assert_eq!(addr.prefix_len(), 24);
        assert_eq!(addr.label(), Some("eth0"));
        assert_eq!(
            addr.primary_address(),
            Some(&IpAddr::V4(Ipv4Addr::new(192, 168, 1, 10)))
        );
    }

    #[test]
    fn test_ip_addr_rejects_short_payload() {
        assert_eq!(ip_addr(&[10, 0], libc::AF_INET as u8), None);
        assert_eq!(ip_addr(&[0; 16], 0), None);
    }
}
