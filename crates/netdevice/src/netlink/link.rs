//! Link creation, deletion and state changes.
//!
//! ```ignore
//! use netdevice::netlink::{Connection, Protocol};
//!
//! let conn = Connection::new(Protocol::Route)?;
//! conn.add_link("vcan0", "vcan").await?;
//! conn.set_link_state("vcan0", true).await?;
//! conn.add_vlan("eth0", 100).await?;
//! conn.del_link("vcan0").await?;
//! ```

use super::builder::MessageBuilder;
use super::connection::Connection;
use super::error::{Error, Result};
use super::message::NlMsgType;
use super::types::link::{IfInfoMsg, iff, ifla, info, vlan};
use crate::util::ifname;

/// Highest usable 802.1Q VLAN ID.
pub const VLAN_ID_MAX: u16 = 4094;

impl Connection {
    /// Create a link of the given kind (e.g. "vcan", "dummy").
    pub async fn add_link(&self, name: &str, kind: &str) -> Result<()> {
        ifname::validate(name)?;
        let builder = self.create_request::<IfInfoMsg>(NlMsgType::RTM_NEWLINK);
        let builder = link_info(builder, name, kind, None)?;
        tracing::debug!(name, kind, "adding link");
        self.request_ack(builder)
            .await
            .map_err(|e| e.with_context(format!("add link {}", name)))
    }

    /// Create a VLAN `parent.id` on top of `parent`.
    ///
    /// Returns the name of the new interface.
    pub async fn add_vlan(&self, parent: &str, id: u16) -> Result<String> {
        if id == 0 || id > VLAN_ID_MAX {
            return Err(Error::InvalidAttribute(format!(
                "VLAN ID {} out of range (1-{})",
                id, VLAN_ID_MAX
            )));
        }
        let name = format!("{}.{}", parent, id);
        ifname::validate(&name)?;
        let parent_index = ifname::require_index(parent)?;

        let builder = self.create_request::<IfInfoMsg>(NlMsgType::RTM_NEWLINK);
        let builder = link_info(builder, &name, "vlan", Some((parent_index, id)))?;
        tracing::debug!(name = %name, parent, id, "adding VLAN");
        self.request_ack(builder)
            .await
            .map_err(|e| e.with_context(format!("add vlan {}", name)))?;
        Ok(name)
    }

    /// Delete a link.
    pub async fn del_link(&self, name: &str) -> Result<()> {
        let index = ifname::require_index(name)?;
        let mut builder = self.request::<IfInfoMsg>(NlMsgType::RTM_DELLINK, 0);
        *builder.payload_mut() = IfInfoMsg::new().with_index(index as i32);
        tracing::debug!(name, index, "deleting link");
        self.request_ack(builder)
            .await
            .map_err(|e| e.with_context(format!("delete link {}", name)))
    }

    /// Set the administrative state of a link.
    pub async fn set_link_state(&self, name: &str, up: bool) -> Result<()> {
        let index = ifname::require_index(name)?;
        let mut builder = self.request::<IfInfoMsg>(NlMsgType::RTM_NEWLINK, 0);
        set_state(builder.payload_mut(), index, up);
        tracing::debug!(name, up, "setting link state");
        self.request_ack(builder)
            .await
            .map_err(|e| e.with_context(format!("set link {} {}", name, if up { "up" } else { "down" })))
    }
}

fn set_state(msg: &mut IfInfoMsg, index: u32, up: bool) {
    *msg = IfInfoMsg::new().with_index(index as i32);
    msg.ifi_flags = if up { iff::UP } else { 0 };
    msg.ifi_change = iff::UP;
}

/// Fill IFLA_IFNAME and IFLA_LINKINFO, plus the VLAN parent and ID.
fn link_info(
    mut builder: MessageBuilder<IfInfoMsg>,
    name: &str,
    kind: &str,
    vlan: Option<(u32, u16)>,
) -> Result<MessageBuilder<IfInfoMsg>> {
    builder.append_attr_str(ifla::IFLA_IFNAME, name);
    if let Some((parent_index, _)) = vlan {
        builder.append_attr_u32(ifla::IFLA_LINK, parent_index);
    }

    let linkinfo = builder.nest_start(ifla::IFLA_LINKINFO);
    builder.append_attr_str(info::IFLA_INFO_KIND, kind);
    if let Some((_, id)) = vlan {
        let data = builder.nest_start(info::IFLA_INFO_DATA);
        builder.append_attr_u16(vlan::IFLA_VLAN_ID, id);
        builder.nest_end(data)?;
    }
    builder.nest_end(linkinfo)?;

    Ok(builder)
}
