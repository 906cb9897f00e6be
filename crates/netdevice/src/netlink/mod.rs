//! Async rtnetlink plumbing: message building, transport and notifications.
//!
//! # Requests
//!
//! ```ignore
//! use netdevice::netlink::{Connection, Protocol};
//!
//! let conn = Connection::new(Protocol::Route)?;
//! conn.add_link("vcan0", "vcan").await?;
//! conn.set_link_state("vcan0", true).await?;
//! ```
//!
//! # Building messages by hand
//!
//! ```ignore
//! use netdevice::netlink::{MessageBuilder, NlMsgType};
//! use netdevice::netlink::types::link::{IfInfoMsg, ifla, info};
//!
//! let mut builder = conn.create_request::<IfInfoMsg>(NlMsgType::RTM_NEWLINK);
//! builder.append_attr_str(ifla::IFLA_IFNAME, "vcan0");
//! let linkinfo = builder.nest_start(ifla::IFLA_LINKINFO);
//! builder.append_attr_str(info::IFLA_INFO_KIND, "vcan");
//! builder.nest_end(linkinfo)?;
//! conn.request_ack(builder).await?;
//! ```
//!
//! # Event Monitoring
//!
//! ```ignore
//! use netdevice::netlink::events::{EventStream, NetworkEvent};
//! use tokio_stream::StreamExt;
//!
//! let mut stream = EventStream::builder().links(true).build()?;
//! while let Some(event) = stream.try_next().await? {
//!     println!("{} {:?}", event.action(), event.as_link().and_then(|l| l.name()));
//! }
//! ```

pub mod attr;
pub mod builder;
pub mod connection;
pub(crate) mod error;
pub mod events;
mod link;
pub mod message;
pub mod messages;
pub mod parse;
mod socket;
pub mod types;

pub use attr::{AttrIter, AttrNode, AttrValue, NlAttr};
pub use builder::{DEFAULT_CAPACITY, MessageBuilder, NestToken};
pub use connection::{Connection, process_ack};
pub use error::{Error, Result};
pub use events::{EventStream, NetworkEvent};
pub use link::VLAN_ID_MAX;
pub use message::{MessageIter, NLMSG_HDRLEN, NlMsgError, NlMsgHdr, NlMsgType};
pub use parse::FromNetlink;
pub use socket::{Datagram, NetlinkSocket, Protocol, Sequence, rtnetlink_groups};
