//! Link and address notifications.
//!
//! ```ignore
//! use netdevice::netlink::events::{EventStream, NetworkEvent};
//! use tokio_stream::StreamExt;
//!
//! let mut stream = EventStream::builder().links(true).addresses(true).build()?;
//! while let Some(event) = stream.try_next().await? {
//!     if let NetworkEvent::NewLink(link) = event {
//!         println!("{} up={}", link.name().unwrap_or("?"), link.is_up());
//!     }
//! }
//! ```

use std::collections::VecDeque;
use std::pin::Pin;
use std::task::{Context, Poll, ready};

use tokio_stream::Stream;

use super::Result;
use super::connection::Connection;
use super::message::{MessageIter, NlMsgType};
use super::messages::{AddressMessage, LinkMessage};
use super::parse::FromNetlink;
use super::socket::Protocol;
use super::socket::rtnetlink_groups::*;
use crate::config::Config;

/// One decoded RTM_{NEW,DEL}{LINK,ADDR} notification.
///
/// NewLink covers both creation and any later change to the link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetworkEvent {
    NewLink(LinkMessage),
    DelLink(LinkMessage),
    NewAddress(AddressMessage),
    DelAddress(AddressMessage),
}

impl NetworkEvent {
    pub fn is_new(&self) -> bool {
        matches!(self, Self::NewLink(_) | Self::NewAddress(_))
    }

    pub fn is_del(&self) -> bool {
        !self.is_new()
    }

    /// "new" or "del", as printed by the monitor.
    pub fn action(&self) -> &'static str {
        if self.is_new() { "new" } else { "del" }
    }

    pub fn ifindex(&self) -> u32 {
        match (self.as_link(), self.as_address()) {
            (Some(link), _) => link.ifindex(),
            (_, Some(addr)) => addr.ifindex(),
            _ => 0,
        }
    }

    pub fn as_link(&self) -> Option<&LinkMessage> {
        match self {
            Self::NewLink(link) | Self::DelLink(link) => Some(link),
            _ => None,
        }
    }

    pub fn as_address(&self) -> Option<&AddressMessage> {
        match self {
            Self::NewAddress(addr) | Self::DelAddress(addr) => Some(addr),
            _ => None,
        }
    }

    /// Decodes every notification in a datagram, in order.
    ///
    /// Unrelated message types and undecodable payloads are dropped; a
    /// broken netlink header fails the whole datagram.
    pub fn parse_datagram(data: &[u8]) -> Result<Vec<NetworkEvent>> {
        let mut events = Vec::new();
        for message in MessageIter::new(data) {
            let (header, payload) = message?;
            if let Some(event) = parse_event(header.nlmsg_type, payload) {
                events.push(event);
            } else {
                tracing::trace!(msg_type = header.nlmsg_type, "ignoring notification");
            }
        }
        Ok(events)
    }
}

/// Decodes a single notification payload of the given type.
pub fn parse_event(msg_type: u16, payload: &[u8]) -> Option<NetworkEvent> {
    let link = || LinkMessage::from_bytes(payload).ok();
    let addr = || AddressMessage::from_bytes(payload).ok();
    match msg_type {
        NlMsgType::RTM_NEWLINK => link().map(NetworkEvent::NewLink),
        NlMsgType::RTM_DELLINK => link().map(NetworkEvent::DelLink),
        NlMsgType::RTM_NEWADDR => addr().map(NetworkEvent::NewAddress),
        NlMsgType::RTM_DELADDR => addr().map(NetworkEvent::DelAddress),
        _ => None,
    }
}

/// Chooses the multicast groups an [`EventStream`] joins.
#[derive(Debug, Default)]
pub struct EventStreamBuilder {
    links: bool,
    ipv4: bool,
    ipv6: bool,
    config: Config,
}

impl EventStreamBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn links(self, links: bool) -> Self {
        Self { links, ..self }
    }

    pub fn addresses_v4(self, ipv4: bool) -> Self {
        Self { ipv4, ..self }
    }

    /// IPv4 and IPv6 addresses together.
    pub fn addresses(self, enabled: bool) -> Self {
        Self {
            ipv4: enabled,
            ipv6: enabled,
            ..self
        }
    }

    /// Socket domain and receive buffer size come from here.
    pub fn config(self, config: Config) -> Self {
        Self { config, ..self }
    }

    pub fn groups(&self) -> u32 {
        [
            (self.links, RTMGRP_LINK),
            (self.ipv4, RTMGRP_IPV4_IFADDR),
            (self.ipv6, RTMGRP_IPV6_IFADDR),
        ]
        .into_iter()
        .filter(|(enabled, _)| *enabled)
        .fold(0, |groups, (_, group)| groups | group)
    }

    pub fn build(self) -> Result<EventStream> {
        let conn = Connection::with_config(Protocol::Route, self.groups(), &self.config)?;
        Ok(EventStream::new(conn))
    }
}

/// Yields notifications one at a time from a subscribed [`Connection`].
pub struct EventStream {
    conn: Connection,
    queued: VecDeque<NetworkEvent>,
}

impl EventStream {
    pub fn builder() -> EventStreamBuilder {
        EventStreamBuilder::new()
    }

    /// `conn` must already be bound to the groups of interest.
    pub fn new(conn: Connection) -> Self {
        Self {
            conn,
            queued: VecDeque::new(),
        }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl Stream for EventStream {
    type Item = Result<NetworkEvent>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        loop {
            if let Some(event) = this.queued.pop_front() {
                return Poll::Ready(Some(Ok(event)));
            }
            // Datagrams with nothing of interest are swallowed here.
            let data = match ready!(this.conn.poll_recv_event(cx)) {
                Ok(data) => data,
                Err(e) => return Poll::Ready(Some(Err(e))),
            };
            match NetworkEvent::parse_datagram(&data) {
                Ok(events) => this.queued.extend(events),
                Err(e) => return Poll::Ready(Some(Err(e))),
            }
        }
    }
}
