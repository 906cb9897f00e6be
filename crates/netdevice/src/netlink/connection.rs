//! Request/ACK handling on top of [`NetlinkSocket`].

use std::task::{Context, Poll};

use zerocopy::{FromZeros, Immutable, IntoBytes};

use super::builder::MessageBuilder;
use super::error::{Error, Result};
use super::message::{MessageIter, NLM_F_ACK, NLM_F_CREATE, NLM_F_EXCL, NLM_F_REQUEST, NlMsgError};
use super::socket::{Datagram, NetlinkSocket, Protocol, Sequence};
use crate::config::Config;

/// Netlink transport: one socket, its sequence counter, and the buffer
/// sizes used for replies and notifications.
///
/// A connection is meant to be owned by one caller; independent
/// connections can be used from different tasks concurrently.
pub struct Connection {
    socket: NetlinkSocket,
    ack_buffer_size: usize,
    event_buffer_size: usize,
    message_capacity: usize,
}

impl Connection {
    /// Create a new connection for the given protocol.
    pub fn new(protocol: Protocol) -> Result<Self> {
        Self::with_config(protocol, 0, &Config::default())
    }

    /// Create a connection subscribed to a multicast group mask (`RTMGRP_*`).
    pub fn subscribed(protocol: Protocol, groups: u32) -> Result<Self> {
        Self::with_config(protocol, groups, &Config::default())
    }

    /// Create a connection with explicit buffer sizes.
    pub fn with_config(protocol: Protocol, groups: u32, config: &Config) -> Result<Self> {
        Ok(Self {
            socket: NetlinkSocket::with_groups(protocol, groups)?,
            ack_buffer_size: config.ack_buffer_size,
            event_buffer_size: config.event_buffer_size,
            message_capacity: config.message_capacity,
        })
    }

    /// Get the underlying socket.
    pub fn socket(&self) -> &NetlinkSocket {
        &self.socket
    }

    /// Start a request builder sized by this connection's configuration.
    pub fn request<T>(&self, msg_type: u16, flags: u16) -> MessageBuilder<T>
    where
        T: FromZeros + IntoBytes + Immutable,
    {
        MessageBuilder::with_capacity(msg_type, NLM_F_REQUEST | flags, self.message_capacity)
    }

    /// Start a create request (`NLM_F_CREATE | NLM_F_EXCL`).
    pub fn create_request<T>(&self, msg_type: u16) -> MessageBuilder<T>
    where
        T: FromZeros + IntoBytes + Immutable,
    {
        self.request(msg_type, NLM_F_CREATE | NLM_F_EXCL)
    }

    /// Send a built message to the kernel, asking for an ACK.
    ///
    /// Stamps the next sequence number and returns it. A builder that
    /// overflowed or still has open nests is rejected before any sequence
    /// number is consumed.
    pub async fn send<T>(&self, builder: MessageBuilder<T>) -> Result<u32>
    where
        T: FromZeros + IntoBytes + Immutable,
    {
        let (seq, msg) = encode_request(builder, self.socket.sequence())?;
        self.socket.send(&msg).await?;
        tracing::trace!(seq, len = msg.len(), "netlink request sent");

        Ok(seq)
    }

    /// Wait for the kernel's ACK or error reply.
    ///
    /// Blocks on exactly one read. Unrelated messages in that read are
    /// skipped; see [`process_ack`].
    pub async fn receive_ack(&self) -> Result<()> {
        let datagram = self.socket.recv_datagram(self.ack_buffer_size).await?;
        process_ack(&datagram)
    }

    /// Send a request and wait for its ACK.
    pub async fn request_ack<T>(&self, builder: MessageBuilder<T>) -> Result<()>
    where
        T: FromZeros + IntoBytes + Immutable,
    {
        self.send(builder).await?;
        self.receive_ack().await
    }

    /// Receive the next raw notification datagram (for monitoring).
    ///
    /// A datagram larger than the event buffer is an error.
    pub async fn recv_event(&self) -> Result<Vec<u8>> {
        self.socket
            .recv_datagram(self.event_buffer_size)
            .await?
            .into_complete()
    }

    /// Poll for incoming event data.
    ///
    /// This is the poll-based version of `recv_event()` for use with `Stream` implementations.
    pub(crate) fn poll_recv_event(&self, cx: &mut Context<'_>) -> Poll<Result<Vec<u8>>> {
        self.socket
            .poll_recv(cx, self.event_buffer_size)
            .map(|res| res.and_then(Datagram::into_complete))
    }
}

/// Serialize `builder` as an ACK-requesting message addressed to the kernel.
fn encode_request<T>(mut builder: MessageBuilder<T>, seq: &Sequence) -> Result<(u32, Vec<u8>)>
where
    T: FromZeros + IntoBytes + Immutable,
{
    if !builder.is_good() {
        return Err(Error::BufferOverflow {
            capacity: builder.capacity(),
        });
    }
    if builder.open_nests() > 0 {
        return Err(Error::UnclosedNest {
            open: builder.open_nests(),
        });
    }

    let seq = seq.next();
    builder.set_seq(seq);
    builder.set_pid(0);
    builder.add_flags(NLM_F_ACK);
    Ok((seq, builder.finish()?))
}

/// Interpret one read as an ACK/error reply.
///
/// A truncated datagram fails outright. Otherwise messages are scanned in
/// order: anything that is not `NLMSG_ERROR` is skipped, and the first
/// `NLMSG_ERROR` decides the outcome (code 0 is success). A read with no
/// such message yields [`Error::NoAck`].
pub fn process_ack(datagram: &Datagram) -> Result<()> {
    if datagram.is_truncated() {
        tracing::warn!(
            len = datagram.len(),
            buffer = datagram.data().len(),
            "netlink reply truncated"
        );
        return Err(Error::Truncated {
            expected: datagram.len(),
            actual: datagram.data().len(),
        });
    }

    for result in MessageIter::new(datagram.data()) {
        let (header, payload) = result?;

        if !header.is_error() {
            tracing::debug!(
                msg_type = header.nlmsg_type,
                seq = header.nlmsg_seq,
                "skipping non-ACK message"
            );
            continue;
        }

        let err = NlMsgError::from_bytes(payload)?;
        if err.is_ack() {
            tracing::trace!(seq = err.msg.nlmsg_seq, "netlink ACK");
            return Ok(());
        }
        tracing::debug!(
            seq = err.msg.nlmsg_seq,
            errno = -err.error,
            "netlink request rejected"
        );
        return Err(Error::from_errno(err.error));
    }

    Err(Error::NoAck)
}
