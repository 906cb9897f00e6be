//! Waiting for interfaces to reach a liveness condition.
//!
//! An [`InterfaceTracker`] keeps a `present`/`up`/`has_ipv4` record per
//! watched interface. Records start from a probe snapshot and are then
//! driven by link and IPv4 address notifications until a quantified
//! condition holds.
//!
//! ```ignore
//! use netdevice::util::IfreqProbe;
//! use netdevice::wait::{wait_for_timeout, Quantifier, WaitCondition};
//! use std::time::Duration;
//!
//! let name = wait_for_timeout(
//!     IfreqProbe::default(),
//!     ["can0", "can1"],
//!     WaitCondition::PresentAndUp,
//!     Quantifier::AnyOf,
//!     Duration::from_secs(10),
//! )
//! .await?;
//! println!("{name} is up");
//! ```

use std::fmt;
use std::future::Future;
use std::str::FromStr;
use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::netlink::connection::Connection;
use crate::netlink::error::{Error, Result};
use crate::netlink::events::NetworkEvent;
use crate::netlink::Protocol;
use crate::netlink::rtnetlink_groups::{RTMGRP_IPV4_IFADDR, RTMGRP_LINK};
use crate::util::ifreq::InterfaceProbe;

/// Per-interface condition to wait for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum WaitCondition {
    /// The interface exists.
    Present,
    /// The interface exists and is administratively up.
    PresentAndUp,
    /// The interface exists, is up and has an IPv4 address.
    PresentAndIpv4,
    /// The interface is missing or down.
    DownOrGone,
}

impl WaitCondition {
    /// Evaluate the condition against one interface record.
    pub fn holds(self, state: &WaitState) -> bool {
        match self {
            WaitCondition::Present => state.present,
            WaitCondition::PresentAndUp => state.present && state.up,
            WaitCondition::PresentAndIpv4 => state.present && state.up && state.has_ipv4,
            WaitCondition::DownOrGone => !state.present || !state.up,
        }
    }

    /// Short name used on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            WaitCondition::Present => "present",
            WaitCondition::PresentAndUp => "up",
            WaitCondition::PresentAndIpv4 => "ipv4",
            WaitCondition::DownOrGone => "down",
        }
    }
}

impl fmt::Display for WaitCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WaitCondition {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "present" => Ok(WaitCondition::Present),
            "up" | "present-and-up" => Ok(WaitCondition::PresentAndUp),
            "ipv4" | "present-and-ipv4" => Ok(WaitCondition::PresentAndIpv4),
            "down" | "gone" | "down-or-gone" => Ok(WaitCondition::DownOrGone),
            _ => Err(format!(
                "unknown condition '{}' (expected present, up, ipv4 or down)",
                s
            )),
        }
    }
}

/// How per-interface results combine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Quantifier {
    /// Every watched interface must satisfy the condition.
    #[default]
    AllOf,
    /// At least one watched interface must satisfy the condition.
    AnyOf,
}

impl fmt::Display for Quantifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Quantifier::AllOf => f.write_str("all"),
            Quantifier::AnyOf => f.write_str("any"),
        }
    }
}

impl FromStr for Quantifier {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "all" | "all-of" => Ok(Quantifier::AllOf),
            "any" | "any-of" => Ok(Quantifier::AnyOf),
            _ => Err(format!("unknown quantifier '{}' (expected all or any)", s)),
        }
    }
}

/// Tracked state of one watched interface.
///
/// `has_ipv4` is never true while `present` is false.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WaitState {
    /// Interface name.
    pub name: String,
    /// The interface exists.
    pub present: bool,
    /// The interface is administratively up.
    pub up: bool,
    /// The interface has at least one IPv4 address.
    pub has_ipv4: bool,
}

impl WaitState {
    fn probe<P: InterfaceProbe>(probe: &P, name: String) -> Self {
        let present = probe.index(&name) != 0;
        let up = present && probe.is_up(&name);
        let has_ipv4 = present && probe.has_ipv4(&name);
        Self {
            name,
            present,
            up,
            has_ipv4,
        }
    }
}

/// Source of raw notification datagrams.
///
/// An error from `recv_datagram` is fatal to a wait: it is returned to the
/// caller as-is.
pub trait DatagramSource {
    /// Receive the next datagram.
    fn recv_datagram(&mut self) -> impl Future<Output = Result<Vec<u8>>> + Send;
}

impl DatagramSource for Connection {
    async fn recv_datagram(&mut self) -> Result<Vec<u8>> {
        self.recv_event().await
    }
}

/// State machine over a fixed set of watched interfaces.
#[derive(Debug)]
pub struct InterfaceTracker<P> {
    probe: P,
    states: Vec<WaitState>,
}

impl<P: InterfaceProbe> InterfaceTracker<P> {
    /// Snapshot the given interfaces through `probe`.
    ///
    /// A name listed more than once is tracked once, at its first position.
    pub fn new<I, S>(probe: P, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut states: Vec<WaitState> = Vec::new();
        for name in names {
            let name = name.into();
            if states.iter().any(|s| s.name == name) {
                continue;
            }
            states.push(WaitState::probe(&probe, name));
        }
        Self { probe, states }
    }

    /// Take a fresh snapshot of every watched interface.
    pub fn refresh(&mut self) {
        for state in &mut self.states {
            let name = std::mem::take(&mut state.name);
            *state = WaitState::probe(&self.probe, name);
        }
    }

    /// Get the probe.
    pub fn probe(&self) -> &P {
        &self.probe
    }

    /// Get all tracked states, in watch order.
    pub fn states(&self) -> &[WaitState] {
        &self.states
    }

    /// Get the tracked state of one interface.
    pub fn state(&self, name: &str) -> Option<&WaitState> {
        self.states.iter().find(|s| s.name == name)
    }

    /// Evaluate the quantified condition.
    ///
    /// Returns the first watched name for `AllOf`, or the first satisfying
    /// name for `AnyOf`. An empty watch list never satisfies.
    pub fn check(&self, condition: WaitCondition, quantifier: Quantifier) -> Option<&str> {
        match quantifier {
            Quantifier::AllOf => {
                if self.states.iter().all(|s| condition.holds(s)) {
                    self.states.first().map(|s| s.name.as_str())
                } else {
                    None
                }
            }
            Quantifier::AnyOf => self
                .states
                .iter()
                .find(|s| condition.holds(s))
                .map(|s| s.name.as_str()),
        }
    }

    /// Apply one notification. Returns true if a watched record changed.
    pub fn apply(&mut self, event: &NetworkEvent) -> bool {
        match event {
            NetworkEvent::NewLink(link) | NetworkEvent::DelLink(link) => {
                let Some(state) = link.name().and_then(|n| find_mut(&mut self.states, n)) else {
                    tracing::trace!(ifindex = link.ifindex(), "link event for unwatched interface");
                    return false;
                };

                let before = state.clone();
                state.present = !matches!(event, NetworkEvent::DelLink(_));
                state.up = state.present && link.is_up();
                if !state.present {
                    state.has_ipv4 = false;
                }
                log_transition(&before, state, event.action(), "link");
                *state != before
            }
            NetworkEvent::NewAddress(addr) | NetworkEvent::DelAddress(addr) => {
                if !addr.is_ipv4() {
                    return false;
                }
                let Some(state) = addr.label().and_then(|n| find_mut(&mut self.states, n)) else {
                    tracing::trace!(ifindex = addr.ifindex(), "address event for unwatched interface");
                    return false;
                };

                let before = state.clone();
                if event.is_new() {
                    state.has_ipv4 = state.present;
                } else {
                    // Other addresses may remain; ask instead of assuming.
                    state.has_ipv4 = state.present && self.probe.has_ipv4(&state.name);
                }
                log_transition(&before, state, event.action(), "address");
                *state != before
            }
        }
    }

    /// Wait until the condition holds, reading notifications from `source`.
    ///
    /// Checks the current records first; a satisfied condition returns
    /// without reading. Within a datagram, events are applied in order and
    /// the condition is re-evaluated after each one.
    pub async fn wait<S: DatagramSource>(
        &mut self,
        source: &mut S,
        condition: WaitCondition,
        quantifier: Quantifier,
    ) -> Result<String> {
        if self.states.is_empty() {
            return Err(Error::InvalidName("no interfaces to watch".to_string()));
        }

        if let Some(name) = self.check(condition, quantifier) {
            return Ok(name.to_string());
        }

        loop {
            let data = source.recv_datagram().await.inspect_err(|e| {
                tracing::warn!(error = %e, "notification read failed");
            })?;

            let events = match NetworkEvent::parse_datagram(&data) {
                Ok(events) => events,
                Err(e) => {
                    tracing::debug!(error = %e, len = data.len(), "ignoring malformed datagram");
                    continue;
                }
            };

            for event in &events {
                if self.apply(event)
                    && let Some(name) = self.check(condition, quantifier)
                {
                    tracing::debug!(interface = name, %condition, %quantifier, "wait satisfied");
                    return Ok(name.to_string());
                }
            }
        }
    }

    /// Like [`wait`](Self::wait), but stops with [`Error::Cancelled`] once
    /// `cancel` fires.
    pub async fn wait_with_cancel<S: DatagramSource>(
        &mut self,
        source: &mut S,
        condition: WaitCondition,
        quantifier: Quantifier,
        cancel: &CancellationToken,
    ) -> Result<String> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::debug!("wait cancelled");
                Err(Error::Cancelled)
            }
            result = self.wait(source, condition, quantifier) => result,
        }
    }
}

fn find_mut<'a>(states: &'a mut [WaitState], name: &str) -> Option<&'a mut WaitState> {
    states.iter_mut().find(|s| s.name == name)
}

fn log_transition(before: &WaitState, after: &WaitState, action: &str, kind: &str) {
    if before != after {
        tracing::debug!(
            interface = %after.name,
            action,
            kind,
            present = after.present,
            up = after.up,
            has_ipv4 = after.has_ipv4,
            "interface state changed"
        );
    }
}

/// Wait until `names` satisfy `condition` under `quantifier`.
///
/// If the condition already holds, returns without opening a socket.
/// Otherwise subscribes to link and IPv4 address notifications, takes a
/// second snapshot (changes between the first snapshot and the
/// subscription would otherwise be missed) and follows notifications until
/// the condition holds, the socket fails, or `cancel` fires.
pub async fn wait_for<P, I, S>(
    probe: P,
    names: I,
    condition: WaitCondition,
    quantifier: Quantifier,
    cancel: &CancellationToken,
) -> Result<String>
where
    P: InterfaceProbe,
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut tracker = InterfaceTracker::new(probe, names);
    if tracker.states().is_empty() {
        return Err(Error::InvalidName("no interfaces to watch".to_string()));
    }

    if let Some(name) = tracker.check(condition, quantifier) {
        tracing::debug!(interface = name, %condition, %quantifier, "already satisfied");
        return Ok(name.to_string());
    }

    let mut conn = Connection::subscribed(Protocol::Route, RTMGRP_LINK | RTMGRP_IPV4_IFADDR)?;
    tracker.refresh();
    tracing::debug!(
        watched = tracker.states().len(),
        %condition,
        %quantifier,
        "waiting for interface notifications"
    );

    tracker
        .wait_with_cancel(&mut conn, condition, quantifier, cancel)
        .await
}

/// [`wait_for`] bounded by a deadline; fails with [`Error::Timeout`].
pub async fn wait_for_timeout<P, I, S>(
    probe: P,
    names: I,
    condition: WaitCondition,
    quantifier: Quantifier,
    timeout: Duration,
) -> Result<String>
where
    P: InterfaceProbe,
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let cancel = CancellationToken::new();
    match tokio::time::timeout(
        timeout,
        wait_for(probe, names, condition, quantifier, &cancel),
    )
    .await
    {
        Ok(result) => result,
        Err(_) => Err(Error::Timeout(timeout)),
    }
}
