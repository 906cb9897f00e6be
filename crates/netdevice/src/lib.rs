//! Async rtnetlink client for bringing up and watching Linux network
//! interfaces.
//!
//! The crate has three layers:
//!
//! - [`netlink::MessageBuilder`] assembles one request inside a fixed
//!   capacity and refuses to emit a message that overflowed.
//! - [`netlink::Connection`] sends requests with increasing sequence numbers
//!   and interprets the kernel's ACK/error reply.
//! - [`wait`] follows link and address notifications until a set of
//!   interfaces is present, up, addressed or gone.
//!
//! # Example
//!
//! ```ignore
//! use netdevice::netlink::{Connection, Protocol};
//! use netdevice::util::IfreqProbe;
//! use netdevice::wait::{wait_for_timeout, Quantifier, WaitCondition};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> netdevice::Result<()> {
//!     let conn = Connection::new(Protocol::Route)?;
//!     conn.add_link("vcan0", "vcan").await?;
//!     conn.set_link_state("vcan0", true).await?;
//!
//!     wait_for_timeout(
//!         IfreqProbe::default(),
//!         ["vcan0"],
//!         WaitCondition::PresentAndUp,
//!         Quantifier::AllOf,
//!         Duration::from_secs(5),
//!     )
//!     .await?;
//!     Ok(())
//! }
//! ```
//!
//! # Features
//!
//! - `serde` - Serialize/Deserialize on [`Config`] and the wait state types
//! - `integration` - root-only integration tests

pub mod config;
pub mod netlink;
pub mod util;
pub mod wait;

pub use config::{Config, SocketDomain};
pub use netlink::{Connection, Error, Protocol, Result};
pub use wait::{InterfaceTracker, Quantifier, WaitCondition, WaitState, wait_for, wait_for_timeout};
