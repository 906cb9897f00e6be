//! Integration test entry point.
//!
//! These tests create and delete real interfaces and need root:
//!
//! ```bash
//! sudo cargo test -p netdevice --features integration --test integration
//! ```
//!
//! - `link.rs` - Link creation, state changes and deletion
//! - `wait.rs` - Waiting on real notifications

#[macro_use]
#[path = "common/mod.rs"]
mod common;

#[path = "integration/link.rs"]
mod link;
