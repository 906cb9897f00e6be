//! Common test utilities for integration tests.
//!
//! Tests run in the caller's network namespace, so every interface they
//! create gets a unique name and is removed on drop.

use netdevice::Result;
use std::process::Command;
use std::sync::atomic::{AtomicU32, Ordering};

/// Global counter for unique interface names.
static LINK_COUNTER: AtomicU32 = AtomicU32::new(0);

/// Generate an interface name unique to this process and test.
pub fn unique_link_name(prefix: &str) -> String {
    let id = LINK_COUNTER.fetch_add(1, Ordering::SeqCst);
    let pid = std::process::id() % 10_000;
    format!("{}{}x{}", prefix, pid, id)
}

/// An interface name that is deleted (if it exists) when dropped.
pub struct TestLink {
    name: String,
}

impl TestLink {
    /// Reserve a unique name; nothing is created yet.
    pub fn reserve(prefix: &str) -> Self {
        Self {
            name: unique_link_name(prefix),
        }
    }

    /// Get the interface name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Create the interface with iproute2, bypassing the library.
    #[allow(dead_code)]
    pub fn create_dummy(&self) -> Result<()> {
        let status = Command::new("ip")
            .args(["link", "add", &self.name, "type", "dummy"])
            .status()?;
        if !status.success() {
            return Err(netdevice::Error::InvalidMessage(format!(
                "failed to create {}",
                self.name
            )));
        }
        Ok(())
    }
}

impl Drop for TestLink {
    fn drop(&mut self) {
        let _ = Command::new("ip")
            .args(["link", "del", &self.name])
            .stderr(std::process::Stdio::null())
            .status();
    }
}

/// Check if running as root.
pub fn is_root() -> bool {
    unsafe { libc::geteuid() == 0 }
}

/// Skip the test if not running as root.
#[macro_export]
macro_rules! require_root {
    () => {
        if !crate::common::is_root() {
            eprintln!("Skipping test: requires root");
            return Ok(());
        }
    };
}
