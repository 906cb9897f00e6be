//! Crate-wide error type.

use std::io;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Negative `nlmsgerr` code, stored as a positive errno.
    #[error("kernel error: {message} (errno {errno})")]
    Kernel { errno: i32, message: String },

    #[error("{operation}: {message} (errno {errno})")]
    KernelWithContext {
        operation: String,
        errno: i32,
        message: String,
    },

    #[error("message truncated: expected {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },

    /// An append did not fit the builder's buffer; the message is unusable.
    #[error("message buffer overflow (capacity {capacity} bytes)")]
    BufferOverflow { capacity: usize },

    /// `depth` is the token's position in the nest stack, `open` the stack height.
    #[error("nested attribute at depth {depth} closed out of order ({open} open)")]
    NestOrder { depth: usize, open: usize },

    #[error("{open} nested attribute(s) left open")]
    UnclosedNest { open: usize },

    /// A reply datagram held no NLMSG_ERROR.
    #[error("no ACK received")]
    NoAck,

    #[error("invalid message: {0}")]
    InvalidMessage(String),

    #[error("invalid attribute: {0}")]
    InvalidAttribute(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("interface not found: {name}")]
    InterfaceNotFound { name: String },

    /// Rejected locally, before any syscall.
    #[error("invalid interface name: {0}")]
    InvalidName(String),

    #[error("wait cancelled")]
    Cancelled,

    #[error("timed out after {0:?}")]
    Timeout(std::time::Duration),
}

fn describe(errno: i32) -> String {
    io::Error::from_raw_os_error(errno).to_string()
}

impl Error {
    /// Builds a kernel error from the negative code found in `nlmsgerr`.
    pub fn from_errno(code: i32) -> Self {
        let errno = -code;
        Self::Kernel {
            errno,
            message: describe(errno),
        }
    }

    pub fn from_errno_with_context(code: i32, operation: impl Into<String>) -> Self {
        Self::from_errno(code).with_context(operation)
    }

    /// Names the failed operation on kernel errors; anything else passes through.
    pub fn with_context(self, operation: impl Into<String>) -> Self {
        let Self::Kernel { errno, message } = self else {
            return self;
        };
        Self::KernelWithContext {
            operation: operation.into(),
            errno,
            message,
        }
    }

    /// Positive errno of a kernel error.
    pub fn errno(&self) -> Option<i32> {
        match self {
            Self::Kernel { errno, .. } | Self::KernelWithContext { errno, .. } => Some(*errno),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::InterfaceNotFound { .. })
            || matches!(self.errno(), Some(libc::ENOENT | libc::ENODEV))
    }

    pub fn is_permission_denied(&self) -> bool {
        matches!(self.errno(), Some(libc::EPERM | libc::EACCES))
    }

    pub fn is_already_exists(&self) -> bool {
        self.errno() == Some(libc::EEXIST)
    }

    /// Cancelled or timed out, as opposed to failed.
    pub fn is_interrupted(&self) -> bool {
        matches!(self, Self::Cancelled | Self::Timeout(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_errno() {
        let err = Error::from_errno(-1); // EPERM
        assert!(err.is_permission_denied());
        assert_eq!(err.errno(), Some(1));
    }

    #[test]
    fn test_from_errno_with_context() {
        let err = Error::from_errno_with_context(-2, "deleting interface can0"); // ENOENT
        assert!(err.is_not_found());
        let msg = err.to_string();
        assert!(msg.contains("deleting interface can0"));
        assert!(msg.contains("No such file or directory"));
    }

    #[test]
    fn test_with_context() {
        let err = Error::from_errno(-17).with_context("adding vlan eth0.100");
        assert!(err.is_already_exists());
        assert!(err.to_string().contains("adding vlan eth0.100"));
    }

    #[test]
    fn test_with_context_leaves_other_errors() {
        let err = Error::NoAck.with_context("ignored");
        assert!(matches!(err, Error::NoAck));
    }

    #[test]
    fn test_interrupted() {
        assert!(Error::Cancelled.is_interrupted());
        assert!(Error::Timeout(std::time::Duration::from_secs(1)).is_interrupted());
        assert!(!Error::NoAck.is_interrupted());
    }

    #[test]
    fn test_error_messages() {
        let err = Error::InterfaceNotFound {
            name: "can0".into(),
        };
        assert_eq!(err.to_string(), "interface not found: can0");

        let err = Error::BufferOverflow { capacity: 128 };
        assert_eq!(err.to_string(), "message buffer overflow (capacity 128 bytes)");

        let err = Error::UnclosedNest { open: 2 };
        assert_eq!(err.to_string(), "2 nested attribute(s) left open");
    }
}
