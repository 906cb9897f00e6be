//! Interface name and index utilities.

use std::ffi::{CStr, CString};

use crate::netlink::error::{Error, Result};

/// Maximum interface name length (including null terminator).
pub const IFNAMSIZ: usize = libc::IFNAMSIZ;

/// Validate an interface name.
pub fn validate(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::InvalidName("empty name".to_string()));
    }

    if name.len() >= IFNAMSIZ {
        return Err(Error::InvalidName(format!(
            "name too long (max {} chars)",
            IFNAMSIZ - 1
        )));
    }

    if name.contains('/') || name.contains('\0') {
        return Err(Error::InvalidName(
            "name contains invalid characters".to_string(),
        ));
    }

    if name.chars().any(|c| c.is_whitespace()) {
        return Err(Error::InvalidName("name contains whitespace".to_string()));
    }

    Ok(())
}

/// Convert an interface name to its index.
///
/// Returns 0 when no such interface exists, like `if_nametoindex(3)`.
pub fn name_to_index(name: &str) -> u32 {
    if validate(name).is_err() {
        return 0;
    }
    let Ok(cname) = CString::new(name) else {
        return 0;
    };
    // SAFETY: cname is a valid NUL-terminated string.
    unsafe { libc::if_nametoindex(cname.as_ptr()) }
}

/// Resolve an interface name to its index, failing if it does not exist.
pub fn require_index(name: &str) -> Result<u32> {
    validate(name)?;
    match name_to_index(name) {
        0 => Err(Error::InterfaceNotFound {
            name: name.to_string(),
        }),
        index => Ok(index),
    }
}

/// Convert an interface index to its name.
pub fn index_to_name(index: u32) -> Result<String> {
    let mut buf = [0 as libc::c_char; IFNAMSIZ];
    // SAFETY: buf holds IFNAMSIZ bytes as if_indextoname requires.
    let ptr = unsafe { libc::if_indextoname(index, buf.as_mut_ptr()) };
    if ptr.is_null() {
        return Err(Error::InterfaceNotFound {
            name: format!("index {}", index),
        });
    }
    // SAFETY: on success buf holds a NUL-terminated name.
    let name = unsafe { CStr::from_ptr(buf.as_ptr()) };
    Ok(name.to_string_lossy().into_owned())
}

/// Get all interface names.
pub fn list_interfaces() -> Result<Vec<String>> {
    let entries = std::fs::read_dir("/sys/class/net")?;

    let mut names = Vec::new();
    for entry in entries.flatten() {
        names.push(entry.file_name().to_string_lossy().to_string());
    }

    names.sort();
    Ok(names)
}
