//! Interface state through `ifreq` ioctls.
//!
//! The interface tracker only needs three questions answered about an
//! interface; [`InterfaceProbe`] is that seam, and [`IfreqProbe`] answers
//! them with `SIOCGIFFLAGS`/`SIOCGIFADDR` on a short-lived control socket.

use std::io;
use std::os::fd::{AsRawFd, FromRawFd, OwnedFd};

use super::ifname;
use crate::config::{Config, SocketDomain};
use crate::netlink::error::{Error, Result};

/// Point-in-time queries about a named interface.
pub trait InterfaceProbe {
    /// Interface index, or 0 when the interface does not exist.
    fn index(&self, name: &str) -> u32;

    /// Whether the interface is administratively up (`IFF_UP`).
    fn is_up(&self, name: &str) -> bool;

    /// Whether the interface has an IPv4 address assigned.
    fn has_ipv4(&self, name: &str) -> bool;
}

impl<P: InterfaceProbe + ?Sized> InterfaceProbe for &P {
    fn index(&self, name: &str) -> u32 {
        (**self).index(name)
    }

    fn is_up(&self, name: &str) -> bool {
        (**self).is_up(name)
    }

    fn has_ipv4(&self, name: &str) -> bool {
        (**self).has_ipv4(name)
    }
}

/// [`InterfaceProbe`] backed by ioctls on a socket of the configured domain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IfreqProbe {
    domain: SocketDomain,
}

impl IfreqProbe {
    /// Create a probe that issues ioctls through a socket of `domain`.
    pub fn new(domain: SocketDomain) -> Self {
        Self { domain }
    }

    /// Create a probe using the configured socket domain.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.socket_domain)
    }

    /// Get the socket domain.
    pub fn domain(&self) -> SocketDomain {
        self.domain
    }

    /// Read the interface flags (`SIOCGIFFLAGS`).
    pub fn flags(&self, name: &str) -> Result<u32> {
        let sock = self.control_socket()?;
        let mut req = ifreq_for(name)?;
        ioctl(&sock, libc::SIOCGIFFLAGS as _, &mut req)
            .map_err(|e| ioctl_error(e, "SIOCGIFFLAGS", name))?;
        // SAFETY: SIOCGIFFLAGS fills ifru_flags.
        let flags = unsafe { req.ifr_ifru.ifru_flags };
        Ok(flags as u16 as u32)
    }

    /// Bring the interface up (sets `IFF_UP`).
    pub fn set_up(&self, name: &str) -> Result<()> {
        self.update_flags(name, |flags| flags | libc::IFF_UP as libc::c_short)
    }

    /// Take the interface down (clears `IFF_UP`).
    pub fn set_down(&self, name: &str) -> Result<()> {
        self.update_flags(name, |flags| flags & !(libc::IFF_UP as libc::c_short))
    }

    fn update_flags(
        &self,
        name: &str,
        f: impl FnOnce(libc::c_short) -> libc::c_short,
    ) -> Result<()> {
        let sock = self.control_socket()?;
        let mut req = ifreq_for(name)?;
        ioctl(&sock, libc::SIOCGIFFLAGS as _, &mut req)
            .map_err(|e| ioctl_error(e, "SIOCGIFFLAGS", name))?;

        // SAFETY: SIOCGIFFLAGS filled ifru_flags; SIOCSIFFLAGS reads it back.
        unsafe {
            req.ifr_ifru.ifru_flags = f(req.ifr_ifru.ifru_flags);
        }
        ioctl(&sock, libc::SIOCSIFFLAGS as _, &mut req)
            .map_err(|e| ioctl_error(e, "SIOCSIFFLAGS", name))?;

        tracing::debug!(interface = name, "interface flags updated");
        Ok(())
    }

    fn control_socket(&self) -> Result<OwnedFd> {
        let (domain, ty, protocol) = self.domain.socket_args();
        // SAFETY: plain socket(2) call; the fd is owned below.
        let fd = unsafe { libc::socket(domain, ty | libc::SOCK_CLOEXEC, protocol) };
        if fd < 0 {
            return Err(io::Error::last_os_error().into());
        }
        // SAFETY: fd is a freshly created descriptor nobody else owns.
        Ok(unsafe { OwnedFd::from_raw_fd(fd) })
    }
}

impl InterfaceProbe for IfreqProbe {
    fn index(&self, name: &str) -> u32 {
        ifname::name_to_index(name)
    }

    fn is_up(&self, name: &str) -> bool {
        match self.flags(name) {
            Ok(flags) => flags & libc::IFF_UP as u32 != 0,
            Err(e) => {
                tracing::debug!(interface = name, error = %e, "flag query failed");
                false
            }
        }
    }

    fn has_ipv4(&self, name: &str) -> bool {
        let result = self.control_socket().and_then(|sock| {
            let mut req = ifreq_for(name)?;
            req.ifr_ifru.ifru_addr.sa_family = libc::AF_INET as libc::sa_family_t;
            ioctl(&sock, libc::SIOCGIFADDR as _, &mut req).map_err(Error::from)
        });
        match result {
            Ok(()) => true,
            Err(e) => {
                tracing::trace!(interface = name, error = %e, "no IPv4 address");
                false
            }
        }
    }
}

fn ifreq_for(name: &str) -> Result<libc::ifreq> {
    ifname::validate(name)?;
    // SAFETY: ifreq is plain old data; all-zero is a valid value.
    let mut req: libc::ifreq = unsafe { std::mem::zeroed() };
    for (dst, src) in req.ifr_name.iter_mut().zip(name.as_bytes()) {
        *dst = *src as libc::c_char;
    }
    Ok(req)
}

fn ioctl_error(err: io::Error, request: &str, name: &str) -> Error {
    match err.raw_os_error() {
        Some(errno) => Error::from_errno_with_context(-errno, format!("{} {}", request, name)),
        None => Error::Io(err),
    }
}

fn ioctl(sock: &OwnedFd, request: libc::Ioctl, req: &mut libc::ifreq) -> io::Result<()> {
    // SAFETY: req is a valid ifreq for the duration of the call.
    let ret = unsafe { libc::ioctl(sock.as_raw_fd(), request, req as *mut libc::ifreq) };
    if ret < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}
