//! Link integration tests.

use netdevice::netlink::{Connection, Protocol};
use netdevice::util::{IfreqProbe, InterfaceProbe, ifname};
use netdevice::{Result, SocketDomain};

use crate::common::TestLink;

#[tokio::test]
async fn test_add_set_state_and_delete() -> Result<()> {
    require_root!();

    let link = TestLink::reserve("ndl");
    let conn = Connection::new(Protocol::Route)?;
    let probe = IfreqProbe::new(SocketDomain::Inet);

    conn.add_link(link.name(), "dummy").await?;
    assert_ne!(probe.index(link.name()), 0);
    assert!(!probe.is_up(link.name()));

    conn.set_link_state(link.name(), true).await?;
    assert!(probe.is_up(link.name()));

    conn.set_link_state(link.name(), false).await?;
    assert!(!probe.is_up(link.name()));

    conn.del_link(link.name()).await?;
    assert_eq!(ifname::name_to_index(link.name()), 0);

    Ok(())
}

#[tokio::test]
async fn test_duplicate_add_reports_kernel_error() -> Result<()> {
    require_root!();

    let link = TestLink::reserve("ndd");
    let conn = Connection::new(Protocol::Route)?;

    conn.add_link(link.name(), "dummy").await?;
    let err = conn.add_link(link.name(), "dummy").await.unwrap_err();
    assert!(err.is_already_exists(), "unexpected error: {err}");

    Ok(())
}

#[tokio::test]
async fn test_vlan_on_dummy() -> Result<()> {
    require_root!();

    let parent = TestLink::reserve("ndv");
    parent.create_dummy()?;

    let conn = Connection::new(Protocol::Route)?;
    let name = conn.add_vlan(parent.name(), 42).await?;
    assert_eq!(name, format!("{}.42", parent.name()));
    assert_ne!(ifname::name_to_index(&name), 0);

    // Deleting the parent removes the VLAN too
    conn.del_link(parent.name()).await?;
    assert_eq!(ifname::name_to_index(&name), 0);

    Ok(())
}

#[tokio::test]
async fn test_ifreq_toggle() -> Result<()> {
    require_root!();

    let link = TestLink::reserve("ndi");
    link.create_dummy()?;
    let probe = IfreqProbe::default();

    probe.set_up(link.name())?;
    assert!(probe.is_up(link.name()));
    probe.set_down(link.name())?;
    assert!(!probe.is_up(link.name()));

    Ok(())
}

#[tokio::test]
async fn test_missing_link_not_found() -> Result<()> {
    require_root!();

    let conn = Connection::new(Protocol::Route)?;
    let err = conn.del_link("nd-absent0").await.unwrap_err();
    assert!(matches!(err, netdevice::Error::InterfaceNotFound { .. }));

    Ok(())
}
