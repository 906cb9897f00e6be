//! Waiting on real link notifications.

use std::time::Duration;

use netdevice::netlink::{Connection, Protocol};
use netdevice::util::IfreqProbe;
use netdevice::wait::{Quantifier, WaitCondition, wait_for_timeout};
use netdevice::{Error, Result};

use crate::common::TestLink;

#[tokio::test]
async fn test_wait_for_link_up() -> Result<()> {
    require_root!();

    let link = TestLink::reserve("ndw");
    let name = link.name().to_string();

    let waiter = tokio::spawn({
        let name = name.clone();
        async move {
            wait_for_timeout(
                IfreqProbe::default(),
                [name],
                WaitCondition::PresentAndUp,
                Quantifier::AllOf,
                Duration::from_secs(5),
            )
            .await
        }
    });

    tokio::time::sleep(Duration::from_millis(100)).await;
    let conn = Connection::new(Protocol::Route)?;
    conn.add_link(&name, "dummy").await?;
    conn.set_link_state(&name, true).await?;

    let satisfied = waiter.await.expect("wait task panicked")?;
    assert_eq!(satisfied, name);

    Ok(())
}

#[tokio::test]
async fn test_wait_times_out() -> Result<()> {
    require_root!();

    let result = wait_for_timeout(
        IfreqProbe::default(),
        ["nd-absent2"],
        WaitCondition::Present,
        Quantifier::AllOf,
        Duration::from_millis(200),
    )
    .await;
    assert!(matches!(result, Err(Error::Timeout(_))));

    Ok(())
}
