//! netdev add/del/vlan/up/down - link changes.

use clap::Args;
use netdevice::netlink::{Connection, Protocol, VLAN_ID_MAX};
use netdevice::util::IfreqProbe;
use netdevice::Config;

#[derive(Args)]
pub struct AddCmd {
    /// Interface name.
    name: String,

    /// Link kind (e.g. vcan, dummy).
    #[arg(default_value = "vcan")]
    kind: String,
}

impl AddCmd {
    pub async fn run(self, config: &Config) -> anyhow::Result<()> {
        let conn = Connection::with_config(Protocol::Route, 0, config)?;
        conn.add_link(&self.name, &self.kind).await?;
        Ok(())
    }
}

#[derive(Args)]
pub struct DelCmd {
    /// Interface name.
    name: String,
}

impl DelCmd {
    pub async fn run(self, config: &Config) -> anyhow::Result<()> {
        let conn = Connection::with_config(Protocol::Route, 0, config)?;
        conn.del_link(&self.name).await?;
        Ok(())
    }
}

#[derive(Args)]
pub struct VlanCmd {
    /// Parent interface.
    parent: String,

    /// VLAN ID.
    #[arg(value_parser = clap::value_parser!(u16).range(1..=VLAN_ID_MAX as i64))]
    id: u16,
}

impl VlanCmd {
    pub async fn run(self, config: &Config) -> anyhow::Result<()> {
        let conn = Connection::with_config(Protocol::Route, 0, config)?;
        let name = conn.add_vlan(&self.parent, self.id).await?;
        println!("{}", name);
        Ok(())
    }
}

#[derive(Args)]
pub struct StateCmd {
    /// Interface name.
    name: String,

    /// Use SIOCSIFFLAGS instead of netlink.
    #[arg(long)]
    ioctl: bool,
}

impl StateCmd {
    pub async fn run(self, config: &Config, up: bool) -> anyhow::Result<()> {
        if self.ioctl {
            let probe = IfreqProbe::from_config(config);
            if up {
                probe.set_up(&self.name)?;
            } else {
                probe.set_down(&self.name)?;
            }
            return Ok(());
        }

        let conn = Connection::with_config(Protocol::Route, 0, config)?;
        conn.set_link_state(&self.name, up).await?;
        Ok(())
    }
}
