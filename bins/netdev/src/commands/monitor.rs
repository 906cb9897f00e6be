//! netdev monitor - print link and address notifications.

use std::io::{self, Write};

use clap::Args;
use netdevice::Config;
use netdevice::netlink::events::{EventStream, NetworkEvent};
use serde::Serialize;
use tokio_stream::StreamExt;

use super::Output;

#[derive(Args)]
pub struct MonitorCmd {
    /// Only link events.
    #[arg(long, conflicts_with = "addresses")]
    links: bool,

    /// Only address events.
    #[arg(long)]
    addresses: bool,
}

#[derive(Serialize)]
struct EventLine<'a> {
    action: &'static str,
    kind: &'static str,
    ifindex: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    up: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    address: Option<String>,
}

impl MonitorCmd {
    pub async fn run(&self, config: &Config, output: Output) -> anyhow::Result<()> {
        let all = !self.links && !self.addresses;
        let mut stream = EventStream::builder()
            .links(all || self.links)
            .addresses(all || self.addresses)
            .config(config.clone())
            .build()?;

        let mut stdout = io::stdout().lock();
        if !output.json {
            writeln!(stdout, "Monitoring link and address events (Ctrl+C to stop)...")?;
            stdout.flush()?;
        }

        while let Some(event) = stream.try_next().await? {
            let line = to_line(&event);
            if output.json {
                output.write_json(&mut stdout, &line)?;
            } else {
                print_line(&mut stdout, &line)?;
            }
            stdout.flush()?;
        }

        Ok(())
    }
}

fn to_line(event: &NetworkEvent) -> EventLine<'_> {
    match event {
        NetworkEvent::NewLink(link) | NetworkEvent::DelLink(link) => EventLine {
            action: event.action(),
            kind: "link",
            ifindex: link.ifindex(),
            name: link.name(),
            up: Some(link.is_up()),
            address: None,
        },
        NetworkEvent::NewAddress(addr) | NetworkEvent::DelAddress(addr) => EventLine {
            action: event.action(),
            kind: "address",
            ifindex: addr.ifindex(),
            name: addr.label(),
            up: None,
            address: addr
                .primary_address()
                .map(|ip| format!("{}/{}", ip, addr.prefix_len())),
        },
    }
}

fn print_line<W: Write>(out: &mut W, line: &EventLine<'_>) -> io::Result<()> {
    write!(out, "[{}] {} {}", line.kind, line.action, line.ifindex)?;
    if let Some(name) = line.name {
        write!(out, " {}", name)?;
    }
    if let Some(up) = line.up {
        write!(out, " {}", if up { "UP" } else { "DOWN" })?;
    }
    if let Some(ref address) = line.address {
        write!(out, " {}", address)?;
    }
    writeln!(out)
}
