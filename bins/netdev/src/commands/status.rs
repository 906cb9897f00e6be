//! netdev status - show present/up/ipv4 per interface.

use std::io::{self, Write};

use clap::Args;
use netdevice::util::{IfreqProbe, list_interfaces};
use netdevice::wait::{InterfaceTracker, WaitState};
use netdevice::Config;

use super::Output;

#[derive(Args)]
pub struct StatusCmd {
    /// Interface names (default: all interfaces).
    names: Vec<String>,
}

impl StatusCmd {
    pub fn run(self, config: &Config, output: Output) -> anyhow::Result<()> {
        let names = if self.names.is_empty() {
            list_interfaces()?
        } else {
            self.names
        };

        let tracker = InterfaceTracker::new(IfreqProbe::from_config(config), names);
        let mut stdout = io::stdout().lock();

        if output.json {
            output.write_json(&mut stdout, tracker.states())?;
        } else {
            for state in tracker.states() {
                print_state(&mut stdout, state)?;
            }
        }

        Ok(())
    }
}

fn print_state<W: Write>(out: &mut W, state: &WaitState) -> io::Result<()> {
    if !state.present {
        return writeln!(out, "{:<16} absent", state.name);
    }
    writeln!(
        out,
        "{:<16} {:<5} {}",
        state.name,
        if state.up { "UP" } else { "DOWN" },
        if state.has_ipv4 { "ipv4" } else { "-" }
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_print_state() {
        let mut out = Vec::new();
        let state = WaitState {
            name: "can0".into(),
            present: true,
            up: true,
            has_ipv4: false,
        };
        print_state(&mut out, &state).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "can0             UP    -\n");

        let mut out = Vec::new();
        let state = WaitState {
            present: false,
            up: false,
            ..state
        };
        print_state(&mut out, &state).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "can0             absent\n");
    }
}
