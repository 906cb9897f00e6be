//! netdev wait - block until interfaces reach a state.

use std::io::{self, Write};
use std::time::Duration;

use clap::Args;
use netdevice::util::IfreqProbe;
use netdevice::wait::{Quantifier, WaitCondition, wait_for};
use netdevice::{Config, Error};
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use super::Output;

#[derive(Args)]
pub struct WaitCmd {
    /// Interface names to watch.
    #[arg(required = true)]
    names: Vec<String>,

    /// Condition to wait for: present, up, ipv4 or down.
    #[arg(short = 'u', long, default_value = "up")]
    until: WaitCondition,

    /// Succeed as soon as any interface matches (default: all must).
    #[arg(long)]
    any: bool,

    /// Give up after this many seconds.
    #[arg(short = 't', long)]
    timeout: Option<f64>,
}

#[derive(Serialize)]
struct WaitResult<'a> {
    interface: &'a str,
    condition: WaitCondition,
    quantifier: Quantifier,
}

impl WaitCmd {
    pub async fn run(self, config: &Config, output: Output) -> anyhow::Result<()> {
        let quantifier = if self.any {
            Quantifier::AnyOf
        } else {
            Quantifier::AllOf
        };
        let timeout = self
            .timeout
            .map(Duration::try_from_secs_f64)
            .transpose()
            .map_err(|e| anyhow::anyhow!("invalid timeout: {}", e))?;

        let cancel = CancellationToken::new();
        tokio::spawn({
            let cancel = cancel.clone();
            async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    cancel.cancel();
                }
            }
        });

        let probe = IfreqProbe::from_config(config);
        let wait = wait_for(probe, self.names, self.until, quantifier, &cancel);
        let name = match timeout {
            Some(limit) => match tokio::time::timeout(limit, wait).await {
                Ok(result) => result?,
                Err(_) => return Err(Error::Timeout(limit).into()),
            },
            None => wait.await?,
        };

        let mut stdout = io::stdout().lock();
        if output.json {
            output.write_json(
                &mut stdout,
                &WaitResult {
                    interface: &name,
                    condition: self.until,
                    quantifier,
                },
            )?;
        } else {
            writeln!(stdout, "{}", name)?;
        }

        Ok(())
    }
}
