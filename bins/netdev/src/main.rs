//! netdev command - create, toggle and wait for network interfaces.

mod commands;

use clap::{Parser, Subcommand};
use netdevice::{Config, SocketDomain};

#[derive(Parser)]
#[command(name = "netdev", version, about = "Network interface control tool")]
struct Cli {
    /// Issue interface ioctls through a CAN socket (for hosts without IP).
    #[arg(long, global = true)]
    can: bool,

    /// Output JSON.
    #[arg(short = 'j', long, global = true)]
    json: bool,

    /// Pretty print JSON.
    #[arg(short = 'p', long, global = true)]
    pretty: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Wait until interfaces reach a state.
    #[command(visible_alias = "w")]
    Wait(commands::wait::WaitCmd),

    /// Show the tracked state of interfaces.
    #[command(visible_alias = "s", visible_alias = "show")]
    Status(commands::status::StatusCmd),

    /// Print link and address notifications.
    #[command(visible_alias = "m", visible_alias = "mon")]
    Monitor(commands::monitor::MonitorCmd),

    /// Create a link of the given kind.
    Add(commands::link::AddCmd),

    /// Delete a link.
    #[command(visible_alias = "delete")]
    Del(commands::link::DelCmd),

    /// Create a VLAN on top of a link.
    Vlan(commands::link::VlanCmd),

    /// Bring a link up.
    Up(commands::link::StateCmd),

    /// Take a link down.
    Down(commands::link::StateCmd),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = Config::new().socket_domain(if cli.can {
        SocketDomain::Can
    } else {
        SocketDomain::Inet
    });
    let output = commands::Output {
        json: cli.json,
        pretty: cli.pretty,
    };

    let result = match cli.command {
        Command::Wait(cmd) => cmd.run(&config, output).await,
        Command::Status(cmd) => cmd.run(&config, output),
        Command::Monitor(cmd) => cmd.run(&config, output).await,
        Command::Add(cmd) => cmd.run(&config).await,
        Command::Del(cmd) => cmd.run(&config).await,
        Command::Vlan(cmd) => cmd.run(&config).await,
        Command::Up(cmd) => cmd.run(&config, true).await,
        Command::Down(cmd) => cmd.run(&config, false).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}
