//! pingme: export monitoring data from MongoDB Ops Manager

pub mod connection;
pub mod inventory;
pub mod metrics;

use std::io::Write;

use anyhow::Result;
use pm_rest_client::OpsManagerClient;
use tracing_subscriber::EnvFilter;

// Re-export CLI types for testing
pub use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "pingme")]
#[command(about = "Export monitoring data from MongoDB Ops Manager")]
#[command(version, author, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub connection: connection::ConnectionArgs,

    /// Log every request at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print a page of groups
    Groups(inventory::GroupsArgs),
    /// Print a page of hosts of a group
    Hosts(inventory::HostsArgs),
    /// Print the monitoring, backup and automation agents of a group
    Agents(inventory::AgentsArgs),
    /// Print every measurement of every host in a group, one JSON document per line
    ExportMetrics(metrics::ExportArgs),
    /// Write the measurements of every group and host to a file
    Snapshot(metrics::SnapshotArgs),
}

impl Commands {
    pub fn run(self, client: &OpsManagerClient, server: &str, out: &mut dyn Write) -> Result<()> {
        match self {
            Commands::Groups(args) => args.run(client, out),
            Commands::Hosts(args) => args.run(client, out),
            Commands::Agents(args) => args.run(client, out),
            Commands::ExportMetrics(args) => args.run(client, out).map(|_| ()),
            Commands::Snapshot(args) => args.run(client, server),
        }
    }
}

/// Install the stderr log subscriber. `RUST_LOG` overrides the default level.
pub fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
