//! kube-inventory - cluster inventory reports for Kubernetes
//!
//! Collects workloads, their ownership trees and cluster components and
//! writes them as a Sonobuoy-style YAML or JSON report.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use kube_inventory::cli::{self, ConfigSubcommand, RunArgs};
use kube_inventory::config::ConfigLoader;

/// kube-inventory - cluster inventory reports for Kubernetes
#[derive(Parser, Debug)]
#[command(name = "kube-inventory", version)]
#[command(about = "Inventory of Kubernetes workloads and cluster components as a Sonobuoy-style report", long_about = None)]
struct Args {
    /// Enable debug logging
    #[arg(long, short = 'd', global = true)]
    debug: bool,

    /// Write logs to this file instead of stderr
    #[arg(long, value_name = "PATH", global = true)]
    log_file: Option<PathBuf>,

    /// Config file layered over the root config
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    /// Kubeconfig context to use
    #[arg(long, global = true)]
    context: Option<String>,

    #[command(subcommand)]
    command: Command,
}

/// Main commands
#[derive(Subcommand, Debug)]
enum Command {
    /// Collect the inventory and write the report
    Run(RunArgs),
    /// Configuration management
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    cli::init_logging(args.debug, args.log_file.as_deref())?;
    tracing::debug!("Debug logging enabled");

    match args.command {
        Command::Config { subcommand } => {
            cli::handle_config_command(subcommand, args.config.as_deref()).await
        }
        Command::Run(run_args) => {
            let mut config = ConfigLoader::load_validated(args.config.as_deref())
                .context("Failed to load configuration")?;
            if args.context.is_some() {
                config.context = args.context;
            }
            cli::run_inventory(run_args, config).await
        }
    }
}
