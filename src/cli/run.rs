//! `run` subcommand: collect the inventory and write the report

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use crate::checks::{CheckRegistry, CheckRunner};
use crate::collector::{Collector, CollectorOptions};
use crate::config::Config;
use crate::kube::{ClusterApi, KubeClusterApi, create_client, current_context};
use crate::report::{RenderNode, ReportFormat, ReportNode, write_report, write_report_file};

/// Arguments of the `run` subcommand
#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Write the YAML (Sonobuoy results) report to this file
    #[arg(long, value_name = "PATH")]
    pub sonobuoy_report: Option<PathBuf>,

    /// Write the JSON report to this file
    #[arg(long, value_name = "PATH")]
    pub json_report: Option<PathBuf>,

    /// Write the report here, JSON for `.json` files and YAML otherwise
    #[arg(long, short = 'o', value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Namespace to inventory (repeatable); replaces the configured list
    #[arg(long = "namespace", short = 'n', value_name = "NS")]
    pub namespaces: Vec<String>,

    /// Run the configured checks; fails when none are configured
    #[arg(long)]
    pub checks: bool,
}

impl RunArgs {
    /// Report destinations with their formats
    fn destinations(&self) -> Vec<(PathBuf, ReportFormat)> {
        let mut destinations = Vec::new();
        if let Some(path) = &self.sonobuoy_report {
            destinations.push((path.clone(), ReportFormat::Yaml));
        }
        if let Some(path) = &self.json_report {
            destinations.push((path.clone(), ReportFormat::Json));
        }
        if let Some(path) = &self.output {
            destinations.push((path.clone(), ReportFormat::from_path(path)));
        }
        destinations
    }
}

/// Collect the inventory of the configured cluster and write the report
pub async fn run_inventory(args: RunArgs, mut config: Config) -> Result<()> {
    if !args.namespaces.is_empty() {
        config.namespaces = args.namespaces.clone();
    }

    let context = current_context(config.context.as_deref());
    info!("Using context {}", context);

    let client = create_client(config.context.as_deref(), config.request_timeout()).await?;
    let api: Arc<dyn ClusterApi> = Arc::new(KubeClusterApi::new(client, config.request_timeout()));

    let mut collector = Collector::new(api.clone(), CollectorOptions::from(&config));
    if args.checks {
        let registry = CheckRegistry::with_builtin(api);
        let runner =
            CheckRunner::from_configs(&registry, &config.checks, config.collector.concurrency)
                .context("Failed to build checks")?;
        collector = collector.with_checks(runner);
    }

    let inventory = collector.run().await.context("Inventory run failed")?;
    let report = inventory
        .render_node()
        .with_meta("context", context);

    emit(&report, &args.destinations())
}

fn emit(report: &ReportNode, destinations: &[(PathBuf, ReportFormat)]) -> Result<()> {
    if destinations.is_empty() {
        let stdout = std::io::stdout();
        return write_report(stdout.lock(), report, ReportFormat::Yaml)
            .context("Failed to write report to stdout");
    }

    for (path, format) in destinations {
        write_report_file(path, report, *format)
            .with_context(|| format!("Failed to write report: {}", path.display()))?;
    }
    Ok(())
}
