//! Armada - multi-cluster apply tool
//!
//! Usage:
//!   armada install mesh --repo https://charts.example.io/ --version 1.4.2 \
//!       --kubeconfig east.yaml --kubeconfig west.yaml
//!   armada apply -f rendered.yaml --targets fleet.toml
//!   armada delete -f rendered.yaml --namespace demo

mod targets;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use armada_core::client::HelmCliFactory;
use armada_core::deploy::Deployer;
use armada_core::error::DeployError;
use armada_core::types::{ChartSpec, ManifestPayload, Operation};

use crate::targets::load_targets;

#[derive(Parser)]
#[command(name = "armada")]
#[command(about = "Apply charts and manifests across a fleet of clusters", long_about = None)]
struct Cli {
    /// Per-target deadline in seconds (off by default)
    #[arg(long, global = true)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Install a chart on every target cluster
    Install {
        /// Chart name within the repository
        chart: String,

        #[command(flatten)]
        chart_opts: ChartOpts,

        #[command(flatten)]
        fleet: FleetOpts,
    },
    /// Remove a chart release from every target cluster
    Uninstall {
        /// Chart name within the repository
        chart: String,

        #[command(flatten)]
        chart_opts: ChartOpts,

        #[command(flatten)]
        fleet: FleetOpts,
    },
    /// Apply a rendered manifest on every target cluster
    Apply {
        #[command(flatten)]
        manifest_opts: ManifestOpts,

        #[command(flatten)]
        fleet: FleetOpts,
    },
    /// Delete the resources of a rendered manifest from every target cluster
    Delete {
        #[command(flatten)]
        manifest_opts: ManifestOpts,

        #[command(flatten)]
        fleet: FleetOpts,
    },
}

#[derive(Args)]
struct ChartOpts {
    /// Chart repository URL
    #[arg(long)]
    repo: String,

    /// Chart version
    #[arg(long)]
    version: String,

    /// Target namespace
    #[arg(short, long, default_value = "default")]
    namespace: String,

    /// Release name (defaults to the chart name)
    #[arg(long)]
    release: Option<String>,

    /// Create the namespace if it does not exist
    #[arg(long)]
    create_namespace: bool,
}

#[derive(Args)]
struct ManifestOpts {
    /// Path to the rendered manifest
    #[arg(short, long)]
    file: PathBuf,

    /// Target namespace
    #[arg(short, long, default_value = "default")]
    namespace: String,

    /// Fail instead of updating resources that already exist
    #[arg(long)]
    no_update: bool,
}

#[derive(Args)]
struct FleetOpts {
    /// Kubeconfig path for one target cluster (repeatable)
    #[arg(long = "kubeconfig")]
    kubeconfigs: Vec<PathBuf>,

    /// TOML fleet file listing named clusters
    #[arg(long = "targets")]
    fleet_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "armada=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let (op, fleet) = build_operation(cli.command)?;
    let targets = load_targets(&fleet.kubeconfigs, fleet.fleet_file.as_deref())?;

    let mut deployer = Deployer::new(HelmCliFactory::new());
    if let Some(secs) = cli.timeout {
        deployer = deployer.with_target_timeout(Duration::from_secs(secs));
    }

    match deployer.run(op, targets).await {
        Ok(status) => {
            println!("{status}");
            Ok(())
        }
        Err(err) => {
            report_failures(&err);
            Err(err.into())
        }
    }
}

fn build_operation(command: Commands) -> Result<(Operation, FleetOpts)> {
    match command {
        Commands::Install { chart, chart_opts, fleet } => {
            Ok((Operation::InstallChart(chart_spec(chart, chart_opts)), fleet))
        }
        Commands::Uninstall { chart, chart_opts, fleet } => Ok((
            Operation::UninstallChart(chart_spec(chart, chart_opts)),
            fleet,
        )),
        Commands::Apply { manifest_opts, fleet } => {
            Ok((Operation::ApplyManifest(manifest(manifest_opts)?), fleet))
        }
        Commands::Delete { manifest_opts, fleet } => {
            Ok((Operation::DeleteManifest(manifest(manifest_opts)?), fleet))
        }
    }
}

fn chart_spec(chart: String, opts: ChartOpts) -> ChartSpec {
    let release_name = opts.release.unwrap_or_else(|| chart.clone());
    ChartSpec {
        repository: opts.repo,
        chart,
        version: opts.version,
        namespace: opts.namespace,
        create_namespace: opts.create_namespace,
        release_name,
    }
}

fn manifest(opts: ManifestOpts) -> Result<ManifestPayload> {
    let contents = std::fs::read(&opts.file)
        .with_context(|| format!("Failed to read manifest {}", opts.file.display()))?;
    Ok(ManifestPayload {
        contents,
        namespace: opts.namespace,
        update: !opts.no_update,
    })
}

fn report_failures(err: &DeployError) {
    eprintln!("apply failed ({} of the fleet):", err.error.len());
    for failure in err.error.failures() {
        eprintln!("  {failure}");
    }
    eprintln!("status: {}", err.status);
}
