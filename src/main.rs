//! KPI Sentinel - Main Entry Point
//!
//! Batch anomaly detection over 5G KPI tables from the command line.

use clap::Parser;
use kpi_sentinel::cli::{cmd_detect, cmd_info, Cli, Commands};

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kpi_sentinel=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Detect(args) => {
            cmd_detect(&args)?;
        }
        Commands::Info { data, delimiter } => {
            cmd_info(&data, delimiter)?;
        }
    }

    Ok(())
}
