use clap::{Parser, Subcommand};
use tracing::{error, info};

mod artifacts;
mod config;
mod constants;
mod error;
mod logging;
mod output;
mod pipeline;
mod types;
mod vendor;

use crate::config::Config;
use crate::pipeline::{run_artifacts, BatchResult};
use crate::vendor::ArtemisClient;

#[derive(Parser)]
#[command(name = "pump_charts")]
#[command(about = "Market-data ETL producing chart-ready JSON series")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch vendor metrics and build the networked artifacts
    Fetch {
        /// Specific artifacts to build (comma-separated). Available:
        /// price_fees, price_revenue, price_buybacks_usd, buybacks_vs_mcap
        #[arg(long)]
        artifacts: Option<String>,
        /// Override the rolling window size in days
        #[arg(long)]
        window_days: Option<i64>,
    },
    /// Rebuild the mcap/buybacks artifact from local data, no network
    Rebuild,
    /// Fetch all artifacts, then rebuild the local one
    Run {
        /// Specific artifacts to fetch (comma-separated)
        #[arg(long)]
        artifacts: Option<String>,
    },
}

fn artifact_list(arg: Option<String>) -> Vec<String> {
    match arg {
        Some(list) => list.split(',').map(|s| s.trim().to_string()).collect(),
        None => constants::get_fetch_artifacts()
            .into_iter()
            .map(|s| s.to_string())
            .collect(),
    }
}

fn print_batch(batch: &BatchResult) {
    for report in &batch.built {
        println!(
            "✅ {}: {} rows -> {}",
            report.artifact, report.rows, report.output_file
        );
    }
    if !batch.failures.is_empty() {
        println!("\n⚠️  Failures:");
        for failure in &batch.failures {
            println!("   - {}: {}", failure.artifact, failure.error);
        }
    }
}

fn rebuild_local(config: &Config) -> bool {
    println!("🔄 Rebuilding mcap/buybacks artifact from local data...");
    match artifacts::mcap_rebuild::rebuild(config) {
        Ok(report) => {
            println!(
                "✅ {}: {} rows -> {}",
                report.artifact, report.rows, report.output_file
            );
            true
        }
        Err(e) => {
            error!("Rebuild failed: {}", e);
            println!("⚠️  Rebuild failed: {e}");
            false
        }
    }
}

async fn fetch(config: &Config, artifacts: Option<String>) -> Result<BatchResult, Box<dyn std::error::Error>> {
    let client = ArtemisClient::from_env(config)?;
    let names = artifact_list(artifacts);
    info!("Fetching {} artifact(s) for '{}'", names.len(), config.asset);

    let batch = run_artifacts(&client, config, &names).await;
    print_batch(&batch);
    Ok(batch)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    logging::init_logging();

    let cli = Cli::parse();
    let mut config = Config::load()?;

    match cli.command {
        Commands::Fetch { artifacts, window_days } => {
            if let Some(days) = window_days {
                config.window_days = days;
            }
            println!("🔄 Building chart artifacts...");
            let batch = fetch(&config, artifacts).await?;
            if batch.all_failed() {
                error!("Every artifact failed");
                std::process::exit(1);
            }
        }
        Commands::Rebuild => {
            if !rebuild_local(&config) {
                std::process::exit(1);
            }
        }
        Commands::Run { artifacts: names } => {
            println!("🔄 Building chart artifacts...");
            let batch = fetch(&config, names).await?;
            let rebuilt = rebuild_local(&config);
            // a failed rebuild is a failed run, same as a standalone rebuild
            if batch.all_failed() || !rebuilt {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
