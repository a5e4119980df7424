use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use dishbench_core::DishQuery;
use dishbench_scraper::{analyze_payload, OutcomeSummary, Pipeline, ReportSettings, ScrapeOutcome};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "dishbench-cli")]
#[command(about = "Benchmark dish prices on a food delivery search page")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Capture, replay and analyze a live search
    Scrape {
        /// Dish to search for (default: Biryani)
        #[arg(long)]
        item: Option<String>,
        /// Latitude of the delivery location
        #[arg(long, allow_hyphen_values = true)]
        lat: Option<String>,
        /// Longitude of the delivery location
        #[arg(long, allow_hyphen_values = true)]
        long: Option<String>,
        #[arg(long)]
        pretty: bool,
    },
    /// Analyze a saved search API response without a browser
    Analyze {
        payload: PathBuf,
        #[arg(long)]
        pretty: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = dishbench_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let (outcome, pretty) = match cli.command {
        Commands::Scrape {
            item,
            lat,
            long,
            pretty,
        } => {
            let query = DishQuery::from_raw(item.as_deref(), lat.as_deref(), long.as_deref())?;
            tracing::info!(
                item = %query.item,
                lat = query.latitude,
                long = query.longitude,
                "starting scrape"
            );
            let pipeline = Pipeline::from_config(&config)?;
            let outcome = match pipeline.run(&query).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::error!(
                        item = %query.item,
                        kind = %e.kind(),
                        error = %e,
                        "scrape failed"
                    );
                    anyhow::bail!("scrape failed [{}]: {e}", e.kind());
                }
            };
            (outcome, pretty)
        }
        Commands::Analyze { payload, pretty } => {
            tracing::info!(path = %payload.display(), "analyzing saved payload");
            let outcome = analyze_file(&payload, &ReportSettings::from_config(&config))?;
            (outcome, pretty)
        }
    };

    tracing::info!(
        outcome = outcome.as_str(),
        dropped = outcome.drops().total(),
        "command finished"
    );

    println!("{}", render(outcome, pretty)?);
    Ok(())
}

/// Reads a saved search API response and runs the offline half of the
/// pipeline over it.
fn analyze_file(path: &Path, settings: &ReportSettings) -> anyhow::Result<ScrapeOutcome> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read payload {}", path.display()))?;
    let payload: serde_json::Value = serde_json::from_str(&raw)
        .with_context(|| format!("payload {} is not valid JSON", path.display()))?;
    Ok(analyze_payload(&payload, settings))
}

fn render(outcome: ScrapeOutcome, pretty: bool) -> anyhow::Result<String> {
    let summary = OutcomeSummary::from(outcome);
    let json = if pretty {
        serde_json::to_string_pretty(&summary)?
    } else {
        serde_json::to_string(&summary)?
    };
    Ok(json)
}
