use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{error, info, warn};

use concert_pipeline::app::ingest_use_case::IngestUseCase;
use concert_pipeline::app::normalize_use_case::NormalizeUseCase;
use concert_pipeline::config::AppConfig;
use concert_pipeline::constants;
use concert_pipeline::infra::raw_snapshot;
use concert_pipeline::infra::{NdjsonRecordSink, ReqwestPageSource};
use concert_pipeline::logging;
use concert_pipeline::observability::{self, metrics};
use concert_pipeline::pipeline::{BatchResult, ListingPipeline};
use concert_pipeline::types::RawListing;

#[derive(Parser)]
#[command(name = "concert_pipeline")]
#[command(about = "Concert and festival listing scraper and normalizer")]
#[command(version)]
struct Cli {
    /// Path to the TOML config file
    #[arg(long, global = true, default_value = constants::DEFAULT_CONFIG_PATH)]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize a raw listing snapshot into concert and festival files
    Normalize {
        /// Raw listings JSON written by `scrape`
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        output_dir: Option<PathBuf>,
        /// Process the batch on the blocking worker pool
        #[arg(long)]
        parallel: bool,
    },
    /// Crawl the area index and save the event page URLs found
    Discover {
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Fetch event pages and save the extracted raw listings
    Scrape {
        /// File with one event page URL per line; discovered from the area index when omitted
        #[arg(long)]
        urls: Option<PathBuf>,
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Scrape, then normalize the result
    Run {
        #[arg(long)]
        urls: Option<PathBuf>,
        #[arg(long)]
        output_dir: Option<PathBuf>,
        #[arg(long)]
        parallel: bool,
    },
}

fn ingest_use_case(config: &AppConfig) -> anyhow::Result<IngestUseCase> {
    let source = Arc::new(ReqwestPageSource::new(&config.fetch)?);
    IngestUseCase::new(source, config.fetch.concurrency)
}

async fn discover(config: &AppConfig, use_case: &IngestUseCase, output_dir: &Path) -> anyhow::Result<Vec<String>> {
    let urls = use_case
        .discover(&config.fetch.area_url)
        .await
        .with_context(|| format!("Failed to discover event URLs from '{}'", config.fetch.area_url))?;
    let today = chrono::Local::now().date_naive();
    let path = raw_snapshot::write_url_list(output_dir, today, &urls)?;
    println!("   Event URLs: {} -> {}", urls.len(), path.display());
    Ok(urls)
}

async fn scrape(config: &AppConfig, urls_path: Option<&Path>, output_dir: &Path) -> anyhow::Result<Vec<RawListing>> {
    let use_case = ingest_use_case(config)?;
    let urls = match urls_path {
        Some(path) => raw_snapshot::read_url_list(path)
            .with_context(|| format!("Failed to read URL list '{}'", path.display()))?,
        None => discover(config, &use_case, output_dir).await?,
    };
    info!("Scraping {} URLs", urls.len());
    let listings = use_case.ingest(urls).await?;

    let today = chrono::Local::now().date_naive();
    let path = raw_snapshot::write_raw_batch(output_dir, today, &listings)?;
    println!("   Raw listings: {} -> {}", listings.len(), path.display());
    Ok(listings)
}

async fn normalize(
    config: &AppConfig,
    listings: Vec<RawListing>,
    output_dir: &Path,
    parallel: bool,
) -> anyhow::Result<BatchResult> {
    let pipeline = Arc::new(ListingPipeline::new(&config.normalize)?);
    let today = chrono::Local::now().date_naive();
    let sink = NdjsonRecordSink::create(output_dir, today)?;
    let paths = sink.paths().clone();

    let mut use_case = NormalizeUseCase::new(pipeline, Box::new(sink));
    if parallel {
        use_case = use_case.with_workers(config.output.workers);
    }
    let result = use_case.normalize_batch(listings).await?;

    println!("\n📊 Normalization results (run {}):", result.run_id);
    println!("   Total listings: {}", result.total_listings);
    println!("   Concerts: {} -> {}", result.concert_count(), paths.concerts.display());
    println!("   Festivals: {} -> {}", result.festival_count(), paths.festivals.display());
    println!("   Quarantined: {} -> {}", result.quarantined_count(), paths.quarantine.display());
    println!("   Warnings: {}", result.warnings.len());
    if !result.quarantined.is_empty() {
        println!("\n⚠️  Quarantined listings:");
        for listing in &result.quarantined {
            println!("   - {}: {}", listing.id, listing.reason);
        }
    }

    write_metrics_snapshot(output_dir);
    metrics::push_run_summary(result.run_summary()).await;
    Ok(result)
}

fn write_metrics_snapshot(output_dir: &Path) {
    let Some(rendered) = observability::render() else {
        return;
    };
    let path = output_dir.join("metrics.prom");
    match std::fs::write(&path, rendered) {
        Ok(()) => info!("Wrote metrics snapshot to {}", path.display()),
        Err(e) => warn!("Failed to write metrics snapshot to {}: {}", path.display(), e),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let _log_guard = logging::init_logging();

    if let Err(e) = observability::init() {
        warn!("Metrics disabled: {}", e);
    }

    let cli = Cli::parse();
    let config = AppConfig::load(&cli.config)?;
    let default_output = || PathBuf::from(&config.output.output_dir);

    let outcome = match cli.command {
        Commands::Normalize {
            input,
            output_dir,
            parallel,
        } => {
            println!("🔨 Normalizing {}...", input.display());
            let output_dir = output_dir.unwrap_or_else(default_output);
            let listings = raw_snapshot::read_raw_batch(&input)
                .with_context(|| format!("Failed to read raw listings '{}'", input.display()))?;
            normalize(&config, listings, &output_dir, parallel).await.map(|_| ())
        }
        Commands::Discover { output_dir } => {
            println!("🔎 Discovering event URLs from {}...", config.fetch.area_url);
            let output_dir = output_dir.unwrap_or_else(default_output);
            match ingest_use_case(&config) {
                Ok(use_case) => discover(&config, &use_case, &output_dir).await.map(|_| ()),
                Err(e) => Err(e),
            }
        }
        Commands::Scrape { urls, output_dir } => {
            println!("🔄 Scraping event pages...");
            let output_dir = output_dir.unwrap_or_else(default_output);
            scrape(&config, urls.as_deref(), &output_dir).await.map(|_| ())
        }
        Commands::Run {
            urls,
            output_dir,
            parallel,
        } => {
            println!("🚀 Running full pipeline (scrape + normalize)...");
            let output_dir = output_dir.unwrap_or_else(default_output);
            println!("\n📥 Step 1: Scraping...");
            match scrape(&config, urls.as_deref(), &output_dir).await {
                Ok(listings) => {
                    println!("\n🔨 Step 2: Normalizing...");
                    normalize(&config, listings, &output_dir, parallel).await.map(|_| ())
                }
                Err(e) => Err(e),
            }
        }
    };

    match outcome {
        Ok(()) => {
            println!("✅ Done");
            Ok(())
        }
        Err(e) => {
            error!("Pipeline failed: {:#}", e);
            println!("❌ Pipeline failed: {:#}", e);
            Err(e)
        }
    }
}
