//! bibminer - DBLP conference miner with CiteSeer citing authors
//!
//! ## Usage
//!
//! ```bash
//! bibminer icse -l 5 -s 10 -f icse.jsonl
//! bibminer podc --nocite
//! ```

use anyhow::{Context, Result};
use bibminer::cache::FsCache;
use bibminer::citeseer::CiteSeerMiner;
use bibminer::config::MinerConfig;
use bibminer::dblp::{ConferenceQuery, DblpMiner};
use bibminer::fetch::{ContentFetcher, HttpTransport};
use bibminer::harvest::{Harvester, RecordSink};
use clap::Parser;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::{fmt, EnvFilter};

// ============================================================================
// CLI Definition
// ============================================================================

/// Extracts bibliographic data from DBLP
#[derive(Parser)]
#[command(name = "bibminer")]
#[command(version, about, long_about = None)]
struct Cli {
    /// The name of the conference to extract
    name: String,

    /// The output file for conference data (default: <name>.dat)
    #[arg(short = 'f')]
    file: Option<PathBuf>,

    /// Number of conference dates to mine
    #[arg(short = 'l', default_value_t = 30)]
    limit: usize,

    /// Number of conference dates (in index order) to skip before mining
    #[arg(short = 's', default_value_t = 0)]
    skip: usize,

    /// Disable citation mining from CiteSeer (also accepted as -nc)
    #[arg(long = "nocite")]
    nocite: bool,

    /// JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Page cache directory (overrides the config file)
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    /// Proxy URL (e.g., http://127.0.0.1:7890)
    #[arg(long)]
    proxy: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,
}

/// Rewrite the legacy two-letter `-nc` flag, which clap cannot express as a short option
fn normalize_args(args: impl Iterator<Item = String>) -> Vec<String> {
    args.map(|arg| if arg == "-nc" { "--nocite".to_string() } else { arg })
        .collect()
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_from(normalize_args(std::env::args()));

    // Logs go to stderr; stdout stays free for data
    let log_level = if cli.debug { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_string()));

    if cli.log_json {
        fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_thread_ids(false)
            .with_writer(std::io::stderr)
            .init();
    }

    run(cli).await
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => MinerConfig::load(path)?,
        None => MinerConfig::default(),
    };
    if let Some(dir) = cli.cache_dir {
        config.cache.dir = dir;
    }
    if let Some(proxy) = cli.proxy {
        config.http.proxy = Some(proxy);
    }

    let output_path = cli
        .file
        .unwrap_or_else(|| PathBuf::from(format!("{}.dat", cli.name)));
    let output = File::create(&output_path)
        .with_context(|| format!("Failed to create output file {}", output_path.display()))?;
    let mut sink = RecordSink::new(BufWriter::new(output));

    let cache = Arc::new(FsCache::new(config.cache.dir));
    info!(cache = %cache.root().display(), "Using page cache");
    let fetcher = ContentFetcher::new(Arc::new(HttpTransport::new(&config.http)?), cache);
    let citations = (!cli.nocite).then(|| CiteSeerMiner::new(fetcher.clone(), config.citeseer));
    let harvester = Harvester::new(DblpMiner::new(fetcher, config.dblp), citations);

    info!(
        conference = %cli.name,
        output = %output_path.display(),
        citations = !cli.nocite,
        "Starting harvest"
    );

    let query = ConferenceQuery::new(cli.name.as_str()).window(cli.skip, cli.limit);
    let summary = harvester
        .run(&query, &mut sink)
        .await
        .with_context(|| format!("Harvest of conference '{}' failed", cli.name))?;

    eprintln!(
        "Wrote {} records from {} years to {} ({} years abandoned, {} with citations)",
        summary.records,
        summary.years,
        output_path.display(),
        summary.abandoned_years,
        summary.with_citations
    );
    Ok(())
}
