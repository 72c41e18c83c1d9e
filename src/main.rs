//! Fathom main entry point
//!
//! This is the command-line interface for the Fathom crawler.

use anyhow::{bail, Context};
use clap::Parser;
use fathom::config::{load_config_with_hash, Config};
use fathom::frontier::DepthPriorityQueue;
use fathom::output::{print_statistics, RunSummary};
use fathom::state::DuplicateTracker;
use fathom::storage::{export_results, SqliteDuplicateTracker, SqliteResultStore};
use fathom::url::parse_seed;
use fathom::{CrawlOptions, Engine};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

/// Fathom: a bounded-concurrency web crawler
///
/// Fathom starts from seed URLs, follows links up to a maximum depth, and
/// writes the results extracted from every page to a JSON file.
#[derive(Parser, Debug)]
#[command(name = "fathom")]
#[command(version)]
#[command(about = "A bounded-concurrency web crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Seed URL to crawl (repeatable, added to the configured seeds)
    #[arg(short, long = "url", value_name = "URL")]
    urls: Vec<String>,

    /// Maximum depth to follow links from the seeds
    #[arg(short, long)]
    depth: Option<u32>,

    /// Maximum number of concurrent fetches
    #[arg(short, long)]
    concurrency: Option<usize>,

    /// Global timeout in seconds (0 = unbounded)
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Per-request timeout in seconds
    #[arg(long, value_name = "SECS")]
    req_timeout: Option<u64>,

    /// Delay between dispatches in milliseconds
    #[arg(long, value_name = "MS")]
    delay: Option<u64>,

    /// Path of the JSON results file
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// SQLite database for results and visited URLs
    ///
    /// URLs fetched by earlier runs sharing the database are not fetched again.
    /// The queue itself is not saved, so an interrupted run does not resume
    /// where it stopped; pass --fresh to crawl everything again.
    #[arg(long, value_name = "PATH")]
    database: Option<PathBuf>,

    /// Forget URLs visited by previous runs sharing the database
    #[arg(long, requires = "database")]
    fresh: bool,

    /// Dispatch the shallowest queued URLs first
    #[arg(long)]
    priority: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate settings and show what would be crawled without crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    let options = apply_overrides(config.crawl_options(), &cli);
    options.validate()?;

    let mut seeds = config.seeds.clone();
    seeds.extend(cli.urls.iter().cloned());
    if seeds.is_empty() {
        bail!("No seed URLs given; pass --url or list seeds in the configuration file");
    }
    for seed in &seeds {
        parse_seed(seed).with_context(|| format!("Invalid seed URL {}", seed))?;
    }

    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.output.results_path));
    let database = cli
        .database
        .clone()
        .or_else(|| config.output.database_path.as_ref().map(PathBuf::from));

    if cli.dry_run {
        print_dry_run(&options, &seeds, &output, database.as_deref());
        return Ok(());
    }

    let mut engine = Engine::new(options)?;
    if cli.priority {
        engine = engine.with_queue(Arc::new(DepthPriorityQueue::new()));
    }
    if let Some(database) = &database {
        tracing::info!("Using database: {}", database.display());
        let tracker = SqliteDuplicateTracker::new(database)?;
        if cli.fresh {
            tracing::info!("Starting fresh crawl (forgetting visited URLs)");
            tracker.clear();
        }
        engine = engine
            .with_storage(Arc::new(SqliteResultStore::new(database)?))
            .with_tracker(Arc::new(tracker));
    }

    for seed in &seeds {
        engine.add_url(seed)?;
    }

    let engine = Arc::new(engine);
    {
        let engine = Arc::clone(&engine);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Interrupt received, finishing in-flight requests");
                engine.stop();
            }
        });
    }

    let started = Instant::now();
    let outcome = engine.start().await?;

    let storage = engine.storage();
    let summary = RunSummary {
        outcome,
        stats: engine.stats(),
        stored_targets: storage.len()?,
        elapsed: started.elapsed(),
    };
    if !cli.quiet {
        print_statistics(&summary);
    }

    let written = export_results(storage.as_ref(), &output)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    tracing::info!("Wrote results for {} URLs to {}", written, output.display());

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("fathom=info,warn"),
            1 => EnvFilter::new("fathom=debug,info"),
            2 => EnvFilter::new("fathom=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Applies command-line flags on top of the configured options
fn apply_overrides(mut options: CrawlOptions, cli: &Cli) -> CrawlOptions {
    if let Some(depth) = cli.depth {
        options.max_depth = depth;
    }
    if let Some(concurrency) = cli.concurrency {
        options.concurrency = concurrency;
    }
    if let Some(secs) = cli.timeout {
        options.global_timeout = Duration::from_secs(secs);
    }
    if let Some(secs) = cli.req_timeout {
        options.per_request_timeout = Duration::from_secs(secs);
    }
    if let Some(ms) = cli.delay {
        options.request_delay = Duration::from_millis(ms);
    }
    options
}

/// Handles the --dry-run mode: shows what would be crawled
fn print_dry_run(options: &CrawlOptions, seeds: &[String], output: &Path, database: Option<&Path>) {
    println!("=== Fathom Dry Run ===\n");

    println!("Crawl Options:");
    println!("  Max depth: {}", options.max_depth);
    println!("  Concurrency: {}", options.concurrency);
    if options.global_timeout.is_zero() {
        println!("  Global timeout: unbounded");
    } else {
        println!("  Global timeout: {:?}", options.global_timeout);
    }
    println!("  Request timeout: {:?}", options.per_request_timeout);
    println!("  Request delay: {:?}", options.request_delay);
    println!("  User agent: {}", options.user_agent);

    if !options.headers.is_empty() {
        println!("\nHeaders ({}):", options.headers.len());
        for (name, value) in &options.headers {
            println!("  {}: {}", name, value);
        }
    }

    println!("\nOutput:");
    println!("  Results: {}", output.display());
    match database {
        Some(path) => println!("  Database: {}", path.display()),
        None => println!("  Database: (in memory)"),
    }

    println!("\nSeeds ({}):", seeds.len());
    for seed in seeds {
        println!("  - {}", seed);
    }

    println!("\n✓ Configuration is valid");
}
