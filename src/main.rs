//! llm-catalog - Model catalog builder for LLM provider docs
//!
//! Harvests provider documentation and pricing pages into per-provider
//! NDJSON catalog files.

use anyhow::Result;
use clap::{Parser, Subcommand};
use llm_catalog::cache::CacheStore;
use llm_catalog::catalog::assemble;
use llm_catalog::config::Config;
use llm_catalog::fetch::DocFetcher;
use llm_catalog::output::{render_feature_matrix, render_summary, write_catalog};
use llm_catalog::providers::{registry, Provider};
use std::path::PathBuf;
use std::time::Duration;
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "llm-catalog",
    version,
    about = "Model catalog builder for LLM provider docs",
    long_about = "Scrapes provider documentation and pricing pages, normalizes the results \
                  into catalog records, and writes newline-delimited JSON per provider."
)]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Cache directory for fetched pages
    #[arg(long, global = true, env = "LLMCAT_CACHE_DIR")]
    cache_dir: Option<PathBuf>,

    /// Proxy URL (e.g., socks5://host:port)
    #[arg(long, global = true, env = "LLMCAT_PROXY")]
    proxy: Option<String>,

    /// Delay between requests in milliseconds
    #[arg(long, global = true, env = "LLMCAT_DELAY")]
    delay: Option<u64>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Harvest all providers and write the catalog
    #[command(alias = "b")]
    Build {
        /// Providers to harvest (default: all)
        #[arg(long, value_delimiter = ',')]
        providers: Option<Vec<String>>,

        /// Output directory for the NDJSON files
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Print the provider feature matrix
    Matrix,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new(Level::DEBUG.to_string())
    } else {
        EnvFilter::from_default_env().add_directive(Level::WARN.into())
    };

    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();

    // Load config with layered overrides
    let mut config = Config::load(cli.config.as_deref())?.with_env();

    // Apply CLI overrides
    if let Some(cache_dir) = cli.cache_dir {
        config.cache_dir = Some(cache_dir);
    }
    if let Some(proxy) = cli.proxy {
        config.proxy = Some(proxy);
    }
    if let Some(delay) = cli.delay {
        config.delay_ms = delay;
    }

    match cli.command {
        Commands::Build { providers, out } => {
            if let Some(providers) = providers {
                config.providers = providers;
            }
            if let Some(out) = out {
                config.out_dir = out;
            }

            let cache = CacheStore::open(
                config.cache_root(),
                Duration::from_secs(config.cache_ttl_secs),
            );
            let fetcher = DocFetcher::from_config(&config, cache)?;

            let selected = select_providers(registry(), &config.providers);
            let catalog = assemble(&selected, &fetcher).await;
            write_catalog(&catalog, &config.out_dir)?;
            println!("{}", render_summary(&catalog));
        }

        Commands::Matrix => {
            println!("{}", render_feature_matrix(&registry()));
        }
    }

    Ok(())
}

/// Applies the provider subset filter; an empty filter selects everything.
fn select_providers(all: Vec<Box<dyn Provider>>, filter: &[String]) -> Vec<Box<dyn Provider>> {
    if filter.is_empty() {
        return all;
    }
    all.into_iter()
        .filter(|provider| filter.iter().any(|key| key == provider.profile().key))
        .collect()
}
