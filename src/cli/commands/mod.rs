//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod fetch;
mod map;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};

use cunli::config::Settings;

#[derive(Parser)]
#[command(name = "cunli")]
#[command(about = "Harvest Taipower village data and map it to canonical VILLCODEs")]
#[command(version)]
pub struct Cli {
    /// Config file path (default: ./cunli.toml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Directory for raw API snapshots
    #[arg(long, global = true)]
    raw_dir: Option<PathBuf>,

    /// Directory for the harvested and mapped tables
    #[arg(long, global = true)]
    docs_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

/// Options for the crawl stage.
#[derive(Args, Debug, Default)]
struct CrawlArgs {
    /// RangeInfo service root URL
    #[arg(long)]
    api_base: Option<String>,
    /// Pause between requests in milliseconds
    #[arg(long)]
    delay_ms: Option<u64>,
    /// Per-request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,
    /// User agent sent with every request
    #[arg(long)]
    user_agent: Option<String>,
}

impl CrawlArgs {
    fn apply(self, settings: &mut Settings) {
        if let Some(base) = self.api_base {
            settings.api_base = base;
        }
        if let Some(delay) = self.delay_ms {
            settings.request_delay_ms = delay;
        }
        if let Some(timeout) = self.timeout {
            settings.request_timeout = timeout;
        }
        if let Some(ua) = self.user_agent {
            settings.user_agent = Some(ua);
        }
    }
}

/// Options for the reconcile stage.
#[derive(Args, Debug, Default)]
struct MapArgs {
    /// Reference TopoJSON dataset
    #[arg(long)]
    reference: Option<PathBuf>,
    /// Manual override table (TOML)
    #[arg(long)]
    overrides: Option<PathBuf>,
    /// Print the summary as JSON
    #[arg(long)]
    json: bool,
}

impl MapArgs {
    fn apply(&self, settings: &mut Settings) {
        if let Some(ref path) = self.reference {
            settings.reference = path.clone();
        }
        if let Some(ref path) = self.overrides {
            settings.overrides = path.clone();
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Crawl the county → township → village hierarchy into the harvested table
    Fetch {
        #[command(flatten)]
        crawl: CrawlArgs,
    },

    /// Map the harvested table to VILLCODEs using the reference dataset
    Map {
        #[command(flatten)]
        map: MapArgs,
    },

    /// Fetch, then map
    Run {
        #[command(flatten)]
        crawl: CrawlArgs,
        #[command(flatten)]
        map: MapArgs,
    },
}

/// Run the CLI.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut settings = Settings::load(cli.config.as_deref()).context("Failed to load settings")?;
    if let Some(dir) = cli.raw_dir {
        settings.raw_dir = dir;
    }
    if let Some(dir) = cli.docs_dir {
        settings.docs_dir = dir;
    }

    match cli.command {
        Commands::Fetch { crawl: crawl_args } => {
            crawl_args.apply(&mut settings);
            fetch::cmd_fetch(&settings).await
        }
        Commands::Map { map: map_args } => {
            map_args.apply(&mut settings);
            map::cmd_map(&settings, map_args.json)
        }
        Commands::Run {
            crawl: crawl_args,
            map: map_args,
        } => {
            crawl_args.apply(&mut settings);
            map_args.apply(&mut settings);
            fetch::cmd_fetch(&settings).await?;
            map::cmd_map(&settings, map_args.json)
        }
    }
}
