use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use policy_tracker::config::{Config, LoggingConfig};
use policy_tracker::crawler::SourceKind;

mod commands;

use commands::Overrides;

#[derive(Parser)]
#[command(
    name = "policy-tracker",
    version,
    about = "Incremental crawler for Control Yuan and NHRC announcements",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json); defaults to the configured format
    #[arg(long, global = true)]
    log_format: Option<String>,

    /// TOML configuration file; environment variables are used when absent
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Crawl once now and exit
    Crawl {
        /// Source site (control-yuan, nhrc)
        #[arg(short, long)]
        source: Option<SourceKind>,

        /// Number of listing pages to scan
        #[arg(short, long)]
        pages: Option<u32>,

        /// Print the run summary as JSON
        #[arg(long, default_value = "false")]
        json: bool,
    },

    /// Crawl now, then again every few days until interrupted
    Schedule {
        /// Source site (control-yuan, nhrc)
        #[arg(short, long)]
        source: Option<SourceKind>,

        /// Number of listing pages to scan per run
        #[arg(short, long)]
        pages: Option<u32>,

        /// Days between runs
        #[arg(short, long)]
        interval_days: Option<u32>,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref())?;

    // Initialize tracing/logging
    setup_tracing(&config.logging, cli.log_format.as_deref(), cli.verbose)?;
    policy_tracker::i18n::init_from_env();

    tracing::info!(
        source = %config.source.kind,
        backend = %config.database.backend,
        "policy-tracker starting"
    );

    let code = match cli.command {
        Commands::Crawl {
            source,
            pages,
            json,
        } => {
            Overrides {
                source,
                pages,
                interval_days: None,
            }
            .apply(&mut config);
            tracing::info!(pages = config.schedule.page_count, json, "Starting crawl command");
            commands::crawl(config, json).await?
        }

        Commands::Schedule {
            source,
            pages,
            interval_days,
        } => {
            Overrides {
                source,
                pages,
                interval_days,
            }
            .apply(&mut config);
            tracing::info!(
                pages = config.schedule.page_count,
                interval_days = config.schedule.interval_days,
                "Starting schedule command"
            );
            commands::schedule(config).await?
        }
    };

    Ok(code)
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::from_file(path),
        None => Config::from_env(),
    }
}

fn setup_tracing(logging: &LoggingConfig, format: Option<&str>, verbose: bool) -> Result<()> {
    let env_filter = if verbose {
        tracing_subscriber::EnvFilter::new("policy_tracker=debug,info")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            tracing_subscriber::EnvFilter::new(format!("policy_tracker={},warn", logging.level))
        })
    };

    // Logs go to stderr; stdout carries the crawl's log lines and summary.
    match format.unwrap_or(&logging.format) {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .try_init()?;
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .try_init()?;
        }
    }

    Ok(())
}
