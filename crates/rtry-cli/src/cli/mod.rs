//! CLI for exploring retry plans.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use rtry_core::{config, logging};
use std::path::PathBuf;

use commands::{run_completions, run_config, run_man, run_schedule, run_simulate};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "rtry")]
#[command(about = "rtry: composable retry policies, simulated", long_about = None)]
pub struct Cli {
    /// Read configuration from this file instead of ~/.config/rtry/config.toml.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Run a scripted operation through the configured retry plan.
    Simulate {
        /// Comma-separated attempt outcomes: ok, pending, not-requested, timeout,
        /// network, bad-url, bad-body, custom:<msg>, or an HTTP status code.
        /// The last outcome repeats once the list is exhausted.
        outcomes: String,
        /// Use the resumable engine and run a side effect before every retry.
        #[arg(long)]
        resumable: bool,
    },

    /// Print a jittered exponential backoff schedule.
    Schedule {
        #[arg(long, default_value = "500", value_name = "MS")]
        interval_ms: u64,
        #[arg(long, default_value = "3000", value_name = "MS")]
        max_interval_ms: u64,
        /// Number of delays to print.
        #[arg(long, default_value = "10", value_name = "N")]
        count: usize,
        /// Jitter seed (defaults to the configured seed).
        #[arg(long)]
        seed: Option<u64>,
        /// Print the delays in milliseconds as a JSON array.
        #[arg(long)]
        json: bool,
    },

    /// Print the effective configuration as TOML.
    Config,

    /// Print shell completions.
    Completions {
        shell: Shell,
    },

    /// Print a man page.
    Man,
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let loaded = match &cli.config {
            Some(path) => config::LoadedConfig {
                config: config::load_from(path)?,
                path: path.clone(),
                created: false,
            },
            None => config::load_or_init()?,
        };
        let cfg = loaded.config;
        if let Err(e) = logging::init_logging(cfg.log_filter.as_deref()) {
            eprintln!("rtry: logging disabled: {:#}", e);
        }
        if loaded.created {
            tracing::info!("created default config at {}", loaded.path.display());
        }
        tracing::debug!("loaded config from {}: {:?}", loaded.path.display(), cfg);

        match cli.command {
            CliCommand::Simulate {
                outcomes,
                resumable,
            } => run_simulate(&cfg, &outcomes, resumable).await?,
            CliCommand::Schedule {
                interval_ms,
                max_interval_ms,
                count,
                seed,
                json,
            } => {
                let seed = seed.or(cfg.retry.jitter_seed);
                run_schedule(interval_ms, max_interval_ms, count, seed, json)?;
            }
            CliCommand::Config => run_config(&cfg)?,
            CliCommand::Completions { shell } => run_completions(shell),
            CliCommand::Man => run_man()?,
        }

        Ok(())
    }
}
