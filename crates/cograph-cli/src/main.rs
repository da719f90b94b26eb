//! cograph CLI - force-directed graph layouts from the command line.
//!
//! `run` lays out a graph file in one go; `stdio` keeps a live simulation
//! running and speaks the JSON command/event protocol over stdin/stdout.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use tracing_subscriber::fmt::format::FmtSpan;

use cograph_layout::LayoutKind;

mod commands;
mod config;

use commands::{config as config_cmd, run, stdio};
use config::Config;

/// cograph CLI - Lay out graphs with a force-directed simulation.
///
/// Event output is newline-delimited JSON on stdout; logs go to stderr.
#[derive(Parser, Debug)]
#[command(
    name = "cograph",
    author,
    version,
    about = "cograph: force-directed graph layout",
    long_about = None
)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Lay out a graph file and write the event stream.
    ///
    /// The file holds an `init` payload: `nodes`, optional `edges` and
    /// optional `config` overrides.
    Run {
        /// Graph file (JSON).
        graph: PathBuf,

        /// Layout strategy: force, radial or grid.
        #[arg(short, long, default_value = "force")]
        layout: LayoutKind,

        /// Layout width (overrides the file and the CLI config).
        #[arg(long)]
        width: Option<f64>,

        /// Layout height (overrides the file and the CLI config).
        #[arg(long)]
        height: Option<f64>,

        /// Stop after this many ticks.
        #[arg(long)]
        max_ticks: Option<u64>,

        /// Write every Nth tick.
        #[arg(short, long)]
        every: Option<usize>,

        /// Only write the final positions.
        #[arg(long)]
        final_only: bool,

        /// Output file (defaults to stdout).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Run a live simulation driven by JSON commands on stdin.
    Stdio {
        /// Milliseconds between ticks; 0 ticks as fast as possible.
        #[arg(long)]
        tick_ms: Option<u64>,
    },

    /// Manage CLI configuration.
    #[command(subcommand)]
    Config(ConfigCommands),
}

/// Configuration subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Show current configuration.
    Show,

    /// Set a configuration value.
    Set {
        /// Configuration key.
        key: String,
        /// Configuration value.
        value: String,
    },

    /// Get a configuration value.
    Get {
        /// Configuration key.
        key: String,
    },

    /// Reset configuration to defaults.
    Reset,

    /// Show path to config file.
    Path,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup tracing based on verbosity
    let level = if cli.quiet {
        Level::ERROR
    } else if cli.verbose {
        Level::DEBUG
    } else {
        Level::WARN // Default to less noise
    };

    // RUST_LOG wins over the flags; stdout carries events
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(level).into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_span_events(FmtSpan::CLOSE)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = Config::load()?;

    match cli.command {
        Commands::Run {
            graph,
            layout,
            width,
            height,
            max_ticks,
            every,
            final_only,
            output,
        } => {
            let options = run::RunOptions {
                layout,
                width,
                height,
                max_ticks,
                every,
                final_only,
                output,
            };
            run::execute(&config, &graph, options)?;
        }

        Commands::Stdio { tick_ms } => {
            let cadence = match tick_ms {
                Some(ms) => config::cadence_from_millis(ms),
                None => config.cadence(),
            };
            stdio::execute(cadence).await?;
        }

        Commands::Config(config_cmd_inner) => {
            let mut config = config;
            match config_cmd_inner {
                ConfigCommands::Show => {
                    config_cmd::show(&config)?;
                }
                ConfigCommands::Set { key, value } => {
                    config_cmd::set(&mut config, &key, &value)?;
                }
                ConfigCommands::Get { key } => {
                    config_cmd::get(&config, &key)?;
                }
                ConfigCommands::Reset => {
                    config_cmd::reset()?;
                }
                ConfigCommands::Path => {
                    if let Some(path) = Config::config_file_path() {
                        println!("{}", path.display());
                    } else {
                        println!("(no config file path available)");
                    }
                }
            }
        }
    }

    Ok(())
}
