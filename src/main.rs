//! NES Touchpad - command-line driver for the on-screen controller mapper

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use nes_touchpad::cli::{self, EngineKind};

/// NES Touchpad - map touch and mouse input onto NES controller buttons
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file (pad layout)
    #[arg(short, long, env = "PAD_CONFIG", default_value = "pad.yaml")]
    config: String,

    /// Log level (error, warn, info, debug, trace)
    #[arg(short, long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replay a YAML input script against the layout
    Replay {
        /// Path to the input script
        #[arg(short, long)]
        script: String,

        /// Engine receiving button calls
        #[arg(short, long, value_enum, default_value_t = EngineKind::Recording)]
        engine: EngineKind,

        /// Replay again whenever the config file changes
        #[arg(long)]
        watch: bool,
    },

    /// Type pointer events interactively
    Repl {
        /// Engine receiving button calls
        #[arg(short, long, value_enum, default_value_t = EngineKind::Console)]
        engine: EngineKind,
    },

    /// Print the configured button regions
    Layout {
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let args = Args::parse();

    init_logging(&args.log_level)?;

    info!("Configuration file: {}", args.config);

    match args.command {
        Command::Replay { script, engine, watch } => {
            cli::run_replay(&args.config, &script, engine, watch).await?
        }
        Command::Repl { engine } => cli::run_repl(&args.config, engine).await?,
        Command::Layout { json } => cli::print_layout(&args.config, json).await?,
    }

    Ok(())
}

fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_thread_names(false),
        )
        .init();

    Ok(())
}
