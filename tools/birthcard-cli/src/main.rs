//! Birthcard CLI — Compose birth announcements and attach them to records.
//!
//! Usage:
//!   birthcard render [OPTIONS]            Compose and save an announcement locally
//!   birthcard upload --record <ID> [...]  Compose, upload, and attach to a record
//!   birthcard records                     List records from storage
//!   birthcard init-config                 Write a default config file
//!   birthcard layout                      Print the default layer layout

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use birthcard_common::config::AppConfig;

mod commands;

use commands::compose::ComposeArgs;

#[derive(Parser)]
#[command(
    name = "birthcard",
    about = "Birth announcement compositing and upload",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (defaults to the standard location)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compose an announcement and save it as a PNG
    Render {
        #[command(flatten)]
        compose: ComposeArgs,

        /// Output directory (defaults to the configured export directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Compose an announcement, upload it, and attach it to a record
    Upload {
        /// Record id as listed by `birthcard records`
        #[arg(long)]
        record: usize,

        #[command(flatten)]
        compose: ComposeArgs,

        /// Also keep a local copy in this directory
        #[arg(long)]
        save_local: Option<PathBuf>,
    },

    /// List records from storage
    Records,

    /// Write a default config file
    InitConfig {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the default layer layout as JSON
    Layout,
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<AppConfig> {
    match path {
        Some(path) => AppConfig::load_from(path)
            .map_err(|e| anyhow::anyhow!("Failed to load config {}: {e}", path.display())),
        None => Ok(AppConfig::load()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Commands::InitConfig { force } = cli.command {
        birthcard_common::logging::init_default_logging();
        return commands::init::run(cli.config, force);
    }

    let config = load_config(cli.config.as_ref())?;

    // Initialize logging
    let mut logging = config.logging.clone();
    if cli.verbose {
        logging.level = "debug".to_string();
    }
    birthcard_common::logging::init_logging(&logging);

    match cli.command {
        Commands::Render { compose, output } => commands::render::run(&config, compose, output).await,
        Commands::Upload {
            record,
            compose,
            save_local,
        } => commands::upload::run(&config, record, compose, save_local).await,
        Commands::Records => commands::records::run(&config).await,
        Commands::Layout => commands::layout::run(),
        Commands::InitConfig { .. } => Ok(()),
    }
}
