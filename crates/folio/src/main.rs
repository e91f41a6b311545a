//! Folio CLI - compile-ahead documentation site pipeline.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "folio")]
#[command(about = "Compile-ahead documentation site pipeline")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to folio.toml config file
    #[arg(short, long, default_value = "folio.toml")]
    config: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile all documents and export the site
    Build {
        /// Output directory (defaults to config or "dist")
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Compile and evaluate every document without writing output
    Check,

    /// Serve an exported site
    Serve {
        /// Port to listen on (defaults to config or 3001)
        #[arg(short, long)]
        port: Option<u16>,

        /// Directory to serve (defaults to config output)
        #[arg(short, long)]
        dir: Option<PathBuf>,

        /// Do not open browser
        #[arg(long)]
        no_open: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt().with_env_filter(filter).with_target(false).init();

    let config = config::load(&cli.config)?;

    match cli.command {
        Commands::Build { output } => {
            commands::build::run(&config, output).await?;
        }
        Commands::Check => {
            commands::check::run(&config).await?;
        }
        Commands::Serve { port, dir, no_open } => {
            commands::serve::run(&config, port, dir, !no_open).await?;
        }
    }

    Ok(())
}
