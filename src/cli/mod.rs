//! CLI command handlers
//!
//! Each subcommand has its own module with handler functions.

pub mod analyze;
pub mod config;
pub mod locate;
pub mod search;
pub mod serve;
pub mod session;
pub mod snapshot;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Farm location explorer with synthesized environmental metrics
#[derive(Parser)]
#[command(name = "agri-space")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Synthesize environmental metrics for a coordinate
    Snapshot(snapshot::SnapshotArgs),

    /// Select a coordinate or region and resolve its place name
    Locate(locate::LocateArgs),

    /// Search places by name
    Search(search::SearchArgs),

    /// Start web server (foreground)
    Serve(serve::ServeArgs),

    /// Manage configuration
    Config(config::ConfigArgs),

    /// Manage the backend session and theme
    Session(session::SessionArgs),

    /// Threshold probability analysis from the backend
    Analyze(analyze::AnalyzeArgs),
}

/// Install the fmt subscriber; `RUST_LOG` overrides `default`
fn init_logging(default: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Run the CLI
pub async fn run() -> crate::error::Result<()> {
    let cli = Cli::parse();

    init_logging(match cli.command {
        Commands::Serve(_) => "info",
        _ => "warn",
    });

    match cli.command {
        Commands::Snapshot(args) => snapshot::run(args),
        Commands::Locate(args) => locate::run(args).await,
        Commands::Search(args) => search::run(args).await,
        Commands::Serve(args) => serve::run(args).await,
        Commands::Config(args) => config::run(args),
        Commands::Session(args) => session::run(args).await,
        Commands::Analyze(args) => analyze::run(args).await,
    }
}

/// Write command output to a file or stdout
fn emit(output: &str, path: Option<&str>) -> crate::error::Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, output)?;
            eprintln!("Output written to {}", path);
        }
        None => println!("{}", output),
    }
    Ok(())
}
