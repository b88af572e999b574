//! Learning memory CLI
//!
//! Browse experience clusters and manage validated values over a JSON
//! snapshot store.
//!
//! # Commands
//!
//! - `import <file>`: load experiences (JSON lines) into axis collections
//! - `count`: experiences per axis
//! - `clusters <axis>`: HDBSCAN clusters for one axis
//! - `cluster-all`: clusters for every axis with data
//! - `members <cluster_id>`: experiences in one cluster
//! - `validate <cluster_id> <text>`: check a value candidate
//! - `store-value <cluster_id> <text>`: validate and store a value
//! - `list-values`: stored values, newest first
//!
//! Exit code 1 on error, 2 on a corrupt snapshot or config.

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

mod commands;
mod error;

/// Learning memory - experience clustering and value validation
#[derive(Parser)]
#[command(name = "learning-memory")]
#[command(version)]
#[command(about = "Cluster experiences and validate values against cluster centroids")]
#[command(propagate_version = true)]
struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// TOML config file
    #[arg(long, global = true, env = "LEARNING_CONFIG")]
    config: Option<PathBuf>,

    /// Snapshot file backing the vector store
    #[arg(long, global = true, env = "LEARNING_STORE", default_value = "learning-memory.json")]
    store: PathBuf,

    #[command(subcommand)]
    command: commands::Commands,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .init();

    let exit_code =
        commands::handle_command(cli.command, cli.config.as_deref(), &cli.store).await;

    std::process::exit(exit_code);
}
