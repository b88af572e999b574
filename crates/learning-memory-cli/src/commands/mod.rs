//! CLI command handlers
//!
//! # Modules
//!
//! - `import`: load experiences from JSON lines into axis collections
//! - `clusters`: cluster one axis, all axes, or list cluster members
//! - `values`: validate, store and list values
//!
//! Every handler prints pretty JSON on stdout. Commands that write to the
//! store save the snapshot before returning.

mod clusters;
mod import;
mod values;

pub use clusters::{ClusterAllArgs, ClustersArgs, CountArgs, MembersArgs};
pub use import::ImportArgs;
pub use values::{ListValuesArgs, StoreValueArgs, ValidateArgs};

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Subcommand;
use serde::Serialize;
use tracing::{debug, error};

use learning_memory_core::config::LearningConfig;
use learning_memory_core::stubs::{InMemoryVectorStore, StubEmbeddingService};
use learning_memory_core::types::Axis;
use learning_memory_core::values::ValueStore;

use crate::error::{CliError, CliExitCode};

/// Top-level subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Import experiences from a JSON-lines file (`-` for stdin)
    Import(ImportArgs),
    /// Count stored experiences per axis
    Count(CountArgs),
    /// Cluster the experiences on one axis
    Clusters(ClustersArgs),
    /// Cluster every axis that has data
    ClusterAll(ClusterAllArgs),
    /// List the experiences in one cluster
    Members(MembersArgs),
    /// Check a value candidate against a cluster without storing it
    Validate(ValidateArgs),
    /// Validate and store a value
    StoreValue(StoreValueArgs),
    /// List stored values, newest first
    ListValues(ListValuesArgs),
}

/// Loaded configuration plus the snapshot-backed store.
pub struct Context {
    pub config: LearningConfig,
    pub store: Arc<InMemoryVectorStore>,
    pub embeddings: Arc<StubEmbeddingService>,
    store_path: PathBuf,
}

impl Context {
    /// Load config (file, then `LEARNING_*` env overrides) and open the store.
    pub fn load(config_path: Option<&Path>, store_path: &Path) -> Result<Self, CliError> {
        let config = match config_path {
            Some(path) => LearningConfig::from_file(path)?,
            None => LearningConfig::default(),
        }
        .with_env_overrides();
        config.validate()?;

        let store = InMemoryVectorStore::open(store_path)?;
        let embeddings = StubEmbeddingService::new(config.embedding.dimension);

        debug!(
            store = %store_path.display(),
            collections = store.collection_names().len(),
            "Context loaded"
        );

        Ok(Self {
            config,
            store: Arc::new(store),
            embeddings: Arc::new(embeddings),
            store_path: store_path.to_path_buf(),
        })
    }

    /// Value store over this context's collaborators.
    pub fn value_store(&self) -> Result<ValueStore, CliError> {
        Ok(ValueStore::from_config(
            self.store.clone(),
            self.embeddings.clone(),
            &self.config,
        )?)
    }

    /// Write the store back to its snapshot file.
    pub fn save(&self) -> Result<(), CliError> {
        self.store.save_snapshot(&self.store_path)?;
        Ok(())
    }
}

/// Handle command dispatch. Returns the process exit code.
pub async fn handle_command(
    cmd: Commands,
    config_path: Option<&Path>,
    store_path: &Path,
) -> i32 {
    let result = match Context::load(config_path, store_path) {
        Ok(ctx) => dispatch(&ctx, cmd).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => CliExitCode::Success.into(),
        Err(e) => {
            let code = CliExitCode::from(&e);
            error!(error = %e, exit_code = ?code, "Command failed");
            eprintln!("error: {}", e);
            code.into()
        }
    }
}

async fn dispatch(ctx: &Context, cmd: Commands) -> Result<(), CliError> {
    match cmd {
        Commands::Import(args) => import::import_command(ctx, args).await,
        Commands::Count(args) => clusters::count_command(ctx, args).await,
        Commands::Clusters(args) => clusters::clusters_command(ctx, args).await,
        Commands::ClusterAll(args) => clusters::cluster_all_command(ctx, args).await,
        Commands::Members(args) => clusters::members_command(ctx, args).await,
        Commands::Validate(args) => values::validate_command(ctx, args).await,
        Commands::StoreValue(args) => values::store_value_command(ctx, args).await,
        Commands::ListValues(args) => values::list_values_command(ctx, args).await,
    }
}

/// clap value parser for axis names.
pub(crate) fn parse_axis(s: &str) -> Result<Axis, String> {
    s.parse::<Axis>().map_err(|e| e.to_string())
}

/// Render `value` as pretty JSON.
pub(crate) fn render_json<T: Serialize + ?Sized>(value: &T) -> Result<String, CliError> {
    serde_json::to_string_pretty(value).map_err(|e| CliError::Output(e.to_string()))
}

pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    println!("{}", render_json(value)?);
    Ok(())
}
