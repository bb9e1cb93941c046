//! Bootstrap error taxonomy.
//!
//! Nothing on the bootstrap path is recovered locally: every variant here is
//! fatal, unwinds the whole sequence, and is surfaced to the host process,
//! which must abort startup rather than run with a partially initialized
//! controller set.

use std::path::PathBuf;

use garrison_sdk::ControllerError;
use thiserror::Error;

/// Failures producing the definition graph from the lockfile.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("failed to read lockfile {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse lockfile {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yml::Error,
    },

    #[error("plugin '{plugin}' depends on '{dependency}' which is not declared in the lockfile")]
    MissingDependency { plugin: String, dependency: String },

    #[error("circular dependency detected involving plugins: {plugins}")]
    CircularDependency { plugins: String },
}

/// Fatal bootstrap failures.
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("definition graph load failed: {0}")]
    GraphLoad(#[from] GraphError),

    #[error("module not found: {}", .path.display())]
    ModuleNotFound { path: PathBuf },

    #[error("failed to load module {}: {details}", .path.display())]
    ModuleLoad { path: PathBuf, details: String },

    #[error("plugin {plugin} has pending migrations but automatic migrations are disabled")]
    MigrationsPending { plugin: String },

    #[error("migration {migration} for plugin {plugin} failed: {source}")]
    MigrationFailed {
        plugin: String,
        migration: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("configuration file {}: {details}", .path.display())]
    Configuration { path: PathBuf, details: String },

    #[error("failed to construct controller {name}: {source}")]
    Construction {
        name: String,
        #[source]
        source: ControllerError,
    },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}
