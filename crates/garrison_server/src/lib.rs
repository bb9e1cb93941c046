//! # Garrison Server Core
//!
//! Bootstraps a plugin-based game-server process. The sequence is a single
//! linear pass owned by [`bootstrap::Bootstrap`]:
//!
//! 1. Load core configuration and push display settings through the
//!    [`host::Host`] natives; pre-register the RPC dispatch table.
//! 2. Construct the built-in database controller (always first).
//! 3. Load the definition graph from the lockfile — every dependency ordered
//!    strictly before its dependents.
//! 4. Per plugin, in order: load include modules, then main modules; per
//!    main module, apply pending migrations (or refuse when automatic
//!    migrations are disabled), then construct the module's controllers with
//!    injected dependencies.
//! 5. Raise `serverInitialized` exactly once and log a summary.
//!
//! Everything on this path is fail-fast: a single plugin's module-load,
//! migration, or configuration failure aborts the whole process startup.
//! Controllers are owned by the registry until process teardown; modules are
//! never unloaded.

pub use bootstrap::{run_with_dylib_loader, Bootstrap, InitializedServer};
pub use config::CoreConfig;
pub use controllers::{ControllerFactory, ControllerRegistry};
pub use database::{DatabaseConfig, DatabaseController};
pub use error::{BootstrapError, GraphError};
pub use graph::{DefinitionGraph, PluginDefinition, PluginName, ServerTargets};
pub use host::Host;
pub use modules::{DylibModuleLoader, ModuleLoader};

pub mod bootstrap;
pub mod config;
pub mod controllers;
pub mod database;
pub mod error;
pub mod graph;
pub mod host;
pub mod migrate;
pub mod modules;
pub mod rpc;
