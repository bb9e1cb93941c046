//! Bootstrap orchestration.
//!
//! A single linear pass with no retries:
//!
//! ```text
//! start → load core config → database controller → load graph
//!       → for each definition: includes → mains → migrations → controllers
//!       → raise serverInitialized → summary
//! ```
//!
//! Any failure at any step unwinds the whole sequence. There is no partial
//! continuation across plugins and no degraded mode: the host either gets a
//! fully initialized controller set or an error it must abort on.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use sqlx::sqlite::SqlitePool;

use garrison_sdk::{
    ControllerDeps, EventManager, Logger, RpcHandle, SERVER_INITIALIZED,
};

use crate::config::{self, CoreConfig, CONFIG_DIR, CORE_CONFIG_FILE, DATABASE_CONFIG_FILE};
use crate::controllers::{ControllerFactory, ControllerRegistry};
use crate::database::{DatabaseConfig, DatabaseController};
use crate::error::BootstrapError;
use crate::graph::{DefinitionGraph, LOCKFILE};
use crate::host::Host;
use crate::migrate;
use crate::modules::ModuleLoader;
use crate::rpc;

/// The process after a successful bootstrap.
pub struct InitializedServer {
    pub config: CoreConfig,
    pub events: Arc<EventManager>,
    pub controllers: ControllerRegistry,
    pub plugins_loaded: usize,
    pool: SqlitePool,
}

impl std::fmt::Debug for InitializedServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InitializedServer")
            .field("config", &self.config)
            .field("plugins_loaded", &self.plugins_loaded)
            .finish_non_exhaustive()
    }
}

impl InitializedServer {
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

/// Orchestrates process initialization against a resource root.
pub struct Bootstrap {
    resource_root: PathBuf,
    host: Arc<dyn Host>,
}

impl Bootstrap {
    pub fn new(resource_root: impl Into<PathBuf>, host: Arc<dyn Host>) -> Self {
        Self {
            resource_root: resource_root.into(),
            host,
        }
    }

    fn config_file(&self, name: &str) -> PathBuf {
        self.resource_root.join(CONFIG_DIR).join(name)
    }

    /// Run the full bootstrap sequence.
    pub async fn run(
        self,
        loader: &mut dyn ModuleLoader,
    ) -> Result<InitializedServer, BootstrapError> {
        let logger = Logger::new("Server");

        // One-time process setup.
        let core: CoreConfig = config::load_or_default(&self.config_file(CORE_CONFIG_FILE))?;
        self.host.set_log_level(&core.log.level);
        self.host.set_map_name(&core.display.map);
        self.host.set_game_type(&core.display.game_type);
        rpc::configure(self.host.as_ref());

        let events = Arc::new(EventManager::new());
        let mut controllers = ControllerRegistry::new();

        // The database controller always comes first: plugins assume a
        // reachable database with an initialized migration history.
        let db_config: DatabaseConfig =
            config::load_or_default(&self.config_file(DATABASE_CONFIG_FILE))?;
        let database = DatabaseController::connect(
            ControllerDeps {
                logger: Logger::new("Database"),
                events: Arc::clone(&events),
                rpc: RpcHandle::new(),
            },
            &db_config,
        )
        .await?;
        let pool = database.pool().clone();
        controllers.push(Box::new(database));

        let graph = DefinitionGraph::load(&self.resource_root.join(LOCKFILE))?;
        let factory = ControllerFactory::new(&self.resource_root, Arc::clone(&events));

        for plugin in &graph.definitions {
            logger.info(&format!("Loading {}", plugin.full_name()));

            let Some(targets) = &plugin.server else {
                continue;
            };

            for module in &targets.include {
                loader.load_include(&plugin.name, module)?;
            }

            for module in &targets.main {
                let manifest = loader.load_main(&plugin.name, module)?;

                for set in &manifest.migrations {
                    migrate::apply_pending(
                        &pool,
                        &plugin.name.to_string(),
                        set,
                        core.migrations.automatic,
                    )
                    .await?;
                }

                for descriptor in manifest.controllers {
                    factory.construct(plugin, descriptor, &mut controllers)?;
                }
            }
        }

        events.raise(SERVER_INITIALIZED);
        logger.info(&format!(
            "{} plugins loaded, {} controller(s) created",
            graph.len(),
            controllers.len()
        ));

        Ok(InitializedServer {
            config: core,
            events,
            controllers,
            plugins_loaded: graph.len(),
            pool,
        })
    }
}

/// Convenience for hosts that do not need a custom loader: bootstrap with
/// the dylib loader rooted at the resource root.
pub async fn run_with_dylib_loader(
    resource_root: &Path,
    host: Arc<dyn Host>,
) -> Result<InitializedServer, BootstrapError> {
    let mut loader = crate::modules::DylibModuleLoader::new(resource_root);
    Bootstrap::new(resource_root, host).run(&mut loader).await
}
