//! Built-in database controller.
//!
//! Constructed before any plugin is processed: plugins assume a reachable
//! database with an initialized migration history. Owns the connection pool
//! for the life of the process; the bootstrap keeps a pool handle of its own
//! for the migration runner.

use serde::{Deserialize, Serialize};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

use garrison_sdk::{Controller, ControllerDeps, Logger};

use crate::error::BootstrapError;
use crate::migrate;

fn default_url() -> String {
    "sqlite://garrison.db?mode=rwc".to_string()
}

fn default_max_connections() -> u32 {
    5
}

/// Settings from `config/database.yml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_url")]
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            max_connections: default_max_connections(),
        }
    }
}

pub struct DatabaseController {
    logger: Logger,
    pool: SqlitePool,
}

impl DatabaseController {
    /// Connect the pool and initialize the migration history table.
    pub async fn connect(
        deps: ControllerDeps,
        config: &DatabaseConfig,
    ) -> Result<Self, BootstrapError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.url)
            .await?;

        migrate::ensure_history_table(&pool).await?;

        deps.events.raise("databaseConnected");

        let controller = Self {
            logger: deps.logger,
            pool,
        };
        controller
            .logger
            .info(&format!("database connection established ({})", config.url));
        Ok(controller)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl Controller for DatabaseController {
    fn name(&self) -> &str {
        "database"
    }
}
