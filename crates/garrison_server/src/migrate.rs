//! Migration runner.
//!
//! Tracks applied migrations per plugin in the `plugin_migration` table,
//! diffs a module's declared [`MigrationSet`] against that history, and
//! applies pending steps inside a per-set transaction. Running against a
//! stale schema is unsafe, so pending migrations with automatic migrations
//! disabled abort the bootstrap.

use std::collections::HashSet;

use sqlx::sqlite::SqlitePool;
use sqlx::Row;
use tracing::{debug, info};

use garrison_sdk::migrations::{MigrationSet, MigrationStep};
use garrison_sdk::utils::current_timestamp;

use crate::error::BootstrapError;

const HISTORY_TABLE_DDL: &str = "CREATE TABLE IF NOT EXISTS plugin_migration (
    plugin TEXT NOT NULL,
    migration TEXT NOT NULL,
    applied_at INTEGER NOT NULL,
    PRIMARY KEY (plugin, migration)
)";

/// Create the migration history table if it does not exist.
pub async fn ensure_history_table(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(HISTORY_TABLE_DDL).execute(pool).await?;
    Ok(())
}

/// Migration ids already applied for `plugin`.
pub async fn applied_migrations(
    pool: &SqlitePool,
    plugin: &str,
) -> Result<Vec<String>, sqlx::Error> {
    let rows =
        sqlx::query("SELECT migration FROM plugin_migration WHERE plugin = ? ORDER BY migration")
            .bind(plugin)
            .fetch_all(pool)
            .await?;

    Ok(rows
        .iter()
        .map(|row| row.get::<String, _>("migration"))
        .collect())
}

/// Apply the set's pending steps for `plugin`.
///
/// No pending steps is a no-op regardless of `automatic`. Pending steps with
/// `automatic` disabled fail with [`BootstrapError::MigrationsPending`];
/// otherwise every pending step runs in declaration order inside a single
/// transaction and is recorded in the history. Returns the ids that were
/// newly applied.
pub async fn apply_pending(
    pool: &SqlitePool,
    plugin: &str,
    set: &MigrationSet,
    automatic: bool,
) -> Result<Vec<String>, BootstrapError> {
    if set.steps.is_empty() {
        return Ok(Vec::new());
    }

    let applied = applied_migrations(pool, plugin).await?;
    let applied: HashSet<&str> = applied.iter().map(String::as_str).collect();

    let pending: Vec<&MigrationStep> = set
        .steps
        .iter()
        .filter(|step| !applied.contains(step.id))
        .collect();

    if pending.is_empty() {
        debug!(plugin, target = set.target, "no pending migrations");
        return Ok(Vec::new());
    }

    if !automatic {
        return Err(BootstrapError::MigrationsPending {
            plugin: plugin.to_string(),
        });
    }

    info!(
        plugin,
        target = set.target,
        count = pending.len(),
        "running pending migrations"
    );

    let mut tx = pool.begin().await.map_err(BootstrapError::Database)?;
    let now = current_timestamp() as i64;
    let mut newly_applied = Vec::new();

    for step in pending {
        debug!(plugin, migration = step.id, "executing migration");

        // raw_sql rather than query(): a step may contain multiple
        // statements, and prepared statements execute only one.
        sqlx::raw_sql(step.sql)
            .execute(&mut *tx)
            .await
            .map_err(|source| BootstrapError::MigrationFailed {
                plugin: plugin.to_string(),
                migration: step.id.to_string(),
                source,
            })?;

        sqlx::query("INSERT INTO plugin_migration (plugin, migration, applied_at) VALUES (?, ?, ?)")
            .bind(plugin)
            .bind(step.id)
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(BootstrapError::Database)?;

        newly_applied.push(step.id.to_string());
    }

    tx.commit().await.map_err(BootstrapError::Database)?;
    Ok(newly_applied)
}
