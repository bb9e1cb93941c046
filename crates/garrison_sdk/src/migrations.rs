//! Migration descriptors declared by plugin modules.
//!
//! A module ships one [`MigrationSet`] per entity model it persists. The
//! server diffs the set's ordered steps against its migration history and
//! applies what is missing — or refuses to start when automatic migrations
//! are disabled. The SQL itself is opaque to this crate.

/// One schema change, identified by a stable id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationStep {
    /// Stable identifier recorded in the migration history. Convention:
    /// zero-padded sequence plus a short description, e.g.
    /// `0001_create_greeting_log`.
    pub id: &'static str,
    /// SQL to execute. May contain multiple statements.
    pub sql: &'static str,
}

/// Ordered schema steps for one persisted entity model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationSet {
    /// The entity model this set maintains; used for logging only.
    pub target: &'static str,
    pub steps: Vec<MigrationStep>,
}

impl MigrationSet {
    pub fn new(target: &'static str) -> Self {
        Self {
            target,
            steps: Vec::new(),
        }
    }

    pub fn step(mut self, id: &'static str, sql: &'static str) -> Self {
        self.steps.push(MigrationStep { id, sql });
        self
    }
}
