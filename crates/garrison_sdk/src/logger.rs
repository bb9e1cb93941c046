//! Scoped logging facade handed to controllers.
//!
//! Controllers never talk to the logging backend directly; they receive a
//! [`Logger`] carrying a scope string (`Plugin|{vendor/project}` for plugin
//! controllers, `Database` for the built-in one) and everything funnels
//! through `tracing`.

use std::sync::Arc;

use tracing::{debug, error, info, trace, warn};

/// A cheaply cloneable logger bound to a scope.
#[derive(Debug, Clone)]
pub struct Logger {
    scope: Arc<str>,
}

impl Logger {
    pub fn new(scope: impl AsRef<str>) -> Self {
        Self {
            scope: Arc::from(scope.as_ref()),
        }
    }

    /// Logger scoped to a plugin, named the way the server names plugins.
    pub fn for_plugin(name: &str) -> Self {
        Self::new(format!("Plugin|{name}"))
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    pub fn trace(&self, message: &str) {
        trace!(scope = %self.scope, "{}", message);
    }

    pub fn debug(&self, message: &str) {
        debug!(scope = %self.scope, "{}", message);
    }

    pub fn info(&self, message: &str) {
        info!(scope = %self.scope, "{}", message);
    }

    pub fn warn(&self, message: &str) {
        warn!(scope = %self.scope, "{}", message);
    }

    pub fn error(&self, message: &str) {
        error!(scope = %self.scope, "{}", message);
    }
}
