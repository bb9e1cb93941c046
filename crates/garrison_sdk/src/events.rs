//! In-process event bus shared by the server core and every controller.
//!
//! Handlers are registered by event name and receive the emitted payload as
//! JSON. Registration and emission are synchronous so controllers can
//! subscribe from their constructors during bootstrap; the bus itself is
//! thread-safe for the post-initialization phase where handlers fire from
//! multiple tasks.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

/// Raised exactly once, after every plugin has been processed.
pub const SERVER_INITIALIZED: &str = "serverInitialized";

type EventHandler = Box<dyn Fn(&Value) + Send + Sync>;

/// Publish/subscribe hub keyed by event name.
#[derive(Default)]
pub struct EventManager {
    handlers: RwLock<HashMap<String, Vec<EventHandler>>>,
    events_emitted: AtomicU64,
}

impl EventManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for `event`. Handlers are invoked in registration
    /// order and are never removed.
    pub fn on<F>(&self, event: &str, handler: F)
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        self.handlers
            .write()
            .entry(event.to_string())
            .or_default()
            .push(Box::new(handler));
    }

    /// Emit `event` with a serializable payload.
    pub fn emit<T: Serialize>(&self, event: &str, payload: &T) {
        match serde_json::to_value(payload) {
            Ok(value) => self.dispatch(event, &value),
            Err(e) => warn!(event, "failed to serialize event payload: {}", e),
        }
    }

    /// Emit `event` with no payload.
    pub fn raise(&self, event: &str) {
        self.dispatch(event, &Value::Null);
    }

    fn dispatch(&self, event: &str, value: &Value) {
        self.events_emitted.fetch_add(1, Ordering::Relaxed);
        let handlers = self.handlers.read();
        if let Some(registered) = handlers.get(event) {
            for handler in registered {
                handler(value);
            }
        }
    }

    /// Total number of registered handlers across all events.
    pub fn handler_count(&self) -> usize {
        self.handlers.read().values().map(Vec::len).sum()
    }

    pub fn events_emitted(&self) -> u64 {
        self.events_emitted.load(Ordering::Relaxed)
    }
}
