//! Host native implementation for the standalone binary.

use parking_lot::RwLock;
use tracing::{debug, info, warn};
use tracing_subscriber::{reload, EnvFilter, Registry};

use garrison_server::Host;

/// Handle for swapping the active log filter at runtime.
pub type FilterHandle = reload::Handle<EnvFilter, Registry>;

/// [`Host`] backed by the process itself: display settings are recorded and
/// logged, the log level reloads the tracing filter, RPC registrations are
/// acknowledged for the transport layer to pick up.
pub struct RuntimeHost {
    filter: FilterHandle,
    map_name: RwLock<Option<String>>,
    game_type: RwLock<Option<String>>,
}

impl RuntimeHost {
    pub fn new(filter: FilterHandle) -> Self {
        Self {
            filter,
            map_name: RwLock::new(None),
            game_type: RwLock::new(None),
        }
    }

    pub fn map_name(&self) -> Option<String> {
        self.map_name.read().clone()
    }

    pub fn game_type(&self) -> Option<String> {
        self.game_type.read().clone()
    }
}

impl Host for RuntimeHost {
    fn set_log_level(&self, level: &str) {
        match EnvFilter::try_new(level) {
            Ok(new_filter) => {
                if let Err(e) = self.filter.reload(new_filter) {
                    warn!("failed to apply log level '{}': {}", level, e);
                } else {
                    info!(log_level = level, "log level applied from core configuration");
                }
            }
            Err(e) => warn!("invalid log level '{}': {}", level, e),
        }
    }

    fn set_map_name(&self, map: &str) {
        *self.map_name.write() = Some(map.to_string());
        info!(map, "map name set");
    }

    fn set_game_type(&self, game_type: &str) {
        *self.game_type.write() = Some(game_type.to_string());
        info!(game_type, "game type set");
    }

    fn register_rpc(&self, event: &str) {
        debug!(event, "rpc handler registered");
    }
}
