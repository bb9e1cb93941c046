//! Host runtime boundary.
//!
//! The game runtime that embeds the bootstrap exposes a handful of native
//! calls — display settings, log level, and the event surface the RPC
//! dispatch table registers against. The bootstrap only ever talks to this
//! trait; the binary supplies the real implementation.

pub trait Host: Send + Sync {
    /// Apply the configured log level to the process.
    fn set_log_level(&self, level: &str);

    /// Native: set the map name shown to clients.
    fn set_map_name(&self, map: &str);

    /// Native: set the game type shown to clients.
    fn set_game_type(&self, game_type: &str);

    /// Register an RPC event handler with the host's event system.
    fn register_rpc(&self, event: &str);
}
