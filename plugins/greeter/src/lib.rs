//! Greeter plugin.
//!
//! Welcomes players as they join and keeps a greeting log in the database.
//! Ships one plain controller (session tracking) and one configurable
//! controller (the greeter itself) to exercise both construction paths.

use serde::{Deserialize, Serialize};

use garrison_sdk::{
    export_module, Controller, ControllerConfig, ControllerDeps, Logger, MigrationSet,
    ModuleManifest, OutboundMessage, RpcHandle, SERVER_INITIALIZED,
};
use garrison_sdk::manifest::ControllerDescriptor;

/// Tunables for the greeter, from `config/{vendor}/{project}/greeter.yml`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GreeterConfig {
    pub greeting: String,
    pub announce_joins: bool,
    pub max_greetings_per_minute: u32,
}

impl Default for GreeterConfig {
    fn default() -> Self {
        Self {
            greeting: "Welcome to the server!".to_string(),
            announce_joins: true,
            max_greetings_per_minute: 12,
        }
    }
}

impl ControllerConfig for GreeterConfig {
    const FILE_NAME: &'static str = "greeter";
}

/// Greets joining players according to its configuration.
pub struct GreeterController {
    logger: Logger,
    config: GreeterConfig,
}

impl GreeterController {
    fn new(deps: ControllerDeps, config: GreeterConfig) -> Self {
        let logger = deps.logger;

        let ready_logger = logger.clone();
        let greeting = config.greeting.clone();
        deps.events.on(SERVER_INITIALIZED, move |_| {
            ready_logger.info(&format!("greeter ready: \"{greeting}\""));
        });

        Self { logger, config }
    }

    /// Greeting line for a player, or `None` when announcements are off.
    pub fn greeting_for(&self, player: &str) -> Option<String> {
        if !self.config.announce_joins {
            return None;
        }
        let line = format!("{} {player}", self.config.greeting);
        self.logger.debug(&line);
        Some(line)
    }
}

impl Controller for GreeterController {
    fn name(&self) -> &str {
        "greeter"
    }
}

/// Tracks client sessions and acknowledges handshakes over RPC.
pub struct SessionController {
    logger: Logger,
    rpc: RpcHandle,
}

impl SessionController {
    fn new(deps: ControllerDeps) -> Self {
        let logger = deps.logger;

        let handshake_logger = logger.clone();
        deps.events.on("clientHandshake", move |payload| {
            handshake_logger.debug(&format!("handshake received: {payload}"));
        });

        Self {
            logger,
            rpc: deps.rpc,
        }
    }

    /// Build the acknowledgement sent back to a handshaking client.
    pub fn handshake_ack(&self, client: &str) -> OutboundMessage {
        self.logger
            .trace(&format!("acknowledging handshake from {client}"));
        self.rpc
            .message("clientHandshakeAck")
            .payload(client)
            .into_sent()
    }
}

impl Controller for SessionController {
    fn name(&self) -> &str {
        "session"
    }
}

fn manifest() -> ModuleManifest {
    ModuleManifest::new("greeter")
        .with_migrations(
            MigrationSet::new("greeting_log")
                .step(
                    "0001_create_greeting_log",
                    "CREATE TABLE IF NOT EXISTS greeting_log (
                        id INTEGER PRIMARY KEY AUTOINCREMENT,
                        player TEXT NOT NULL,
                        greeted_at INTEGER NOT NULL
                    )",
                )
                .step(
                    "0002_index_greeting_log_player",
                    "CREATE INDEX IF NOT EXISTS idx_greeting_log_player
                        ON greeting_log (player)",
                ),
        )
        .with_controller(ControllerDescriptor::plain("session", |deps| {
            Ok(Box::new(SessionController::new(deps)))
        }))
        .with_controller(ControllerDescriptor::configurable::<GreeterConfig, _>(
            "greeter",
            |deps, config| Ok(Box::new(GreeterController::new(deps, config))),
        ))
}

export_module!(manifest());
