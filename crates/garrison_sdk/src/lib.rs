//! Contract surface for Garrison plugin modules.
//!
//! Plugin crates compile against this crate only. A module declares what it
//! offers through a [`manifest::ModuleManifest`] exported with
//! [`export_module!`]; the server consumes the manifest to run migrations and
//! construct controllers with injected dependencies.
//!
//! ## What a module can contribute
//!
//! * **Controllers** — long-lived units of server behavior, constructed once
//!   at bootstrap with a [`controller::ControllerDeps`] bundle (scoped logger,
//!   shared event bus, fresh RPC handle) and, for configurable controllers,
//!   a typed configuration object loaded from a YAML file.
//! * **Migration sets** — ordered schema steps the server applies (or refuses
//!   to start without, when automatic migrations are disabled).

pub mod controller;
pub mod events;
pub mod logger;
pub mod manifest;
pub mod migrations;
pub mod rpc;
pub mod utils;

pub use controller::{Controller, ControllerConfig, ControllerDeps, ControllerError};
pub use events::{EventManager, SERVER_INITIALIZED};
pub use logger::Logger;
pub use manifest::{ConfigBinding, ControllerDescriptor, ControllerKind, ModuleManifest};
pub use migrations::{MigrationSet, MigrationStep};
pub use rpc::{InboundMessage, OutboundMessage, RpcHandle};
pub use utils::current_timestamp;
