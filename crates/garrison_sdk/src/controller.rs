//! Controller contracts.
//!
//! A controller is a long-lived unit of server behavior, constructed exactly
//! once at bootstrap and owned by the server's registry until process
//! teardown. Construction always injects a [`ControllerDeps`] bundle;
//! configurable controllers additionally receive a typed configuration
//! object resolved from their YAML file.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use crate::events::EventManager;
use crate::logger::Logger;
use crate::rpc::RpcHandle;

/// A constructed, live controller.
pub trait Controller: Send + Sync {
    fn name(&self) -> &str;
}

/// Dependencies injected into every controller constructor.
pub struct ControllerDeps {
    /// Logger scoped to the owning plugin.
    pub logger: Logger,
    /// Event bus shared across the whole process.
    pub events: Arc<EventManager>,
    /// Fresh RPC handle, unique to this controller.
    pub rpc: RpcHandle,
}

/// Typed, file-backed configuration for a configurable controller.
///
/// `FILE_NAME` identifies the on-disk file (without extension) under
/// `config/{vendor}/{project}/`. It is an associated constant rather than a
/// field, so it is metadata by construction and never serialized alongside
/// the tunable settings.
pub trait ControllerConfig:
    Serialize + DeserializeOwned + Default + Send + Sync + 'static
{
    const FILE_NAME: &'static str;
}

/// Failure reported by a controller constructor.
#[derive(Debug, Error)]
pub enum ControllerError {
    /// The resolved configuration could not be deserialized or was rejected.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The controller could not be brought up.
    #[error("{0}")]
    Startup(String),
}
