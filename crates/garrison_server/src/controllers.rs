//! Controller construction and the live registry.
//!
//! The factory assembles the dependency bundle for every controller, resolves
//! (and when necessary materializes) configuration files for configurable
//! controllers, and appends the constructed unit to the registry. The
//! registry is append-only and owns every controller until process teardown.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};

use garrison_sdk::manifest::{ControllerDescriptor, ControllerKind, DefaultConfigFn};
use garrison_sdk::{Controller, ControllerDeps, ControllerError, EventManager, Logger, RpcHandle};

use crate::config;
use crate::error::BootstrapError;
use crate::graph::PluginDefinition;

/// Constructed controllers in construction order. Entries are never removed.
#[derive(Default)]
pub struct ControllerRegistry {
    controllers: Vec<Box<dyn Controller>>,
}

impl ControllerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, controller: Box<dyn Controller>) {
        self.controllers.push(controller);
    }

    pub fn len(&self) -> usize {
        self.controllers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controllers.is_empty()
    }

    /// Controller names in construction order.
    pub fn names(&self) -> Vec<&str> {
        self.controllers.iter().map(|c| c.name()).collect()
    }
}

/// Builds controllers from descriptors with injected dependencies.
pub struct ControllerFactory {
    resource_root: PathBuf,
    events: Arc<EventManager>,
}

impl ControllerFactory {
    pub fn new(resource_root: impl Into<PathBuf>, events: Arc<EventManager>) -> Self {
        Self {
            resource_root: resource_root.into(),
            events,
        }
    }

    /// Construct the controller described by `descriptor` for `plugin` and
    /// append it to `registry`.
    pub fn construct(
        &self,
        plugin: &PluginDefinition,
        descriptor: ControllerDescriptor,
        registry: &mut ControllerRegistry,
    ) -> Result<(), BootstrapError> {
        let deps = ControllerDeps {
            logger: Logger::for_plugin(&plugin.name.to_string()),
            events: Arc::clone(&self.events),
            rpc: RpcHandle::new(),
        };

        let controller = match descriptor.kind {
            ControllerKind::Plain(ctor) => {
                ctor(deps).map_err(|source| BootstrapError::Construction {
                    name: descriptor.name.to_string(),
                    source,
                })?
            }
            ControllerKind::Configurable(binding) => {
                let path =
                    config::plugin_config_path(&self.resource_root, &plugin.name, binding.file_name);
                let raw = self.resolve_config(&path, binding.default)?;
                (binding.construct)(deps, &raw).map_err(|source| match source {
                    ControllerError::Config(details) => BootstrapError::Configuration {
                        path: path.clone(),
                        details,
                    },
                    other => BootstrapError::Construction {
                        name: descriptor.name.to_string(),
                        source: other,
                    },
                })?
            }
        };

        debug!(controller = descriptor.name, plugin = %plugin.name, "controller constructed");
        registry.push(controller);
        Ok(())
    }

    /// Read the configuration file at `path`, synthesizing it from the
    /// binding's default serialization first when absent.
    fn resolve_config(
        &self,
        path: &Path,
        default: DefaultConfigFn,
    ) -> Result<String, BootstrapError> {
        if !path.exists() {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).map_err(|e| BootstrapError::Configuration {
                    path: path.to_path_buf(),
                    details: e.to_string(),
                })?;
            }

            let raw = default().map_err(|e| BootstrapError::Configuration {
                path: path.to_path_buf(),
                details: e.to_string(),
            })?;
            fs::write(path, &raw).map_err(|e| BootstrapError::Configuration {
                path: path.to_path_buf(),
                details: e.to_string(),
            })?;
            info!("Created default configuration file: {}", path.display());
        }

        fs::read_to_string(path).map_err(|e| BootstrapError::Configuration {
            path: path.to_path_buf(),
            details: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::PluginName;
    use garrison_sdk::ControllerConfig;
    use serde::{Deserialize, Serialize};
    use tempfile::tempdir;

    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    #[serde(default)]
    struct MotdConfig {
        message: String,
        interval_seconds: u64,
    }

    impl Default for MotdConfig {
        fn default() -> Self {
            Self {
                message: "Welcome!".to_string(),
                interval_seconds: 300,
            }
        }
    }

    impl ControllerConfig for MotdConfig {
        const FILE_NAME: &'static str = "motd";
    }

    struct MotdController {
        config: MotdConfig,
    }

    impl Controller for MotdController {
        fn name(&self) -> &str {
            "motd"
        }
    }

    struct PlainController;

    impl Controller for PlainController {
        fn name(&self) -> &str {
            "plain"
        }
    }

    fn plugin() -> PluginDefinition {
        PluginDefinition {
            name: PluginName::new("acme", "alpha"),
            version: None,
            dependencies: Vec::new(),
            server: None,
        }
    }

    fn motd_descriptor() -> ControllerDescriptor {
        ControllerDescriptor::configurable::<MotdConfig, _>("motd", |_, config| {
            Ok(Box::new(MotdController { config }))
        })
    }

    #[test]
    fn plain_controller_is_appended() {
        let dir = tempdir().unwrap();
        let factory = ControllerFactory::new(dir.path(), Arc::new(EventManager::new()));
        let mut registry = ControllerRegistry::new();

        let descriptor = ControllerDescriptor::plain("plain", |_| Ok(Box::new(PlainController)));
        factory
            .construct(&plugin(), descriptor, &mut registry)
            .unwrap();

        assert_eq!(registry.names(), vec!["plain"]);
    }

    #[test]
    fn missing_config_file_is_synthesized_with_defaults() {
        let dir = tempdir().unwrap();
        let factory = ControllerFactory::new(dir.path(), Arc::new(EventManager::new()));
        let mut registry = ControllerRegistry::new();

        factory
            .construct(&plugin(), motd_descriptor(), &mut registry)
            .unwrap();

        let path = config::plugin_config_path(dir.path(), &plugin().name, "motd");
        assert!(path.exists());

        // Round-trips back to the synthesized default.
        let written = std::fs::read_to_string(&path).unwrap();
        let reparsed: MotdConfig = serde_yml::from_str(&written).unwrap();
        assert_eq!(reparsed, MotdConfig::default());

        // The file-name carrier is metadata, never a serialized property.
        assert!(!written.contains("file_name"));
        assert!(!written.contains("FILE_NAME"));
    }

    #[test]
    fn existing_config_is_used_verbatim() {
        let dir = tempdir().unwrap();
        let name = plugin().name;
        let path = config::plugin_config_path(dir.path(), &name, "motd");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "message: Custom greeting\ninterval_seconds: 60\n").unwrap();

        let factory = ControllerFactory::new(dir.path(), Arc::new(EventManager::new()));
        let mut registry = ControllerRegistry::new();

        let captured: Arc<std::sync::Mutex<Option<MotdConfig>>> =
            Arc::new(std::sync::Mutex::new(None));
        let observer = Arc::clone(&captured);
        let descriptor = ControllerDescriptor::configurable::<MotdConfig, _>("motd", move |_, config| {
            *observer.lock().unwrap() = Some(config.clone());
            Ok(Box::new(MotdController { config }))
        });

        factory.construct(&plugin(), descriptor, &mut registry).unwrap();

        let seen = captured.lock().unwrap().clone().unwrap();
        assert_eq!(seen.message, "Custom greeting");
        assert_eq!(seen.interval_seconds, 60);

        // Not overwritten.
        let on_disk = std::fs::read_to_string(&path).unwrap();
        assert!(on_disk.contains("Custom greeting"));
    }

    #[test]
    fn malformed_config_is_a_configuration_error() {
        let dir = tempdir().unwrap();
        let name = plugin().name;
        let path = config::plugin_config_path(dir.path(), &name, "motd");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "message: [broken").unwrap();

        let factory = ControllerFactory::new(dir.path(), Arc::new(EventManager::new()));
        let mut registry = ControllerRegistry::new();

        let err = factory
            .construct(&plugin(), motd_descriptor(), &mut registry)
            .unwrap_err();
        assert!(matches!(err, BootstrapError::Configuration { .. }));
        assert!(registry.is_empty());
    }

    #[test]
    fn constructor_failure_is_a_construction_error() {
        let dir = tempdir().unwrap();
        let factory = ControllerFactory::new(dir.path(), Arc::new(EventManager::new()));
        let mut registry = ControllerRegistry::new();

        let descriptor = ControllerDescriptor::plain("doomed", |_| {
            Err(ControllerError::Startup("refused to start".to_string()))
        });
        let err = factory
            .construct(&plugin(), descriptor, &mut registry)
            .unwrap_err();

        match err {
            BootstrapError::Construction { name, source } => {
                assert_eq!(name, "doomed");
                assert!(source.to_string().contains("refused to start"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(registry.is_empty());
    }
}
