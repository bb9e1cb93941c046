//! Module manifests: what a loaded binary module offers the server.
//!
//! Instead of the server inspecting a module's types, every main module
//! exports a single `module_manifest` entry point (generated by
//! [`export_module!`]) returning a [`ModuleManifest`] that enumerates its
//! migration sets and controller descriptors. A controller descriptor is a
//! tagged variant: either a plain constructor, or a configurable constructor
//! bound to its configuration type's file name and default serialization.

use crate::controller::{Controller, ControllerConfig, ControllerDeps, ControllerError};
use crate::migrations::MigrationSet;

/// Constructor for a controller that takes only the base dependencies.
pub type PlainConstructor =
    Box<dyn Fn(ControllerDeps) -> Result<Box<dyn Controller>, ControllerError> + Send + Sync>;

/// Constructor for a configurable controller. Receives the raw YAML of its
/// resolved configuration file; the binding deserializes it into the typed
/// configuration before construction.
pub type ConfigurableConstructor = Box<
    dyn Fn(ControllerDeps, &str) -> Result<Box<dyn Controller>, ControllerError> + Send + Sync,
>;

/// Serializes the configuration type's default value to YAML, used when the
/// controller's configuration file does not exist yet.
pub type DefaultConfigFn = fn() -> Result<String, ControllerError>;

/// The configurable half of [`ControllerKind`].
pub struct ConfigBinding {
    /// File name (no extension) under `config/{vendor}/{project}/`.
    pub file_name: &'static str,
    pub default: DefaultConfigFn,
    pub construct: ConfigurableConstructor,
}

/// How a controller is constructed.
pub enum ControllerKind {
    Plain(PlainConstructor),
    Configurable(ConfigBinding),
}

/// One controller a module offers.
pub struct ControllerDescriptor {
    pub name: &'static str,
    pub kind: ControllerKind,
}

impl ControllerDescriptor {
    /// Descriptor for a controller constructed from base dependencies alone.
    pub fn plain<F>(name: &'static str, ctor: F) -> Self
    where
        F: Fn(ControllerDeps) -> Result<Box<dyn Controller>, ControllerError>
            + Send
            + Sync
            + 'static,
    {
        Self {
            name,
            kind: ControllerKind::Plain(Box::new(ctor)),
        }
    }

    /// Descriptor for a controller requiring a configuration of type `T`.
    ///
    /// The binding captures `T`'s file name and default serialization so the
    /// server can materialize a config file without knowing the type.
    pub fn configurable<T, F>(name: &'static str, ctor: F) -> Self
    where
        T: ControllerConfig,
        F: Fn(ControllerDeps, T) -> Result<Box<dyn Controller>, ControllerError>
            + Send
            + Sync
            + 'static,
    {
        fn default_yaml<T: ControllerConfig>() -> Result<String, ControllerError> {
            serde_yml::to_string(&T::default()).map_err(|e| ControllerError::Config(e.to_string()))
        }

        Self {
            name,
            kind: ControllerKind::Configurable(ConfigBinding {
                file_name: T::FILE_NAME,
                default: default_yaml::<T>,
                construct: Box::new(move |deps, raw| {
                    let config: T = serde_yml::from_str(raw)
                        .map_err(|e| ControllerError::Config(e.to_string()))?;
                    ctor(deps, config)
                }),
            }),
        }
    }

    pub fn is_configurable(&self) -> bool {
        matches!(self.kind, ControllerKind::Configurable(_))
    }
}

/// Everything one main module contributes to the process.
pub struct ModuleManifest {
    /// Module identifier, matching the lockfile's `server.main` entry.
    pub module: &'static str,
    pub migrations: Vec<MigrationSet>,
    pub controllers: Vec<ControllerDescriptor>,
}

impl std::fmt::Debug for ModuleManifest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleManifest")
            .field("module", &self.module)
            .field("migrations", &self.migrations.len())
            .field("controllers", &self.controllers.len())
            .finish()
    }
}

impl ModuleManifest {
    pub fn new(module: &'static str) -> Self {
        Self {
            module,
            migrations: Vec::new(),
            controllers: Vec::new(),
        }
    }

    pub fn with_migrations(mut self, set: MigrationSet) -> Self {
        self.migrations.push(set);
        self
    }

    pub fn with_controller(mut self, descriptor: ControllerDescriptor) -> Self {
        self.controllers.push(descriptor);
        self
    }
}

/// Export a module's manifest through the `module_manifest` C ABI entry
/// point the server resolves after loading the binary.
///
/// The expression is evaluated inside `catch_unwind`: a panicking manifest
/// constructor yields a null pointer instead of unwinding across the FFI
/// boundary, which the server reports as a module-load failure.
///
/// ```ignore
/// fn manifest() -> ModuleManifest {
///     ModuleManifest::new("greeter")
///         .with_controller(ControllerDescriptor::plain("session", |deps| {
///             Ok(Box::new(SessionController::new(deps)))
///         }))
/// }
///
/// garrison_sdk::export_module!(manifest());
/// ```
#[macro_export]
macro_rules! export_module {
    ($build:expr) => {
        #[no_mangle]
        pub unsafe extern "C" fn module_manifest() -> *mut $crate::manifest::ModuleManifest {
            match ::std::panic::catch_unwind(|| {
                ::std::boxed::Box::into_raw(::std::boxed::Box::new($build))
            }) {
                Ok(manifest) => manifest,
                Err(_) => {
                    ::std::eprintln!("module manifest construction panicked");
                    ::std::ptr::null_mut()
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventManager;
    use crate::logger::Logger;
    use crate::rpc::RpcHandle;
    use serde::{Deserialize, Serialize};
    use std::sync::Arc;

    struct NullController;

    impl Controller for NullController {
        fn name(&self) -> &str {
            "null"
        }
    }

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    #[serde(default)]
    struct EchoConfig {
        prefix: String,
        enabled: bool,
    }

    impl Default for EchoConfig {
        fn default() -> Self {
            Self {
                prefix: "echo:".to_string(),
                enabled: true,
            }
        }
    }

    impl ControllerConfig for EchoConfig {
        const FILE_NAME: &'static str = "echo";
    }

    fn deps() -> ControllerDeps {
        ControllerDeps {
            logger: Logger::new("test"),
            events: Arc::new(EventManager::new()),
            rpc: RpcHandle::new(),
        }
    }

    #[test]
    fn plain_descriptor_constructs() {
        let descriptor = ControllerDescriptor::plain("null", |_| Ok(Box::new(NullController)));
        assert!(!descriptor.is_configurable());

        let ControllerKind::Plain(ctor) = descriptor.kind else {
            panic!("expected plain kind");
        };
        let controller = ctor(deps()).unwrap();
        assert_eq!(controller.name(), "null");
    }

    #[test]
    fn configurable_binding_carries_file_name_and_default() {
        let descriptor = ControllerDescriptor::configurable::<EchoConfig, _>("echo", |_, config| {
            assert_eq!(config, EchoConfig::default());
            Ok(Box::new(NullController))
        });

        let ControllerKind::Configurable(binding) = descriptor.kind else {
            panic!("expected configurable kind");
        };
        assert_eq!(binding.file_name, "echo");

        let yaml = (binding.default)().unwrap();
        assert!(yaml.contains("prefix"));
        assert!(yaml.contains("enabled"));

        // The default serialization round-trips through the constructor path.
        let controller = (binding.construct)(deps(), &yaml).unwrap();
        assert_eq!(controller.name(), "null");
    }

    #[test]
    fn configurable_binding_rejects_malformed_yaml() {
        let descriptor =
            ControllerDescriptor::configurable::<EchoConfig, _>("echo", |_, _config| {
                Ok(Box::new(NullController))
            });

        let ControllerKind::Configurable(binding) = descriptor.kind else {
            panic!("expected configurable kind");
        };
        let result = (binding.construct)(deps(), "prefix: [unterminated");
        assert!(matches!(result, Err(ControllerError::Config(_))));
    }

    #[test]
    fn manifest_builder_accumulates() {
        let manifest = ModuleManifest::new("sample")
            .with_migrations(MigrationSet::new("sample").step("0001_init", "SELECT 1"))
            .with_controller(ControllerDescriptor::plain("null", |_| {
                Ok(Box::new(NullController))
            }));

        assert_eq!(manifest.module, "sample");
        assert_eq!(manifest.migrations.len(), 1);
        assert_eq!(manifest.controllers.len(), 1);
    }
}
