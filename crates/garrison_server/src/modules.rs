//! Binary module loading.
//!
//! Modules live under `plugins/{vendor}/{project}/` at the resource root.
//! Include modules are loaded for their side effects only; main modules
//! additionally expose a `module_manifest` entry point describing their
//! controllers and migrations. Loaded libraries are retained append-only for
//! the life of the process — manifest constructors point into plugin code,
//! so unloading is never safe and never attempted.

use std::path::{Path, PathBuf};

use libloading::{Library, Symbol};
use tracing::debug;

use garrison_sdk::manifest::ModuleManifest;

use crate::error::BootstrapError;
use crate::graph::PluginName;

/// Directory under the resource root holding plugin binaries.
pub const PLUGIN_DIR: &str = "plugins";

/// Platform file name of a dynamic library module.
fn module_filename(module: &str) -> String {
    if cfg!(target_os = "windows") {
        format!("{module}.dll")
    } else if cfg!(target_os = "macos") {
        format!("lib{module}.dylib")
    } else {
        format!("lib{module}.so")
    }
}

/// Resolved path of an include module binary.
pub fn include_path(root: &Path, plugin: &PluginName, module: &str) -> PathBuf {
    root.join(PLUGIN_DIR)
        .join(&plugin.vendor)
        .join(&plugin.project)
        .join(module_filename(module))
}

/// Resolved path of a main module binary. Main modules carry a `.main`
/// marker in their file name to distinguish them from includes.
pub fn main_path(root: &Path, plugin: &PluginName, module: &str) -> PathBuf {
    root.join(PLUGIN_DIR)
        .join(&plugin.vendor)
        .join(&plugin.project)
        .join(module_filename(&format!("{module}.main")))
}

/// Loads plugin modules and owns every loaded library handle.
///
/// There is exactly one loader per bootstrap, threaded through the
/// orchestrator — module state is never ambient process state.
pub trait ModuleLoader: Send {
    /// Load an include module for its side effects.
    fn load_include(&mut self, plugin: &PluginName, module: &str) -> Result<(), BootstrapError>;

    /// Load a main module and return its manifest.
    fn load_main(
        &mut self,
        plugin: &PluginName,
        module: &str,
    ) -> Result<ModuleManifest, BootstrapError>;
}

type ManifestEntry = unsafe extern "C" fn() -> *mut ModuleManifest;

/// [`ModuleLoader`] backed by `libloading`.
pub struct DylibModuleLoader {
    root: PathBuf,
    libraries: Vec<Library>,
}

impl DylibModuleLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            libraries: Vec::new(),
        }
    }

    /// Number of libraries loaded so far.
    pub fn loaded_count(&self) -> usize {
        self.libraries.len()
    }
}

impl ModuleLoader for DylibModuleLoader {
    fn load_include(&mut self, plugin: &PluginName, module: &str) -> Result<(), BootstrapError> {
        let path = include_path(&self.root, plugin, module);
        if !path.exists() {
            return Err(BootstrapError::ModuleNotFound { path });
        }

        let library = unsafe { Library::new(&path) }.map_err(|e| BootstrapError::ModuleLoad {
            path: path.clone(),
            details: e.to_string(),
        })?;
        self.libraries.push(library);

        debug!(plugin = %plugin, module, "loaded include module");
        Ok(())
    }

    fn load_main(
        &mut self,
        plugin: &PluginName,
        module: &str,
    ) -> Result<ModuleManifest, BootstrapError> {
        let path = main_path(&self.root, plugin, module);
        if !path.exists() {
            return Err(BootstrapError::ModuleNotFound { path });
        }

        let library = unsafe { Library::new(&path) }.map_err(|e| BootstrapError::ModuleLoad {
            path: path.clone(),
            details: e.to_string(),
        })?;

        let manifest = unsafe {
            let entry: Symbol<ManifestEntry> =
                library
                    .get(b"module_manifest")
                    .map_err(|e| BootstrapError::ModuleLoad {
                        path: path.clone(),
                        details: format!("missing module_manifest export: {e}"),
                    })?;
            let raw = entry();
            if raw.is_null() {
                return Err(BootstrapError::ModuleLoad {
                    path,
                    details: "module_manifest returned null".to_string(),
                });
            }
            *Box::from_raw(raw)
        };

        // The library must outlive the manifest's constructors.
        self.libraries.push(library);

        debug!(plugin = %plugin, module, "loaded main module");
        Ok(manifest)
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn path_layout_follows_plugin_identity() {
        let plugin = PluginName::new("acme", "alpha");
        let root = Path::new("/srv/garrison");

        let include = include_path(root, &plugin, "alpha_shared");
        let main = main_path(root, &plugin, "alpha");

        assert!(include.starts_with("/srv/garrison/plugins/acme/alpha"));
        assert!(main.starts_with("/srv/garrison/plugins/acme/alpha"));

        let include_name = include.file_name().unwrap().to_string_lossy();
        let main_name = main.file_name().unwrap().to_string_lossy();
        assert!(include_name.contains("alpha_shared"));
        assert!(main_name.contains("alpha.main"));
    }

    #[test]
    fn missing_include_reports_resolved_path() {
        let dir = tempdir().unwrap();
        let mut loader = DylibModuleLoader::new(dir.path());
        let plugin = PluginName::new("acme", "alpha");

        let err = loader.load_include(&plugin, "alpha_shared").unwrap_err();
        match err {
            BootstrapError::ModuleNotFound { path } => {
                assert_eq!(path, include_path(dir.path(), &plugin, "alpha_shared"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(loader.loaded_count(), 0);
    }

    #[test]
    fn missing_main_reports_resolved_path() {
        let dir = tempdir().unwrap();
        let mut loader = DylibModuleLoader::new(dir.path());
        let plugin = PluginName::new("acme", "alpha");

        let err = loader.load_main(&plugin, "alpha").unwrap_err();
        match err {
            BootstrapError::ModuleNotFound { path } => {
                assert_eq!(path, main_path(dir.path(), &plugin, "alpha"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn present_but_invalid_binary_is_a_load_error() {
        let dir = tempdir().unwrap();
        let plugin = PluginName::new("acme", "alpha");
        let path = include_path(dir.path(), &plugin, "alpha_shared");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, b"not a shared object").unwrap();

        let mut loader = DylibModuleLoader::new(dir.path());
        let err = loader.load_include(&plugin, "alpha_shared").unwrap_err();
        assert!(matches!(err, BootstrapError::ModuleLoad { .. }));
    }
}
