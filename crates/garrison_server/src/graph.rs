//! Definition graph loading.
//!
//! The lockfile (`garrison.lock`) is the resolved dependency manifest: per
//! plugin it declares identity, dependency list, and the server-side module
//! lists. Loading parses the file and orders the definitions with Kahn's
//! algorithm so that every dependency precedes its dependents; a missing
//! dependency or a cycle is a load-time failure and nothing else happens.

use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::GraphError;

/// Lockfile name, resolved relative to the resource root.
pub const LOCKFILE: &str = "garrison.lock";

/// Plugin identity: vendor plus project, displayed as `vendor/project`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PluginName {
    pub vendor: String,
    pub project: String,
}

impl PluginName {
    pub fn new(vendor: impl Into<String>, project: impl Into<String>) -> Self {
        Self {
            vendor: vendor.into(),
            project: project.into(),
        }
    }
}

impl fmt::Display for PluginName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.vendor, self.project)
    }
}

/// Server-side module lists of a plugin.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerTargets {
    /// Auxiliary modules, loaded for side effects before any main module.
    #[serde(default)]
    pub include: Vec<String>,
    /// Primary modules contributing controllers and migrations.
    #[serde(default)]
    pub main: Vec<String>,
}

/// One plugin as declared in the lockfile. Immutable once parsed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginDefinition {
    pub name: PluginName,
    #[serde(default)]
    pub version: Option<String>,
    /// Dependencies by display name (`vendor/project`).
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default)]
    pub server: Option<ServerTargets>,
}

impl PluginDefinition {
    /// Display form including the version when one is declared.
    pub fn full_name(&self) -> String {
        match &self.version {
            Some(version) => format!("{} {version}", self.name),
            None => self.name.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct Lockfile {
    #[serde(default)]
    plugins: Vec<PluginDefinition>,
}

/// Plugin definitions in dependency order: for every definition, all of its
/// dependencies occur strictly earlier.
#[derive(Debug)]
pub struct DefinitionGraph {
    pub definitions: Vec<PluginDefinition>,
}

impl DefinitionGraph {
    /// Load and order the lockfile at `path`.
    pub fn load(path: &Path) -> Result<Self, GraphError> {
        let raw = fs::read_to_string(path).map_err(|source| GraphError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let lockfile: Lockfile = serde_yml::from_str(&raw).map_err(|source| GraphError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(Self {
            definitions: resolve_order(lockfile.plugins)?,
        })
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

/// Order definitions so dependencies come before dependents (Kahn's
/// algorithm). Deterministic: ties resolve in lockfile declaration order.
fn resolve_order(definitions: Vec<PluginDefinition>) -> Result<Vec<PluginDefinition>, GraphError> {
    let index: HashMap<String, usize> = definitions
        .iter()
        .enumerate()
        .map(|(i, def)| (def.name.to_string(), i))
        .collect();

    let mut in_degree = vec![0usize; definitions.len()];
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); definitions.len()];

    for (i, def) in definitions.iter().enumerate() {
        for dependency in &def.dependencies {
            let Some(&dep) = index.get(dependency) else {
                return Err(GraphError::MissingDependency {
                    plugin: def.name.to_string(),
                    dependency: dependency.clone(),
                });
            };
            in_degree[i] += 1;
            dependents[dep].push(i);
        }
    }

    let mut queue: VecDeque<usize> = (0..definitions.len())
        .filter(|&i| in_degree[i] == 0)
        .collect();
    let mut order = Vec::with_capacity(definitions.len());

    while let Some(i) = queue.pop_front() {
        order.push(i);
        for &dependent in &dependents[i] {
            in_degree[dependent] -= 1;
            if in_degree[dependent] == 0 {
                queue.push_back(dependent);
            }
        }
    }

    if order.len() != definitions.len() {
        let placed: HashSet<usize> = order.iter().copied().collect();
        let stuck: Vec<String> = definitions
            .iter()
            .enumerate()
            .filter(|(i, _)| !placed.contains(i))
            .map(|(_, def)| def.name.to_string())
            .collect();
        return Err(GraphError::CircularDependency {
            plugins: stuck.join(", "),
        });
    }

    let mut slots: Vec<Option<PluginDefinition>> = definitions.into_iter().map(Some).collect();
    Ok(order
        .into_iter()
        .filter_map(|i| slots[i].take())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn definition(vendor: &str, project: &str, deps: Vec<&str>) -> PluginDefinition {
        PluginDefinition {
            name: PluginName::new(vendor, project),
            version: None,
            dependencies: deps.into_iter().map(String::from).collect(),
            server: None,
        }
    }

    fn position(graph: &[PluginDefinition], project: &str) -> usize {
        graph
            .iter()
            .position(|d| d.name.project == project)
            .unwrap()
    }

    #[test]
    fn simple_chain_orders_dependencies_first() {
        let defs = vec![
            definition("acme", "c", vec!["acme/b"]),
            definition("acme", "a", vec![]),
            definition("acme", "b", vec!["acme/a"]),
        ];

        let order = resolve_order(defs).unwrap();
        assert!(position(&order, "a") < position(&order, "b"));
        assert!(position(&order, "b") < position(&order, "c"));
    }

    #[test]
    fn diamond_dependency() {
        let defs = vec![
            definition("acme", "top", vec!["acme/left", "acme/right"]),
            definition("acme", "left", vec!["acme/base"]),
            definition("acme", "right", vec!["acme/base"]),
            definition("acme", "base", vec![]),
        ];

        let order = resolve_order(defs).unwrap();
        assert!(position(&order, "base") < position(&order, "left"));
        assert!(position(&order, "base") < position(&order, "right"));
        assert!(position(&order, "left") < position(&order, "top"));
        assert!(position(&order, "right") < position(&order, "top"));
    }

    #[test]
    fn declaration_order_is_preserved_without_dependencies() {
        let defs = vec![
            definition("acme", "one", vec![]),
            definition("acme", "two", vec![]),
            definition("acme", "three", vec![]),
        ];

        let order = resolve_order(defs).unwrap();
        let projects: Vec<&str> = order.iter().map(|d| d.name.project.as_str()).collect();
        assert_eq!(projects, vec!["one", "two", "three"]);
    }

    #[test]
    fn missing_dependency_is_rejected() {
        let defs = vec![definition("acme", "a", vec!["acme/ghost"])];

        let err = resolve_order(defs).unwrap_err();
        match err {
            GraphError::MissingDependency { plugin, dependency } => {
                assert_eq!(plugin, "acme/a");
                assert_eq!(dependency, "acme/ghost");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn direct_cycle_is_rejected() {
        let defs = vec![
            definition("acme", "a", vec!["acme/b"]),
            definition("acme", "b", vec!["acme/a"]),
        ];

        let err = resolve_order(defs).unwrap_err();
        assert!(matches!(err, GraphError::CircularDependency { .. }));
    }

    #[test]
    fn indirect_cycle_names_participants() {
        let defs = vec![
            definition("acme", "a", vec!["acme/c"]),
            definition("acme", "b", vec!["acme/a"]),
            definition("acme", "c", vec!["acme/b"]),
        ];

        let err = resolve_order(defs).unwrap_err();
        match err {
            GraphError::CircularDependency { plugins } => {
                assert!(plugins.contains("acme/a"));
                assert!(plugins.contains("acme/b"));
                assert!(plugins.contains("acme/c"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn load_parses_lockfile() {
        let yaml = r#"
plugins:
  - name:
      vendor: acme
      project: beta
    version: 1.2.0
    dependencies: [acme/alpha]
    server:
      main: [beta]
  - name:
      vendor: acme
      project: alpha
    server:
      include: [alpha_shared]
      main: [alpha]
"#;
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(yaml.as_bytes()).unwrap();

        let graph = DefinitionGraph::load(file.path()).unwrap();
        assert_eq!(graph.len(), 2);
        assert_eq!(graph.definitions[0].name.project, "alpha");
        assert_eq!(graph.definitions[1].full_name(), "acme/beta 1.2.0");
        let targets = graph.definitions[0].server.as_ref().unwrap();
        assert_eq!(targets.include, vec!["alpha_shared"]);
        assert_eq!(targets.main, vec!["alpha"]);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let err = DefinitionGraph::load(Path::new("does/not/exist.lock")).unwrap_err();
        assert!(matches!(err, GraphError::Io { .. }));
    }

    #[test]
    fn load_malformed_yaml_is_parse_error() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"plugins: [not: [valid").unwrap();

        let err = DefinitionGraph::load(file.path()).unwrap_err();
        assert!(matches!(err, GraphError::Parse { .. }));
    }
}
