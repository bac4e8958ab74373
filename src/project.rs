//! Project configuration documents (`project.json`)
//!
//! A project configuration maps target names to target definitions. Targets
//! are kept in file order and every key this crate does not model survives a
//! read-modify-write cycle untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::documents::{join_key, DocumentStore};
use crate::error::{Error, Result};

/// File name of a project configuration inside its root
pub const PROJECT_FILE: &str = "project.json";

/// A single target of a project
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetConfiguration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub executor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub outputs: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_configuration: Option<String>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub options: Map<String, JsonValue>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub configurations: Map<String, JsonValue>,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

impl TargetConfiguration {
    /// Create a target run by `executor`
    pub fn with_executor(executor: &str) -> Self {
        Self {
            executor: Some(executor.to_string()),
            ..Default::default()
        }
    }

    /// Options with the named configuration laid over them
    ///
    /// `None` selects `defaultConfiguration`, if any. Naming a configuration
    /// that does not exist is an error.
    pub fn merged_options(&self, configuration: Option<&str>) -> Result<Map<String, JsonValue>> {
        let mut merged = self.options.clone();
        let Some(name) = configuration.or(self.default_configuration.as_deref()) else {
            return Ok(merged);
        };
        match self.configurations.get(name) {
            Some(JsonValue::Object(overrides)) => {
                for (key, value) in overrides {
                    merged.insert(key.clone(), value.clone());
                }
                Ok(merged)
            }
            Some(_) => Err(Error::resolution(
                name,
                "configuration must be an object of options",
            )),
            None => Err(Error::resolution(name, "configuration does not exist")),
        }
    }

    /// Plain same-project target names this target depends on
    ///
    /// `^target` (dependencies' targets), `project:target` strings and object
    /// entries addressing other projects are not local references.
    pub fn local_dependencies(&self) -> Vec<&str> {
        self.depends_on
            .iter()
            .filter_map(|entry| match entry {
                JsonValue::String(s) if !s.starts_with('^') && !s.contains(':') => {
                    Some(s.as_str())
                }
                JsonValue::Object(obj)
                    if !obj.contains_key("projects")
                        && obj.get("dependencies") != Some(&JsonValue::Bool(true)) =>
                {
                    obj.get("target").and_then(JsonValue::as_str)
                }
                _ => None,
            })
            .collect()
    }
}

/// Contents of a `project.json`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectConfiguration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "$schema", default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_root: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_type: Option<String>,
    #[serde(default)]
    pub targets: Map<String, JsonValue>,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

impl ProjectConfiguration {
    /// Whether a target with this name exists
    pub fn has_target(&self, name: &str) -> bool {
        self.targets.contains_key(name)
    }

    /// Read a target, failing with a resolution error if it is missing
    pub fn target(&self, name: &str) -> Result<TargetConfiguration> {
        let value = self
            .targets
            .get(name)
            .ok_or_else(|| Error::resolution(name, "target does not exist"))?;
        serde_json::from_value(value.clone())
            .map_err(|e| Error::document(format!("targets.{}", name), e.to_string()))
    }

    /// Insert or replace a target; a replaced target keeps its position
    pub fn set_target(&mut self, name: &str, target: &TargetConfiguration) -> Result<()> {
        self.targets
            .insert(name.to_string(), serde_json::to_value(target)?);
        Ok(())
    }

    /// Edit an existing target
    pub fn update_target<R, F>(&mut self, name: &str, f: F) -> Result<R>
    where
        F: FnOnce(&mut TargetConfiguration) -> Result<R>,
    {
        let mut target = self.target(name)?;
        let result = f(&mut target)?;
        self.set_target(name, &target)?;
        Ok(result)
    }

    /// Remove a target, returning whether it existed
    pub fn remove_target(&mut self, name: &str) -> bool {
        self.targets.shift_remove(name).is_some()
    }

    /// Check that every local `dependsOn` reference names an existing target
    pub fn validate_depends_on(&self, project: &str) -> Result<()> {
        for name in self.targets.keys() {
            let target = self.target(name)?;
            for dependency in target.local_dependencies() {
                if !self.has_target(dependency) {
                    return Err(Error::resolution(
                        format!("{}:{}", project, name),
                        format!("dependsOn references missing target '{}'", dependency),
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Locate the root of a project known to the store
///
/// Projects registered during this run win; otherwise a root-level
/// `project.json` carrying the same name is accepted.
pub fn project_root(store: &DocumentStore, name: &str) -> Result<String> {
    if let Some(root) = store.project_root(name) {
        return Ok(root.to_string());
    }
    if store.exists(PROJECT_FILE) {
        let config: ProjectConfiguration = store.get_as(PROJECT_FILE)?;
        if config.name.as_deref() == Some(name) {
            return Ok(".".to_string());
        }
    }
    Err(Error::resolution(name, "project is not registered in the workspace"))
}

/// Write a new project configuration and register the project
pub fn add_project_configuration(
    store: &mut DocumentStore,
    name: &str,
    root: &str,
    config: &ProjectConfiguration,
) -> Result<()> {
    let key = join_key(root, PROJECT_FILE);
    if store.exists(&key) {
        return Err(Error::configuration(format!(
            "Cannot create project '{}': {} already exists",
            name, key
        )));
    }
    store.set_as(&key, config)?;
    store.register_project(name, root);
    Ok(())
}

/// Read the configuration of a project by name
pub fn read_project_configuration(
    store: &DocumentStore,
    name: &str,
) -> Result<ProjectConfiguration> {
    let root = project_root(store, name)?;
    store.get_as(&join_key(&root, PROJECT_FILE))
}

/// Edit the configuration of a project by name
pub fn update_project_configuration<R, F>(store: &mut DocumentStore, name: &str, f: F) -> Result<R>
where
    F: FnOnce(&mut ProjectConfiguration) -> Result<R>,
{
    let root = project_root(store, name)?;
    store.update_as(&join_key(&root, PROJECT_FILE), f)
}
