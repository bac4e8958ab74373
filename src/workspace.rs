//! Workspace-scope configuration and project discovery
//!
//! `nx.json` applies to every project of the workspace. It is never edited
//! through the project accessors in [`crate::project`]; mutation steps go
//! through [`update_workspace`] instead.
//!
//! The [`ProjectGraph`] is the read-only view the executors use: every
//! `project.json` below the workspace root, keyed by project name.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, trace};
use serde_json::{json, Value as JsonValue};

use crate::documents::DocumentStore;
use crate::error::{Error, Result};
use crate::merge::json::{navigate_json_value, push_unique};
use crate::merge::PathSegment;
use crate::project::{ProjectConfiguration, PROJECT_FILE};

/// Key of the workspace-scope configuration document
pub const WORKSPACE_CONFIG: &str = "nx.json";

/// Directories never searched for projects
const SKIP_DIRS: &[&str] = &["node_modules", "dist", "tmp", "coverage"];

/// Edit the workspace configuration, creating it when the workspace has none
pub fn update_workspace<F>(store: &mut DocumentStore, f: F) -> Result<()>
where
    F: FnOnce(&mut JsonValue) -> Result<()>,
{
    store.update_or(
        WORKSPACE_CONFIG,
        json!({"$schema": "./node_modules/nx/schemas/nx-schema.json"}),
        f,
    )
}

/// Read the workspace configuration
pub fn read_workspace(store: &DocumentStore) -> Result<JsonValue> {
    store.get(WORKSPACE_CONFIG)
}

/// Append `entry` to the named input `input`, creating the list if needed
///
/// Returns whether the list changed.
pub fn add_named_input_entry(store: &mut DocumentStore, input: &str, entry: &str) -> Result<bool> {
    let mut changed = false;
    update_workspace(store, |config| {
        let path = [
            PathSegment::Key("namedInputs".to_string()),
            PathSegment::Key(input.to_string()),
        ];
        let list = navigate_json_value(config, &path)?;
        if list.as_object().is_some_and(|obj| obj.is_empty()) {
            *list = json!([]);
        }
        changed = push_unique(list, json!(entry))?;
        Ok(())
    })?;
    Ok(changed)
}

/// Set the branch affected commands compare against
pub fn set_default_base(store: &mut DocumentStore, base: &str) -> Result<()> {
    update_workspace(store, |config| {
        config["defaultBase"] = json!(base);
        Ok(())
    })
}

/// Set the branch affected commands compare against, unless one is set
pub fn ensure_default_base(store: &mut DocumentStore, base: &str) -> Result<()> {
    update_workspace(store, |config| {
        if config.get("defaultBase").is_none() {
            config["defaultBase"] = json!(base);
        }
        Ok(())
    })
}

/// Walk up from `start` to the first directory holding `nx.json`
pub fn find_workspace_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(WORKSPACE_CONFIG).is_file())
        .map(Path::to_path_buf)
}

/// A project discovered on disk
#[derive(Debug, Clone)]
pub struct ProjectNode {
    pub name: String,
    /// Workspace-relative root, `.` for the root project
    pub root: String,
    pub config: ProjectConfiguration,
}

/// Every project of a workspace, keyed by name
#[derive(Debug, Clone)]
pub struct ProjectGraph {
    workspace_root: PathBuf,
    projects: BTreeMap<String, ProjectNode>,
}

impl ProjectGraph {
    /// Discover all `project.json` files below `workspace_root`
    ///
    /// A project is named by its `name` key, falling back to its directory
    /// name. Two projects with the same name are a configuration error.
    pub fn load(workspace_root: &Path) -> Result<Self> {
        let mut projects: BTreeMap<String, ProjectNode> = BTreeMap::new();

        for entry in walkdir::WalkDir::new(workspace_root)
            .into_iter()
            .filter_entry(|e| {
                if e.depth() == 0 {
                    return true;
                }
                let file_name = e.file_name().to_str().unwrap_or("");
                !(SKIP_DIRS.contains(&file_name)
                    || (file_name.starts_with('.') && e.file_type().is_dir()))
            })
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file() && e.file_name() == PROJECT_FILE)
        {
            let path = entry.path();
            let dir = path.parent().unwrap_or(workspace_root);
            let relative = dir.strip_prefix(workspace_root).map_err(|_| Error::Filesystem {
                message: format!("Failed to make path relative: {}", dir.display()),
            })?;
            let root = match relative.to_string_lossy().replace('\\', "/") {
                r if r.is_empty() => ".".to_string(),
                r => r,
            };

            let content = fs::read_to_string(path)?;
            let config: ProjectConfiguration = serde_json::from_str(&content)
                .map_err(|e| Error::document(path.display().to_string(), e.to_string()))?;
            let name = match &config.name {
                Some(name) => name.clone(),
                None => dir
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| root.clone()),
            };
            trace!("discovered project {} at {}", name, root);

            if let Some(existing) = projects.get(&name) {
                return Err(Error::configuration(format!(
                    "Project name '{}' is used by both '{}' and '{}'",
                    name, existing.root, root
                )));
            }
            projects.insert(name.clone(), ProjectNode { name, root, config });
        }

        debug!(
            "loaded {} project(s) from {}",
            projects.len(),
            workspace_root.display()
        );
        Ok(Self {
            workspace_root: workspace_root.to_path_buf(),
            projects,
        })
    }

    pub fn workspace_root(&self) -> &Path {
        &self.workspace_root
    }

    /// Look up a project by name
    pub fn project(&self, name: &str) -> Result<&ProjectNode> {
        self.projects
            .get(name)
            .ok_or_else(|| Error::resolution(name, "project does not exist in the workspace"))
    }

    /// The project rooted at the workspace root, if any
    pub fn root_project(&self) -> Option<&ProjectNode> {
        self.projects.values().find(|p| p.root == ".")
    }

    pub fn project_names(&self) -> impl Iterator<Item = &str> {
        self.projects.keys().map(String::as_str)
    }
}
