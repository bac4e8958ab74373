//! Document store over a staging tree
//!
//! The [`DocumentStore`] is the one mutable resource of a generator run. It
//! exposes the workspace files as named documents, either structured JSON
//! values or opaque text, and stages every change in its [`Tree`]. It never
//! flushes on its own: committing is the orchestrator's decision.
//!
//! ## Contract
//!
//! - [`get`](DocumentStore::get) fails with [`Error::NotFound`] for a missing key.
//! - [`update`](DocumentStore::update) reads the current value, lets a closure
//!   edit a copy and writes it back only if the closure succeeds. A missing
//!   key fails; [`update_or`](DocumentStore::update_or) starts from a default
//!   instead.
//! - Document keys never change; only values are replaced or deleted.
//!
//! Projects registered by a scaffolding step are tracked by name so later
//! steps can find their root. The workspace-scope document (`nx.json`) has its
//! own accessor in [`crate::workspace`].

use std::collections::BTreeMap;

use log::debug;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::error::{Error, Result};
use crate::filesystem::{File, Tree};
use crate::merge::json::to_pretty_string;

/// Join a project root and a file name into a document key
///
/// The workspace root is spelled `.`; it contributes no prefix.
pub fn join_key(root: &str, file: &str) -> String {
    let root = root.trim_end_matches('/');
    if root.is_empty() || root == "." {
        file.to_string()
    } else {
        format!("{}/{}", root, file)
    }
}

/// Structured view over the workspace files of one run
#[derive(Debug, Default)]
pub struct DocumentStore {
    tree: Tree,
    projects: BTreeMap<String, String>,
}

impl DocumentStore {
    /// Wrap a staging tree
    pub fn new(tree: Tree) -> Self {
        Self {
            tree,
            projects: BTreeMap::new(),
        }
    }

    /// The underlying staging tree
    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    /// Give back the staging tree, e.g. to commit it
    pub fn into_tree(self) -> Tree {
        self.tree
    }

    /// Whether a document exists in the staged view
    pub fn exists(&self, key: &str) -> bool {
        self.tree.exists(key)
    }

    /// Read and parse a JSON document
    pub fn get(&self, key: &str) -> Result<JsonValue> {
        let content = self.read_text(key)?;
        serde_json::from_str(&content).map_err(|e| Error::document(key, e.to_string()))
    }

    /// Read a JSON document into a typed value
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<T> {
        let value = self.get(key)?;
        serde_json::from_value(value).map_err(|e| Error::document(key, e.to_string()))
    }

    /// Replace a JSON document
    pub fn set(&mut self, key: &str, value: &JsonValue) -> Result<()> {
        let content = to_pretty_string(value)?;
        self.tree.write_string(key, &content)
    }

    /// Replace a JSON document from a typed value
    pub fn set_as<T: Serialize>(&mut self, key: &str, value: &T) -> Result<()> {
        let value = serde_json::to_value(value)?;
        self.set(key, &value)
    }

    /// Edit an existing JSON document in place
    pub fn update<F>(&mut self, key: &str, f: F) -> Result<()>
    where
        F: FnOnce(&mut JsonValue) -> Result<()>,
    {
        let mut value = self.get(key)?;
        f(&mut value)?;
        debug!("updated {}", key);
        self.set(key, &value)
    }

    /// Edit a JSON document, starting from `default` when it does not exist
    pub fn update_or<F>(&mut self, key: &str, default: JsonValue, f: F) -> Result<()>
    where
        F: FnOnce(&mut JsonValue) -> Result<()>,
    {
        let mut value = if self.exists(key) {
            self.get(key)?
        } else {
            default
        };
        f(&mut value)?;
        debug!("updated {}", key);
        self.set(key, &value)
    }

    /// Edit an existing JSON document through a typed view
    ///
    /// Unknown keys survive as long as `T` captures them (e.g. with
    /// `#[serde(flatten)]`).
    pub fn update_as<T, R, F>(&mut self, key: &str, f: F) -> Result<R>
    where
        T: DeserializeOwned + Serialize,
        F: FnOnce(&mut T) -> Result<R>,
    {
        let mut value: T = self.get_as(key)?;
        let result = f(&mut value)?;
        debug!("updated {}", key);
        self.set_as(key, &value)?;
        Ok(result)
    }

    /// Delete a document. Deleting a missing document is a no-op.
    pub fn delete(&mut self, key: &str) -> Result<()> {
        debug!("deleted {}", key);
        self.tree.delete(key)
    }

    /// Read a text document
    pub fn read_text(&self, key: &str) -> Result<String> {
        self.tree.read_string(key)?.ok_or_else(|| Error::NotFound {
            key: key.to_string(),
        })
    }

    /// Write a text document
    pub fn write_text(&mut self, key: &str, content: &str) -> Result<()> {
        self.tree.write_string(key, content)
    }

    /// Write a file with explicit metadata
    pub fn write_file(&mut self, key: &str, file: File) -> Result<()> {
        self.tree.write(key, file)
    }

    /// Write a text document unless one already exists
    ///
    /// Returns whether the document was written.
    pub fn write_text_if_absent(&mut self, key: &str, content: &str) -> Result<bool> {
        if self.exists(key) {
            debug!("keeping existing {}", key);
            return Ok(false);
        }
        self.write_text(key, content)?;
        Ok(true)
    }

    /// Record that a project named `name` lives at `root`
    pub fn register_project(&mut self, name: &str, root: &str) {
        self.projects.insert(name.to_string(), root.to_string());
    }

    /// Root of a registered project
    pub fn project_root(&self, name: &str) -> Option<&str> {
        self.projects.get(name).map(String::as_str)
    }

    /// Names of all registered projects
    pub fn project_names(&self) -> impl Iterator<Item = &str> {
        self.projects.keys().map(String::as_str)
    }

    /// Re-serialize every staged JSON document
    ///
    /// Purely cosmetic: two-space indentation, a trailing newline, key order
    /// preserved. Documents written as raw text (templates) end up in the same
    /// shape as documents written through [`set`](Self::set).
    pub fn format(&mut self) -> Result<()> {
        for path in self.tree.list_written_glob("**/*.json")? {
            let key = path.to_string_lossy().into_owned();
            let value = self.get(&key)?;
            let formatted = to_pretty_string(&value)?;
            if self.read_text(&key)? != formatted {
                debug!("formatted {}", key);
                self.tree.write_string(&key, &formatted)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn store_with(key: &str, content: &str) -> DocumentStore {
        let mut tree = Tree::new();
        tree.write_string(key, content).unwrap();
        DocumentStore::new(tree)
    }

    #[test]
    fn test_join_key() {
        assert_eq!(join_key(".", "project.json"), "project.json");
        assert_eq!(join_key("", "project.json"), "project.json");
        assert_eq!(join_key("libs/lib/", ".eslintrc.json"), "libs/lib/.eslintrc.json");
    }

    #[test]
    fn test_get_missing_is_not_found() {
        let store = DocumentStore::default();
        let err = store.get("tsconfig.json").unwrap_err();
        assert!(matches!(err, Error::NotFound { ref key } if key == "tsconfig.json"));
    }

    #[test]
    fn test_get_invalid_json_is_document_error() {
        let store = store_with("tsconfig.json", "{ not json");
        let err = store.get("tsconfig.json").unwrap_err();
        assert!(matches!(err, Error::Document { .. }));
    }

    #[test]
    fn test_update_missing_fails() {
        let mut store = DocumentStore::default();
        let result = store.update("package.json", |_| Ok(()));
        assert!(matches!(result, Err(Error::NotFound { .. })));
        assert!(store.tree().is_clean());
    }

    #[test]
    fn test_update_or_uses_default() {
        let mut store = DocumentStore::default();
        store
            .update_or("package.json", json!({}), |pkg| {
                pkg["name"] = json!("lib");
                Ok(())
            })
            .unwrap();
        assert_eq!(store.get("package.json").unwrap(), json!({"name": "lib"}));
    }

    #[test]
    fn test_failed_update_leaves_value_untouched() {
        let mut store = store_with("package.json", r#"{"name":"lib"}"#);
        let result = store.update("package.json", |pkg| {
            pkg["name"] = json!("changed");
            Err(Error::configuration("boom"))
        });
        assert!(result.is_err());
        assert_eq!(store.get("package.json").unwrap(), json!({"name": "lib"}));
    }

    #[test]
    fn test_update_as_typed() {
        #[derive(serde::Deserialize, serde::Serialize)]
        struct Pkg {
            name: String,
            #[serde(flatten)]
            rest: serde_json::Map<String, JsonValue>,
        }

        let mut store = store_with("package.json", r#"{"name":"lib","version":"1.0.0"}"#);
        let old = store
            .update_as("package.json", |pkg: &mut Pkg| {
                Ok(std::mem::replace(&mut pkg.name, "@scope/lib".to_string()))
            })
            .unwrap();

        assert_eq!(old, "lib");
        assert_eq!(
            store.get("package.json").unwrap(),
            json!({"name": "@scope/lib", "version": "1.0.0"})
        );
    }

    #[test]
    fn test_delete_and_exists() {
        let mut store = store_with("tools/scripts/publish.mjs", "// publish");
        assert!(store.exists("tools/scripts/publish.mjs"));
        store.delete("tools/scripts/publish.mjs").unwrap();
        assert!(!store.exists("tools/scripts/publish.mjs"));
    }

    #[test]
    fn test_write_text_if_absent() {
        let mut store = store_with("README.md", "# host");
        assert!(!store.write_text_if_absent("README.md", "# lib").unwrap());
        assert!(store.write_text_if_absent("LICENSE", "MIT").unwrap());
        assert_eq!(store.read_text("README.md").unwrap(), "# host");
    }

    #[test]
    fn test_project_registry() {
        let mut store = DocumentStore::default();
        store.register_project("lib", ".");
        assert_eq!(store.project_root("lib"), Some("."));
        assert_eq!(store.project_root("other"), None);
        assert_eq!(store.project_names().collect::<Vec<_>>(), vec!["lib"]);
    }

    #[test]
    fn test_format_normalizes_json_documents() {
        let mut store = store_with(".commitlintrc.json", r#"{"extends":["a"],"rules":{}}"#);
        store.write_text("README.md", "# lib").unwrap();
        store.format().unwrap();

        assert_eq!(
            store.read_text(".commitlintrc.json").unwrap(),
            "{\n  \"extends\": [\n    \"a\"\n  ],\n  \"rules\": {}\n}\n"
        );
        assert_eq!(store.read_text("README.md").unwrap(), "# lib");
    }
}
