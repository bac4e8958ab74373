//! # gvrs-nx
//!
//! Nx workspace plugins for publishable TypeScript packages:
//!
//! - the **ts-package preset** turns a freshly created Nx workspace into a
//!   single publishable package with versioning, deployment, linting and git
//!   hooks wired in;
//! - the **publint executor** lints the package a build produced.
//!
//! ## Quick Example
//!
//! ```
//! use gvrs_nx::documents::DocumentStore;
//! use gvrs_nx::preset::{orchestrator, PresetOptions};
//!
//! let mut store = DocumentStore::default();
//! store.write_text("package.json", r#"{"name": "@acme/source"}"#).unwrap();
//!
//! let options = PresetOptions {
//!     name: Some("my-lib".to_string()),
//!     npm_scope: Some("acme".to_string()),
//!     ..Default::default()
//! };
//! let tasks = orchestrator::generate(&mut store, &options).unwrap();
//!
//! let pkg = store.get("package.json").unwrap();
//! assert_eq!(pkg["name"], "@acme/my-lib");
//! assert!(!tasks.is_empty());
//! ```
//!
//! ## Core Concepts
//!
//! - **Staging tree (`filesystem`)**: an overlay over the host directory.
//!   Reads fall through to disk, writes stay in memory until
//!   [`write::commit`] runs.
//! - **Documents (`documents`)**: JSON documents of the tree addressed by
//!   key, read and updated as values.
//! - **Generators (`generators`)**: the library, versioning and deploy
//!   installers the preset composes.
//! - **Preset (`preset`)**: a fixed plan of mutation steps run by
//!   `preset::orchestrator`, followed by deferred [`tasks`].
//! - **Publint (`publint`)**: resolves the package directory from options or
//!   a build target and delegates to the `publint` tool.

pub mod defaults;
pub mod documents;
pub mod error;
pub mod filesystem;
pub mod generators;
pub mod lint;
pub mod merge;
pub mod output;
pub mod package_json;
pub mod package_manager;
pub mod preset;
pub mod project;
pub mod publint;
pub mod tasks;
pub mod workspace;
pub mod write;

#[cfg(test)]
mod preset_proptest;
