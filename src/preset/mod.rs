//! # The ts-package preset
//!
//! Turns a freshly created workspace into a publishable TypeScript package:
//! a rollup-built root library with vitest and eslint, conventional commits
//! and semantic versioning through `@jscutlery/semver`, and an npm deploy
//! target through `ngx-deploy-npm`.
//!
//! The work is split into:
//!
//! - **Options** (this module): the raw [`PresetOptions`] record and its
//!   validated form, [`NormalizedOptions`].
//! - **Steps** ([`steps`]): the fixed, ordered list of mutations.
//! - **Orchestrator** ([`orchestrator`]): runs the steps against a
//!   [`DocumentStore`](crate::documents::DocumentStore), commits the result
//!   once and runs the deferred tasks.

pub mod orchestrator;
pub mod steps;

use std::path::Path;

use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::defaults;
use crate::error::{Error, Result};

/// Longest package name the npm registry accepts
const MAX_PACKAGE_NAME_LENGTH: usize = 214;

/// Options of a preset run, as given on the command line or in an options file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresetOptions {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub npm_scope: Option<String>,
    #[serde(default)]
    pub default_base: Option<String>,
    #[serde(default)]
    pub local_registry: Option<String>,
}

impl PresetOptions {
    /// Load options from a YAML or JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse options from YAML (JSON is valid YAML)
    pub fn parse(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Lay `other` over `self`; values set in `other` win
    pub fn overridden_by(self, other: PresetOptions) -> Self {
        Self {
            name: other.name.or(self.name),
            npm_scope: other.npm_scope.or(self.npm_scope),
            default_base: other.default_base.or(self.default_base),
            local_registry: other.local_registry.or(self.local_registry),
        }
    }
}

/// Validated options every step works from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedOptions {
    /// Project name
    pub name: String,
    /// npm scope without the leading `@`
    pub npm_scope: Option<String>,
    /// Package name: `@scope/name`, or `name` without a scope
    pub import_path: String,
    /// Branch to write to `nx.json`; the host's own is kept when unset
    pub default_base: Option<String>,
    pub local_registry: String,
}

/// One segment of an npm package name (the scope or the bare name)
const PACKAGE_SEGMENT_PATTERN: &str = r"^[a-z0-9~-][a-z0-9._~-]*$";

fn validate_segment(kind: &str, value: &str) -> Result<()> {
    let pattern = Regex::new(PACKAGE_SEGMENT_PATTERN)?;
    if pattern.is_match(value) {
        Ok(())
    } else {
        Err(Error::configuration(format!(
            "Invalid {} '{}': must be lowercase and may only contain letters, digits, '-', '.', '_' and '~', not starting with '.' or '_'",
            kind, value
        )))
    }
}

/// Validate options and derive the import path
pub fn normalize(options: &PresetOptions) -> Result<NormalizedOptions> {
    let name = options
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .ok_or_else(|| Error::configuration("The preset requires a project name"))?;
    validate_segment("project name", name)?;

    let npm_scope = options
        .npm_scope
        .as_deref()
        .map(|s| s.trim().trim_start_matches('@'))
        .filter(|s| !s.is_empty());
    if let Some(scope) = npm_scope {
        validate_segment("npm scope", scope)?;
    }

    let import_path = match npm_scope {
        Some(scope) => format!("@{}/{}", scope, name),
        None => name.to_string(),
    };
    if import_path.len() > MAX_PACKAGE_NAME_LENGTH {
        return Err(Error::configuration(format!(
            "Package name '{}' is longer than {} characters",
            import_path, MAX_PACKAGE_NAME_LENGTH
        )));
    }

    let local_registry = options
        .local_registry
        .clone()
        .unwrap_or_else(|| defaults::LOCAL_REGISTRY.to_string());
    let url = Url::parse(&local_registry)?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(Error::configuration(format!(
            "Local registry '{}' must be an http(s) URL",
            local_registry
        )));
    }

    Ok(NormalizedOptions {
        name: name.to_string(),
        npm_scope: npm_scope.map(str::to_string),
        import_path,
        default_base: options
            .default_base
            .clone()
            .filter(|b| !b.trim().is_empty()),
        local_registry,
    })
}
