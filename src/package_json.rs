//! Package manifest documents (`package.json`)
//!
//! Dependency edits keep two properties:
//!
//! - a package name lives in at most one of `dependencies` and
//!   `devDependencies`;
//! - when a package is already declared, the greater version range wins.
//!   Ranges that are not plain semver (`workspace:*`, `latest`, git URLs)
//!   are never replaced.
//!
//! Both sections are kept sorted by package name.

use std::cmp::Ordering;

use log::debug;
use semver::Version;
use serde_json::{json, Map, Value as JsonValue};

use crate::documents::DocumentStore;
use crate::error::{Error, Result};
use crate::merge::json::sort_keys;

/// Key of the workspace package manifest
pub const PACKAGE_JSON: &str = "package.json";

const DEPENDENCIES: &str = "dependencies";
const DEV_DEPENDENCIES: &str = "devDependencies";

/// The lowest version admitted by a simple range such as `^2.3.0` or `~0.5`
fn range_floor(range: &str) -> Option<Version> {
    let trimmed = range
        .trim()
        .trim_start_matches(['^', '~', '=', '>', 'v'])
        .trim();
    let core = trimmed.split_whitespace().next()?;
    let padded = match core.matches('.').count() {
        0 => format!("{}.0.0", core),
        1 => format!("{}.0", core),
        _ => core.to_string(),
    };
    Version::parse(&padded).ok()
}

/// Pick the range to keep when `existing` is already declared
pub fn pick_version<'a>(existing: &'a str, requested: &'a str) -> &'a str {
    match (range_floor(existing), range_floor(requested)) {
        (Some(current), Some(wanted)) => match wanted.cmp(&current) {
            Ordering::Greater => requested,
            _ => existing,
        },
        (None, _) => existing,
        (Some(_), None) => existing,
    }
}

fn section_mut<'a>(manifest: &'a mut JsonValue, section: &str) -> Result<&'a mut Map<String, JsonValue>> {
    let Some(manifest) = manifest.as_object_mut() else {
        return Err(Error::document(PACKAGE_JSON, "expected an object"));
    };
    manifest
        .entry(section.to_string())
        .or_insert_with(|| json!({}))
        .as_object_mut()
        .ok_or_else(|| Error::document(PACKAGE_JSON, format!("'{}' must be an object", section)))
}

fn declared_version(manifest: &JsonValue, section: &str, name: &str) -> Option<String> {
    manifest
        .get(section)
        .and_then(|deps| deps.get(name))
        .and_then(JsonValue::as_str)
        .map(str::to_string)
}

/// Declare dependencies in a manifest value
///
/// A runtime dependency already listed as a dev dependency moves to
/// `dependencies`. A dev dependency already listed as a runtime dependency
/// stays there, with its range updated.
pub fn add_dependencies_to_manifest(
    manifest: &mut JsonValue,
    dependencies: &[(&str, &str)],
    dev_dependencies: &[(&str, &str)],
) -> Result<()> {
    for (name, requested) in dependencies {
        let existing = declared_version(manifest, DEPENDENCIES, name)
            .or_else(|| declared_version(manifest, DEV_DEPENDENCIES, name));
        let version = match &existing {
            Some(existing) => pick_version(existing, requested).to_string(),
            None => requested.to_string(),
        };
        if let Some(dev) = manifest
            .get_mut(DEV_DEPENDENCIES)
            .and_then(JsonValue::as_object_mut)
        {
            dev.shift_remove(*name);
        }
        section_mut(manifest, DEPENDENCIES)?.insert(name.to_string(), json!(version));
    }

    for (name, requested) in dev_dependencies {
        let (section, existing) = match declared_version(manifest, DEPENDENCIES, name) {
            Some(version) => (DEPENDENCIES, Some(version)),
            None => (DEV_DEPENDENCIES, declared_version(manifest, DEV_DEPENDENCIES, name)),
        };
        let version = match &existing {
            Some(existing) => pick_version(existing, requested).to_string(),
            None => requested.to_string(),
        };
        section_mut(manifest, section)?.insert(name.to_string(), json!(version));
    }

    for section in [DEPENDENCIES, DEV_DEPENDENCIES] {
        if let Some(deps) = manifest.get_mut(section) {
            sort_keys(deps);
        }
    }
    Ok(())
}

/// Remove dependencies from a manifest value; missing names are ignored
pub fn remove_dependencies_from_manifest(
    manifest: &mut JsonValue,
    dependencies: &[&str],
    dev_dependencies: &[&str],
) -> Result<()> {
    for (section, names) in [(DEPENDENCIES, dependencies), (DEV_DEPENDENCIES, dev_dependencies)] {
        if let Some(deps) = manifest.get_mut(section).and_then(JsonValue::as_object_mut) {
            for name in names {
                deps.shift_remove(*name);
            }
        }
    }
    Ok(())
}

/// Declare dependencies in the workspace `package.json`
pub fn add_dependencies_to_package_json(
    store: &mut DocumentStore,
    dependencies: &[(&str, &str)],
    dev_dependencies: &[(&str, &str)],
) -> Result<()> {
    debug!(
        "adding dependencies {:?} and devDependencies {:?}",
        dependencies, dev_dependencies
    );
    store.update(PACKAGE_JSON, |manifest| {
        add_dependencies_to_manifest(manifest, dependencies, dev_dependencies)
    })
}

/// Move a package from `dependencies` to `devDependencies` at `version`
///
/// Both edits happen in one update, so no intermediate state is observable.
pub fn move_to_dev_dependencies(store: &mut DocumentStore, name: &str, version: &str) -> Result<()> {
    store.update(PACKAGE_JSON, |manifest| {
        remove_dependencies_from_manifest(manifest, &[name], &[])?;
        add_dependencies_to_manifest(manifest, &[], &[(name, version)])
    })
}

/// Set (or replace) an npm script
pub fn set_script(store: &mut DocumentStore, name: &str, command: &str) -> Result<()> {
    store.update(PACKAGE_JSON, |manifest| {
        section_mut(manifest, "scripts")?.insert(name.to_string(), json!(command));
        Ok(())
    })
}
