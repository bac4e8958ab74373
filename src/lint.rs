//! Lint configuration overrides (`.eslintrc.json`)
//!
//! Projects carry an ESLint configuration whose `overrides` list applies
//! different rule sets to different file globs. Mutation steps edit exactly
//! one override at a time, located with [`find_single`]: a predicate that
//! matches no override or more than one is an error, never a guess.
//!
//! Rule values come in several spellings (`"error"`, `2`, `["error"]`,
//! `["error", { ... }]`). [`normalize_rule`] turns all of them into the
//! canonical `[severity, options]` pair before options are edited.

use serde_json::{json, Map, Value as JsonValue};

use crate::documents::{join_key, DocumentStore};
use crate::error::{Error, Result};
use crate::merge::json::push_unique;

/// File name of a project's lint configuration inside its root
pub const LINT_CONFIG_FILE: &str = ".eslintrc.json";

/// Find the index of the single item satisfying `predicate`
///
/// `description` names the predicate in the error raised when zero or several
/// items match.
pub fn find_single<T, P>(items: &[T], description: &str, predicate: P) -> Result<usize>
where
    P: Fn(&T) -> bool,
{
    let mut matches = items
        .iter()
        .enumerate()
        .filter(|(_, item)| predicate(*item))
        .map(|(idx, _)| idx);

    match (matches.next(), matches.next()) {
        (Some(idx), None) => Ok(idx),
        (None, _) => Err(Error::AmbiguousMatch {
            description: description.to_string(),
            matches: 0,
        }),
        (Some(_), Some(_)) => Err(Error::AmbiguousMatch {
            description: description.to_string(),
            matches: 2 + matches.count(),
        }),
    }
}

/// The glob patterns of an override; `files` may be a string or a list
pub fn override_files(entry: &JsonValue) -> Vec<&str> {
    match entry.get("files") {
        Some(JsonValue::String(glob)) => vec![glob.as_str()],
        Some(JsonValue::Array(globs)) => globs.iter().filter_map(JsonValue::as_str).collect(),
        _ => Vec::new(),
    }
}

/// Whether an override configures `rule`
pub fn has_rule(entry: &JsonValue, rule: &str) -> bool {
    entry
        .get("rules")
        .and_then(|rules| rules.get(rule))
        .is_some()
}

/// Add a glob to an override's `files`, turning a single string into a list
pub fn add_file_glob(entry: &mut JsonValue, glob: &str) -> Result<()> {
    let Some(entry) = entry.as_object_mut() else {
        return Err(Error::document(LINT_CONFIG_FILE, "override must be an object"));
    };
    let files = entry.entry("files").or_insert(JsonValue::Null);
    if let JsonValue::String(existing) = files {
        if existing.as_str() == glob {
            return Ok(());
        }
        let single = std::mem::take(existing);
        *files = json!([single]);
    }
    push_unique(files, json!(glob))?;
    Ok(())
}

/// Normalize a rule value into its `[severity, options]` form
///
/// Already-normalized values come back unchanged.
pub fn normalize_rule(value: &JsonValue) -> Result<(JsonValue, Map<String, JsonValue>)> {
    match value {
        JsonValue::String(_) | JsonValue::Number(_) => Ok((value.clone(), Map::new())),
        JsonValue::Array(items) => match items.as_slice() {
            [severity] => Ok((severity.clone(), Map::new())),
            [severity, JsonValue::Object(options), ..] => Ok((severity.clone(), options.clone())),
            _ => Err(Error::document(
                LINT_CONFIG_FILE,
                format!("unsupported rule value {}", value),
            )),
        },
        _ => Err(Error::document(
            LINT_CONFIG_FILE,
            format!("unsupported rule value {}", value),
        )),
    }
}

/// Append `item` to the list option `option` of `rule` in an override
///
/// The rule value is normalized first; re-applying the same append is a no-op.
pub fn append_rule_option(
    entry: &mut JsonValue,
    rule: &str,
    option: &str,
    item: &str,
) -> Result<()> {
    let current = entry
        .get("rules")
        .and_then(|rules| rules.get(rule))
        .ok_or_else(|| Error::resolution(rule, "rule is not configured in this override"))?;
    let (severity, mut options) = normalize_rule(current)?;

    let list = options.entry(option.to_string()).or_insert(JsonValue::Null);
    push_unique(list, json!(item))?;

    entry["rules"][rule] = json!([severity, options]);
    Ok(())
}

/// Locate the single override of a project's lint configuration matching
/// `predicate` and edit it
pub fn update_override_in_lint_config<P, F>(
    store: &mut DocumentStore,
    project_root: &str,
    description: &str,
    predicate: P,
    update: F,
) -> Result<()>
where
    P: Fn(&JsonValue) -> bool,
    F: FnOnce(&mut JsonValue) -> Result<()>,
{
    let key = join_key(project_root, LINT_CONFIG_FILE);
    store.update(&key, |config| {
        let overrides = config
            .get_mut("overrides")
            .and_then(JsonValue::as_array_mut)
            .ok_or_else(|| Error::document(key.as_str(), "missing 'overrides' list"))?;
        let idx = find_single(overrides.as_slice(), description, predicate)?;
        update(&mut overrides[idx])
    })
}
