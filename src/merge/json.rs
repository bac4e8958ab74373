//! JSON edit primitives
//!
//! Path-addressed get/set/remove on `serde_json::Value`, plus the additive
//! helpers the mutation steps are built from:
//!
//! - [`push_unique`]: append to a list unless the item is already present
//! - [`fill_defaults`]: deep-merge defaults without overriding existing values
//! - [`sort_keys`]: order an object's keys alphabetically
//!
//! All helpers are idempotent: applying them twice yields the same value as
//! applying them once.

use serde_json::{Map, Value as JsonValue};

use super::{parse_path, render_path, PathSegment};
use crate::error::{Error, Result};

/// Navigate to a path within a JSON value, creating intermediate objects
///
/// Missing keys and `null` values along the way become empty objects. Indexing
/// past the end of an array, or into a scalar, is an error.
pub fn navigate_json_value<'a>(
    value: &'a mut JsonValue,
    path: &[PathSegment],
) -> Result<&'a mut JsonValue> {
    let mut current = value;
    for (depth, segment) in path.iter().enumerate() {
        if current.is_null() {
            *current = JsonValue::Object(Map::new());
        }
        current = match (segment, current) {
            (PathSegment::Key(key), JsonValue::Object(map)) => map
                .entry(key.clone())
                .or_insert_with(|| JsonValue::Object(Map::new())),
            (PathSegment::Index(idx), JsonValue::Array(items)) => {
                let len = items.len();
                items.get_mut(*idx).ok_or_else(|| {
                    Error::document(
                        render_path(&path[..=depth]),
                        format!("index {} is out of bounds (length {})", idx, len),
                    )
                })?
            }
            (segment, other) => {
                return Err(Error::document(
                    render_path(&path[..=depth]),
                    format!(
                        "cannot address {:?} inside {}",
                        segment,
                        type_name(other)
                    ),
                ))
            }
        };
    }
    Ok(current)
}

/// Read the value at `path`, if every segment exists
pub fn get_json_path<'a>(value: &'a JsonValue, path: &str) -> Option<&'a JsonValue> {
    parse_path(path)
        .iter()
        .try_fold(value, |current, segment| match segment {
            PathSegment::Key(key) => current.get(key.as_str()),
            PathSegment::Index(idx) => current.get(*idx),
        })
}

/// Set the value at `path`, creating intermediate objects
pub fn set_json_path(value: &mut JsonValue, path: &str, new_value: JsonValue) -> Result<()> {
    let segments = parse_path(path);
    let target = navigate_json_value(value, &segments)?;
    *target = new_value;
    Ok(())
}

/// Append `item` to the array in `target` unless an equal item is present
///
/// A `null` target becomes a one-element array. Returns whether the array
/// changed.
pub fn push_unique(target: &mut JsonValue, item: JsonValue) -> Result<bool> {
    if target.is_null() {
        *target = JsonValue::Array(Vec::new());
    }
    match target {
        JsonValue::Array(items) => {
            if items.contains(&item) {
                Ok(false)
            } else {
                items.push(item);
                Ok(true)
            }
        }
        other => Err(Error::document(
            "<list>",
            format!("expected an array, found {}", type_name(other)),
        )),
    }
}

/// Deep-merge `defaults` into `target` without overriding existing values
///
/// Keys missing from `target` are copied from `defaults`; when both sides hold
/// objects the merge recurses. Arrays and scalars already in `target` win.
pub fn fill_defaults(target: &mut JsonValue, defaults: &JsonValue) {
    match (target, defaults) {
        (JsonValue::Object(target_map), JsonValue::Object(default_map)) => {
            for (key, default_value) in default_map {
                match target_map.get_mut(key) {
                    Some(existing) => fill_defaults(existing, default_value),
                    None => {
                        target_map.insert(key.clone(), default_value.clone());
                    }
                }
            }
        }
        (target, defaults) if target.is_null() => *target = defaults.clone(),
        _ => {}
    }
}

/// Sort an object's keys alphabetically; non-objects are left alone
pub fn sort_keys(value: &mut JsonValue) {
    if let JsonValue::Object(map) = value {
        let mut entries: Vec<(String, JsonValue)> = std::mem::take(map).into_iter().collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        map.extend(entries);
    }
}

/// Serialize a value the way every document is written: two-space
/// indentation and a trailing newline
pub fn to_pretty_string(value: &JsonValue) -> Result<String> {
    let mut content = serde_json::to_string_pretty(value)?;
    content.push('\n');
    Ok(content)
}

fn type_name(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    mod navigate_json_value_tests {
        use super::*;

        #[test]
        fn test_navigate_to_nested_key() {
            let mut value = json!({"compilerOptions": {"module": "commonjs"}});
            let target =
                navigate_json_value(&mut value, &parse_path("compilerOptions.module")).unwrap();
            assert_eq!(target, &json!("commonjs"));
        }

        #[test]
        fn test_navigate_creates_missing_path() {
            let mut value = json!({});
            let target =
                navigate_json_value(&mut value, &parse_path("targets.build.options")).unwrap();
            assert!(target.is_object());
            assert_eq!(value, json!({"targets": {"build": {"options": {}}}}));
        }

        #[test]
        fn test_navigate_to_array_index() {
            let mut value = json!({"overrides": [{"files": ["*.ts"]}, {"files": ["*.js"]}]});
            let target =
                navigate_json_value(&mut value, &parse_path("overrides[1].files")).unwrap();
            assert_eq!(target, &json!(["*.js"]));
        }

        #[test]
        fn test_navigate_index_out_of_bounds() {
            let mut value = json!({"overrides": []});
            let err = navigate_json_value(&mut value, &parse_path("overrides[3]")).unwrap_err();
            assert!(err.to_string().contains("out of bounds"));
        }

        #[test]
        fn test_navigate_type_error() {
            let mut value = json!({"compilerOptions": 42});
            let result = navigate_json_value(&mut value, &parse_path("compilerOptions.module"));
            assert!(result.is_err());
        }
    }

    #[test]
    fn test_get_json_path() {
        let value = json!({"targets": {"build": {"outputs": ["{options.outputPath}"]}}});
        assert_eq!(
            get_json_path(&value, "targets.build.outputs[0]"),
            Some(&json!("{options.outputPath}"))
        );
        assert_eq!(get_json_path(&value, "targets.test"), None);
    }

    #[test]
    fn test_set_json_path_is_idempotent() {
        let mut once = json!({"compilerOptions": {"strict": true}});
        set_json_path(&mut once, "compilerOptions.module", json!("ES2015")).unwrap();
        let mut twice = once.clone();
        set_json_path(&mut twice, "compilerOptions.module", json!("ES2015")).unwrap();
        assert_eq!(once, twice);
        assert_eq!(once["compilerOptions"]["strict"], json!(true));
    }

    #[test]
    fn test_push_unique() {
        let mut list = json!(["default"]);
        assert!(push_unique(&mut list, json!("!{projectRoot}/tools/**/*")).unwrap());
        assert!(!push_unique(&mut list, json!("!{projectRoot}/tools/**/*")).unwrap());
        assert_eq!(list, json!(["default", "!{projectRoot}/tools/**/*"]));
    }

    #[test]
    fn test_push_unique_on_null_creates_array() {
        let mut list = JsonValue::Null;
        push_unique(&mut list, json!("@swc/helpers")).unwrap();
        assert_eq!(list, json!(["@swc/helpers"]));
    }

    #[test]
    fn test_push_unique_rejects_non_array() {
        let mut value = json!("*.js");
        assert!(push_unique(&mut value, json!("*.mjs")).is_err());
    }

    #[test]
    fn test_fill_defaults_keeps_existing_values() {
        let mut target = json!({"name": "host", "scripts": {"test": "jest"}});
        let defaults = json!({"name": "lib", "version": "0.0.1", "scripts": {"build": "nx build"}});
        fill_defaults(&mut target, &defaults);
        assert_eq!(target["name"], json!("host"));
        assert_eq!(target["version"], json!("0.0.1"));
        assert_eq!(target["scripts"], json!({"test": "jest", "build": "nx build"}));
    }

    #[test]
    fn test_sort_keys() {
        let mut value = json!({"tslib": "^2.3.0", "is-ci": "^3.0.0", "@swc/helpers": "~0.5.2"});
        sort_keys(&mut value);
        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["@swc/helpers", "is-ci", "tslib"]);
    }

    #[test]
    fn test_to_pretty_string_has_trailing_newline() {
        let content = to_pretty_string(&json!({"a": 1})).unwrap();
        assert_eq!(content, "{\n  \"a\": 1\n}\n");
    }
}
