//! Property-based tests for the preset building blocks.
//!
//! These tests use proptest to generate random inputs and verify that
//! invariants hold for all possible inputs.

#[cfg(test)]
mod proptest_tests {
    use crate::lint::find_single;
    use crate::merge::json::push_unique;
    use crate::package_json::{add_dependencies_to_manifest, pick_version};
    use crate::preset::{normalize, PresetOptions};
    use proptest::prelude::*;
    use serde_json::{json, Value as JsonValue};

    fn version() -> impl Strategy<Value = String> {
        (0u64..20, 0u64..20, 0u64..20, prop_oneof![Just(""), Just("^"), Just("~")])
            .prop_map(|(major, minor, patch, prefix)| format!("{}{}.{}.{}", prefix, major, minor, patch))
    }

    proptest! {
        /// Property: the import path is `@scope/name`, and a leading '@' on the scope is ignored
        #[test]
        fn import_path_joins_scope_and_name(
            name in "[a-z][a-z0-9-]{0,20}",
            scope in "[a-z][a-z0-9-]{0,20}",
        ) {
            let plain = normalize(&PresetOptions {
                name: Some(name.clone()),
                npm_scope: Some(scope.clone()),
                ..Default::default()
            }).unwrap();
            let prefixed = normalize(&PresetOptions {
                name: Some(name.clone()),
                npm_scope: Some(format!("@{}", scope)),
                ..Default::default()
            }).unwrap();

            prop_assert_eq!(&plain.import_path, &format!("@{}/{}", scope, name));
            prop_assert_eq!(plain, prefixed);
        }

        /// Property: names with uppercase letters are always rejected
        #[test]
        fn uppercase_names_rejected(name in "[a-z]{0,5}[A-Z][a-zA-Z]{0,5}") {
            let result = normalize(&PresetOptions {
                name: Some(name),
                ..Default::default()
            });
            prop_assert!(result.is_err());
        }

        /// Property: pick_version returns one of its inputs and is idempotent
        #[test]
        fn pick_version_is_stable(a in version(), b in version()) {
            let picked = pick_version(&a, &b);
            prop_assert!(picked == a || picked == b);
            prop_assert_eq!(pick_version(picked, &b), picked);
        }

        /// Property: declaring the same dependencies twice changes nothing the second time
        #[test]
        fn add_dependencies_is_idempotent(
            deps in prop::collection::btree_map("[a-z]{1,8}", version(), 0..5),
            dev_deps in prop::collection::btree_map("[a-z]{1,8}", version(), 0..5),
        ) {
            let deps: Vec<(&str, &str)> = deps.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
            let dev_deps: Vec<(&str, &str)> = dev_deps.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();

            let mut manifest = json!({"name": "pkg"});
            add_dependencies_to_manifest(&mut manifest, &deps, &dev_deps).unwrap();
            let once = manifest.clone();
            add_dependencies_to_manifest(&mut manifest, &deps, &dev_deps).unwrap();
            prop_assert_eq!(&manifest, &once);

            // nothing is declared in both sections
            if let (Some(prod), Some(dev)) = (manifest.get("dependencies"), manifest.get("devDependencies")) {
                for key in prod.as_object().unwrap().keys() {
                    prop_assert!(dev.get(key).is_none());
                }
            }
        }

        /// Property: push_unique never duplicates an entry
        #[test]
        fn push_unique_never_duplicates(items in prop::collection::vec("[a-c]{1,2}", 0..20)) {
            let mut list = json!([]);
            for item in &items {
                push_unique(&mut list, JsonValue::String(item.clone())).unwrap();
            }
            let values = list.as_array().unwrap();
            for (i, value) in values.iter().enumerate() {
                prop_assert!(!values[i + 1..].contains(value));
            }
            for item in &items {
                prop_assert!(values.contains(&JsonValue::String(item.clone())));
            }
        }

        /// Property: find_single succeeds exactly when one item matches
        #[test]
        fn find_single_requires_exactly_one(items in prop::collection::vec(0u8..4, 0..10)) {
            let matches = items.iter().filter(|i| **i == 0).count();
            let result = find_single(&items, "item is zero", |i| *i == 0);
            prop_assert_eq!(result.is_ok(), matches == 1);
        }
    }
}
