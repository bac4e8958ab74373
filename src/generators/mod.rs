//! # Built-in delegated generators
//!
//! The preset builds on three installers, each of which seeds part of the
//! workspace before the preset adjusts it:
//!
//! - [`library`]: the publishable root library (project configuration,
//!   manifest, tsconfig files, lint configuration, sources, `nx.json`).
//! - [`versioning`]: the `version` target plus conventional commit tooling.
//! - [`deploy`]: the npm `deploy` target.
//!
//! Every generator only stages changes in the
//! [`DocumentStore`](crate::documents::DocumentStore) and returns the tasks it
//! needs run after commit. Text files the host already has are kept; JSON
//! documents the host already has are merged into, existing values winning.

pub mod deploy;
pub mod library;
pub mod versioning;

use serde_json::Value as JsonValue;

use crate::documents::DocumentStore;
use crate::error::Result;
use crate::merge::json::fill_defaults;

/// Merge `seed` into the document at `key`, creating it if absent
pub(crate) fn seed_json(store: &mut DocumentStore, key: &str, seed: &JsonValue) -> Result<()> {
    store.update_or(key, JsonValue::Object(Default::default()), |doc| {
        fill_defaults(doc, seed);
        Ok(())
    })
}

/// Turn a package-style name into a camelCase identifier
pub(crate) fn to_camel_case(name: &str) -> String {
    let mut ident = String::with_capacity(name.len());
    let mut upper_next = false;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            if upper_next && !ident.is_empty() {
                ident.push(c.to_ascii_uppercase());
            } else {
                ident.push(c);
            }
            upper_next = false;
        } else {
            upper_next = true;
        }
    }
    if ident.starts_with(|c: char| c.is_ascii_digit()) {
        ident.insert(0, '_');
    }
    ident
}
