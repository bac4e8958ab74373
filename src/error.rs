//! # Error Handling
//!
//! This module defines the centralized error type for the `gvrs-nx` plugins.
//! It uses `thiserror` to build an `Error` enum covering every failure mode of
//! the preset pipeline and the publint executor.
//!
//! ## Taxonomy
//!
//! - **`Configuration`**: a required option is missing or contradictory. Raised
//!   before any side effect happens.
//! - **`Resolution`**: a referenced project, target or output path cannot be
//!   determined. Carries the name that was looked up.
//! - **`AmbiguousMatch`**: a single-match lookup over a configuration list found
//!   zero or several candidates. Never resolved automatically.
//! - **`NotFound`**: a document was read or updated without existing.
//! - **`Document`**: a document exists but is not valid JSON.
//!
//! A failing lint run is deliberately *not* an error: the executor reports it
//! as `ExecutorResult { success: false }`.

use thiserror::Error;

/// Main error type for gvrs-nx operations
#[derive(Error, Debug)]
pub enum Error {
    /// A required option is missing or options contradict each other.
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// A project, target or output path could not be resolved.
    #[error("Resolution error for '{target}': {message}")]
    Resolution { target: String, message: String },

    /// A single-match lookup found zero or more than one candidate.
    #[error("Ambiguous match: expected exactly one entry where {description}, found {matches}")]
    AmbiguousMatch { description: String, matches: usize },

    /// A document key does not exist in the tree.
    #[error("Document not found: {key}")]
    NotFound { key: String },

    /// A document exists but could not be parsed or has an unexpected shape.
    #[error("Invalid document {path}: {message}")]
    Document { path: String, message: String },

    /// An error occurred while staging or committing files.
    #[error("Filesystem operation error: {message}")]
    Filesystem { message: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON error, wrapped from `serde_json::Error`.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A YAML parsing error, wrapped from `serde_yaml::Error`.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A regular expression error, wrapped from `regex::Error`.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    /// A glob pattern error, wrapped from `glob::PatternError`.
    #[error("Glob pattern error: {0}")]
    Glob(#[from] glob::PatternError),

    /// A URL parsing error, wrapped from `url::ParseError`.
    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// A semantic versioning parsing error, wrapped from `semver::Error`.
    #[error("Semver parsing error: {0}")]
    Semver(#[from] semver::Error),
}

impl Error {
    /// Shorthand for a [`Error::Configuration`] error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Error::Configuration {
            message: message.into(),
        }
    }

    /// Shorthand for a [`Error::Resolution`] error.
    pub fn resolution(target: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Resolution {
            target: target.into(),
            message: message.into(),
        }
    }

    /// Shorthand for a [`Error::Document`] error.
    pub fn document(path: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Document {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
