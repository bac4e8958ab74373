//! Shared test utilities for E2E tests.
//!
//! Add `mod common;` to a test file, then use the helpers:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = TestFixture::new().with_host_workspace();
//!     fixture.command().arg("preset").arg("--name").arg("lib").assert().success();
//! }
//! ```

use assert_fs::prelude::*;
use serde_json::Value as JsonValue;
use std::path::Path;

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use assert_fs::TempDir;
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::workspaces;
    pub use super::TestFixture;
}

/// Workspace file contents used across tests.
#[allow(dead_code)]
pub mod workspaces {
    /// `package.json` of a workspace freshly created with the preset.
    pub const HOST_PACKAGE_JSON: &str = r#"{
  "name": "@acme/source",
  "version": "0.0.0",
  "license": "MIT",
  "private": true,
  "dependencies": {
    "@gvrs-nx/ts-package": "0.3.0"
  },
  "devDependencies": {
    "nx": "17.1.3"
  }
}
"#;

    pub const HOST_NX_JSON: &str = r#"{
  "$schema": "./node_modules/nx/schemas/nx-schema.json",
  "namedInputs": {
    "default": ["{projectRoot}/**/*"],
    "production": ["default"]
  }
}
"#;

    /// Root project with a build target and a publint target.
    pub const PUBLINT_PROJECT_JSON: &str = r#"{
  "name": "lib",
  "targets": {
    "build": {
      "executor": "@nx/rollup:rollup",
      "options": {"outputPath": "dist/lib"}
    },
    "lint": {"executor": "@nx/eslint:lint"},
    "publint": {
      "executor": "@gvrs-nx/ts-package:publint",
      "options": {"buildTarget": "build"}
    }
  }
}
"#;
}

/// A temporary workspace directory.
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

impl TestFixture {
    /// Create a new test fixture with an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Add the `package.json` and `nx.json` of a freshly created workspace.
    #[allow(dead_code)]
    pub fn with_host_workspace(self) -> Self {
        self.with_file("package.json", workspaces::HOST_PACKAGE_JSON)
            .with_file("nx.json", workspaces::HOST_NX_JSON)
    }

    /// Add a file with the given path and content.
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    /// Get the path to the temporary directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Create a child path in the temp directory.
    #[allow(dead_code)]
    pub fn child(&self, path: &str) -> assert_fs::fixture::ChildPath {
        self.temp_dir.child(path)
    }

    /// Parse a JSON file of the workspace.
    #[allow(dead_code)]
    pub fn read_json(&self, path: &str) -> JsonValue {
        let content = std::fs::read_to_string(self.path().join(path))
            .unwrap_or_else(|e| panic!("Failed to read {}: {}", path, e));
        serde_json::from_str(&content).unwrap_or_else(|e| panic!("Invalid JSON in {}: {}", path, e))
    }

    /// Create a command configured to run in this fixture's directory.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("gvrs-nx");
        cmd.current_dir(self.path())
            .env_remove("NX_VERBOSE_LOGGING")
            .env_remove("GVRS_NX_PUBLINT_COMMAND")
            .env_remove("GVRS_NX_PRESET_OPTIONS")
            .env("NO_COLOR", "1");
        cmd
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_with_host_workspace() {
        let fixture = TestFixture::new().with_host_workspace();
        assert_eq!(fixture.read_json("package.json")["name"], "@acme/source");
        assert!(fixture.path().join("nx.json").exists());
    }
}
