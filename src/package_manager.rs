//! Package manager detection
//!
//! The package manager is inferred from the lock file present at the
//! workspace root. Without a lock file the workspace is assumed to use npm.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::filesystem::Tree;

/// The package managers a workspace can use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageManager {
    #[default]
    Npm,
    Yarn,
    Pnpm,
    Bun,
}

impl PackageManager {
    /// Detect the package manager from the lock files visible in `tree`
    pub fn detect(tree: &Tree) -> Self {
        if tree.exists("bun.lockb") {
            PackageManager::Bun
        } else if tree.exists("pnpm-lock.yaml") {
            PackageManager::Pnpm
        } else if tree.exists("yarn.lock") {
            PackageManager::Yarn
        } else {
            PackageManager::Npm
        }
    }

    /// Command prefix that runs a binary from an installed package
    pub fn exec(&self) -> &'static [&'static str] {
        match self {
            PackageManager::Npm => &["npx"],
            PackageManager::Yarn => &["yarn"],
            PackageManager::Pnpm => &["pnpm", "exec"],
            PackageManager::Bun => &["bunx"],
        }
    }

    /// Command line installing the dependencies declared in `package.json`
    pub fn install_command(&self) -> Vec<String> {
        vec![self.to_string(), "install".to_string()]
    }

    /// Command line running a `package.json` script
    pub fn run_command(&self, script: &str) -> String {
        format!("{} run {}", self, script)
    }
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PackageManager::Npm => "npm",
            PackageManager::Yarn => "yarn",
            PackageManager::Pnpm => "pnpm",
            PackageManager::Bun => "bun",
        };
        f.write_str(name)
    }
}
