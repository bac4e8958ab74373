//! Semantic versioning with `@jscutlery/semver`
//!
//! Adds a `version` target to each listed project. With conventional commits
//! enforced, commit messages are linted by commitlint from a husky
//! `commit-msg` hook.

use log::debug;
use serde_json::json;

use crate::defaults;
use crate::documents::DocumentStore;
use crate::error::Result;
use crate::filesystem::File;
use crate::package_json::{add_dependencies_to_package_json, set_script};
use crate::project::{update_project_configuration, TargetConfiguration};
use crate::tasks::Task;

/// Options of the semver installer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersioningOptions {
    pub projects: Vec<String>,
    /// Version all projects together instead of independently
    pub sync_versions: bool,
    pub enforce_conventional_commits: bool,
    pub commit_message_format: String,
    /// Changelog preset
    pub preset: String,
}

const COMMITLINT_CONFIG: &str = ".commitlintrc.json";
const COMMIT_MSG_HOOK: &str = ".husky/commit-msg";

const COMMIT_MSG_HOOK_SOURCE: &str = r#"#!/usr/bin/env sh
. "$(dirname -- "$0")/_/husky.sh"

npx --no -- commitlint --edit "$1"
"#;

/// Install semantic versioning for `options.projects`
pub fn generate(store: &mut DocumentStore, options: &VersioningOptions) -> Result<Vec<Task>> {
    for project in &options.projects {
        debug!("adding version target to {}", project);
        let target = version_target(options);
        update_project_configuration(store, project, |config| config.set_target("version", &target))?;
    }

    let mut dev_dependencies = Vec::new();
    if options.enforce_conventional_commits {
        store.set(
            COMMITLINT_CONFIG,
            &json!({
                "extends": ["@commitlint/config-conventional"],
                "rules": {}
            }),
        )?;
        store.write_file(COMMIT_MSG_HOOK, File::from_string(COMMIT_MSG_HOOK_SOURCE).executable())?;
        set_script(store, "prepare", "husky install")?;
        dev_dependencies.extend([
            ("@commitlint/cli", defaults::COMMITLINT_VERSION),
            ("@commitlint/config-conventional", defaults::COMMITLINT_VERSION),
            ("husky", defaults::HUSKY_VERSION),
        ]);
    }
    dev_dependencies.push(("@jscutlery/semver", defaults::JSCUTLERY_SEMVER_VERSION));
    add_dependencies_to_package_json(store, &[], &dev_dependencies)?;

    Ok(vec![Task::InstallPackages])
}

fn version_target(options: &VersioningOptions) -> TargetConfiguration {
    let mut target = TargetConfiguration::with_executor("@jscutlery/semver:version");
    target
        .options
        .insert("preset".to_string(), json!(options.preset));
    target.options.insert(
        "commitMessageFormat".to_string(),
        json!(options.commit_message_format),
    );
    if options.sync_versions {
        target.options.insert("syncVersions".to_string(), json!(true));
    }
    target
}
