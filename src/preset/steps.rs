//! The preset's mutation steps
//!
//! Steps run in the order of [`PRESET_STEPS`]. The order matters:
//!
//! - the library scaffold seeds every document the later steps edit;
//! - the deploy installer needs the `build` target and runs after the semver
//!   installer, so both see the same project configuration;
//! - the publish target is only dropped once the deploy target replaces it.
//!
//! Each step is idempotent with respect to its own edits: running it again
//! on its own output changes nothing.

use log::debug;
use serde_json::{json, Map};

use super::NormalizedOptions;
use crate::defaults;
use crate::documents::{join_key, DocumentStore};
use crate::error::Result;
use crate::generators::deploy::{self, Access, DeployOptions};
use crate::generators::library::{self, LibraryOptions};
use crate::generators::versioning::{self, VersioningOptions};
use crate::lint::{
    add_file_glob, append_rule_option, has_rule, override_files, update_override_in_lint_config,
};
use crate::merge::json::set_json_path;
use crate::package_json::{add_dependencies_to_package_json, move_to_dev_dependencies, set_script};
use crate::project::{project_root, update_project_configuration};
use crate::tasks::{Notice, Task};
use crate::workspace::add_named_input_entry;

/// Signature shared by every step
pub type StepFn = fn(&mut DocumentStore, &NormalizedOptions) -> Result<Vec<Task>>;

/// A named mutation
#[derive(Clone, Copy)]
pub struct Step {
    pub name: &'static str,
    pub run: StepFn,
}

impl std::fmt::Debug for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Step").field("name", &self.name).finish()
    }
}

/// The fixed step plan of the preset
pub const PRESET_STEPS: &[Step] = &[
    Step { name: "generate-library", run: generate_library },
    Step { name: "enable-exports-field", run: enable_exports_field },
    Step { name: "set-module-resolution", run: set_module_resolution },
    Step { name: "allow-swc-helpers", run: allow_swc_helpers },
    Step { name: "lint-mjs-files", run: lint_mjs_files },
    Step { name: "exclude-tools-from-production", run: exclude_tools_from_production },
    Step { name: "add-tslib", run: add_tslib },
    Step { name: "install-semver", run: install_semver },
    Step { name: "move-plugin-to-dev-dependencies", run: move_plugin_to_dev_dependencies },
    Step { name: "install-deploy", run: install_deploy },
    Step { name: "husky-notice", run: husky_notice },
];

fn generate_library(store: &mut DocumentStore, options: &NormalizedOptions) -> Result<Vec<Task>> {
    library::generate(
        store,
        &LibraryOptions {
            name: options.name.clone(),
            root: ".".to_string(),
            import_path: options.import_path.clone(),
            default_base: options.default_base.clone(),
        },
    )
}

/// Emit an `exports` map in the built `package.json`
fn enable_exports_field(store: &mut DocumentStore, options: &NormalizedOptions) -> Result<Vec<Task>> {
    update_project_configuration(store, &options.name, |config| {
        config.update_target("build", |build| {
            build
                .options
                .insert("generateExportsField".to_string(), json!(true));
            Ok(())
        })
    })?;
    Ok(Vec::new())
}

/// Bundle with ES module syntax so rollup can tree-shake
fn set_module_resolution(store: &mut DocumentStore, options: &NormalizedOptions) -> Result<Vec<Task>> {
    let root = project_root(store, &options.name)?;
    let key = join_key(&root, "tsconfig.json");
    store.update(&key, |tsconfig| {
        set_json_path(tsconfig, "compilerOptions.module", json!("ES2015"))
    })?;
    Ok(Vec::new())
}

/// rollup with the swc compiler imports `@swc/helpers` at runtime without
/// declaring it
fn allow_swc_helpers(store: &mut DocumentStore, options: &NormalizedOptions) -> Result<Vec<Task>> {
    let root = project_root(store, &options.name)?;
    update_override_in_lint_config(
        store,
        &root,
        &format!("rules contain '{}'", defaults::DEPENDENCY_CHECKS_RULE),
        |entry| has_rule(entry, defaults::DEPENDENCY_CHECKS_RULE),
        |entry| {
            append_rule_option(
                entry,
                defaults::DEPENDENCY_CHECKS_RULE,
                "ignoredDependencies",
                defaults::SWC_HELPERS_PACKAGE,
            )
        },
    )?;
    Ok(Vec::new())
}

fn lint_mjs_files(store: &mut DocumentStore, options: &NormalizedOptions) -> Result<Vec<Task>> {
    let root = project_root(store, &options.name)?;
    update_override_in_lint_config(
        store,
        &root,
        "files contain '*.js'",
        |entry| override_files(entry).contains(&"*.js"),
        |entry| add_file_glob(entry, "*.mjs"),
    )?;
    Ok(Vec::new())
}

/// Changes under `tools/` neither invalidate builds nor count for
/// dependency checks
fn exclude_tools_from_production(
    store: &mut DocumentStore,
    _options: &NormalizedOptions,
) -> Result<Vec<Task>> {
    add_named_input_entry(store, defaults::PRODUCTION_INPUT, defaults::TOOLS_EXCLUSION)?;
    Ok(Vec::new())
}

/// The rollup typescript plugin needs `tslib` at runtime
fn add_tslib(store: &mut DocumentStore, _options: &NormalizedOptions) -> Result<Vec<Task>> {
    add_dependencies_to_package_json(store, &[("tslib", defaults::TSLIB_VERSION)], &[])?;
    Ok(vec![Task::InstallPackages])
}

fn install_semver(store: &mut DocumentStore, options: &NormalizedOptions) -> Result<Vec<Task>> {
    let mut tasks = versioning::generate(
        store,
        &VersioningOptions {
            projects: vec![options.name.clone()],
            sync_versions: false,
            enforce_conventional_commits: true,
            commit_message_format: defaults::RELEASE_COMMIT_FORMAT.to_string(),
            preset: "conventional".to_string(),
        },
    )?;

    set_script(store, "prepare", defaults::PREPARE_SCRIPT)?;
    add_dependencies_to_package_json(
        store,
        &[],
        &[
            ("@jscutlery/semver", defaults::JSCUTLERY_SEMVER_VERSION),
            ("is-ci", defaults::IS_CI_VERSION),
        ],
    )?;
    tasks.push(Task::InstallPackages);
    Ok(tasks)
}

/// The preset is only needed to scaffold the workspace
fn move_plugin_to_dev_dependencies(
    store: &mut DocumentStore,
    _options: &NormalizedOptions,
) -> Result<Vec<Task>> {
    move_to_dev_dependencies(store, defaults::PLUGIN_PACKAGE, defaults::PLUGIN_VERSION)?;
    Ok(vec![Task::InstallPackages])
}

fn install_deploy(store: &mut DocumentStore, options: &NormalizedOptions) -> Result<Vec<Task>> {
    let tasks = deploy::generate(
        store,
        &DeployOptions {
            projects: vec![options.name.clone()],
            access: Access::Public,
        },
    )?;

    store.delete(defaults::PUBLISH_SCRIPT)?;

    // publish to the local registry unless told otherwise
    let mut configurations = Map::new();
    configurations.insert(
        "local".to_string(),
        json!({"registry": options.local_registry}),
    );
    configurations.insert(
        "npm".to_string(),
        json!({"registry": defaults::NPM_REGISTRY}),
    );

    update_project_configuration(store, &options.name, |config| {
        config.remove_target("publish");
        config.update_target("deploy", |deploy| {
            deploy.configurations = configurations;
            deploy.default_configuration = Some("local".to_string());
            Ok(())
        })
    })?;

    Ok(tasks)
}

fn husky_notice(_store: &mut DocumentStore, _options: &NormalizedOptions) -> Result<Vec<Task>> {
    debug!("queueing husky notice");
    Ok(vec![Task::Notice(Notice::EnableHusky)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preset::{normalize, PresetOptions};
    use crate::project::read_project_configuration;
    use crate::workspace::read_workspace;

    fn options() -> NormalizedOptions {
        normalize(&PresetOptions {
            name: Some("my-lib".to_string()),
            npm_scope: Some("acme".to_string()),
            ..Default::default()
        })
        .unwrap()
    }

    fn store() -> DocumentStore {
        let mut store = DocumentStore::default();
        store
            .set(
                "package.json",
                &json!({
                    "name": "@acme/source",
                    "dependencies": {"@gvrs-nx/ts-package": "0.3.0"},
                    "devDependencies": {"nx": "17.1.3"}
                }),
            )
            .unwrap();
        store
    }

    fn run_until(store: &mut DocumentStore, last: &str) -> Vec<Task> {
        let opts = options();
        let mut tasks = Vec::new();
        for step in PRESET_STEPS {
            tasks.extend((step.run)(store, &opts).unwrap());
            if step.name == last {
                break;
            }
        }
        tasks
    }

    fn step(name: &str) -> Step {
        *PRESET_STEPS.iter().find(|s| s.name == name).unwrap()
    }

    #[test]
    fn test_plan_order() {
        let names: Vec<&str> = PRESET_STEPS.iter().map(|s| s.name).collect();
        assert_eq!(
            names,
            vec![
                "generate-library",
                "enable-exports-field",
                "set-module-resolution",
                "allow-swc-helpers",
                "lint-mjs-files",
                "exclude-tools-from-production",
                "add-tslib",
                "install-semver",
                "move-plugin-to-dev-dependencies",
                "install-deploy",
                "husky-notice",
            ]
        );
    }

    #[test]
    fn test_enable_exports_field() {
        let mut store = store();
        run_until(&mut store, "enable-exports-field");
        let build = read_project_configuration(&store, "my-lib")
            .unwrap()
            .target("build")
            .unwrap();
        assert_eq!(build.options["generateExportsField"], json!(true));
    }

    #[test]
    fn test_set_module_resolution_is_idempotent() {
        let mut store = store();
        run_until(&mut store, "set-module-resolution");
        let once = store.get("tsconfig.json").unwrap();
        (step("set-module-resolution").run)(&mut store, &options()).unwrap();

        assert_eq!(store.get("tsconfig.json").unwrap(), once);
        assert_eq!(once["compilerOptions"]["module"], json!("ES2015"));
        assert_eq!(once["compilerOptions"]["strict"], json!(true));
    }

    #[test]
    fn test_lint_steps_are_idempotent() {
        let mut store = store();
        run_until(&mut store, "lint-mjs-files");
        let once = store.get(".eslintrc.json").unwrap();

        (step("allow-swc-helpers").run)(&mut store, &options()).unwrap();
        (step("lint-mjs-files").run)(&mut store, &options()).unwrap();

        let twice = store.get(".eslintrc.json").unwrap();
        assert_eq!(twice, once);
        assert_eq!(
            twice["overrides"][1]["files"],
            json!(["*.js", "*.jsx", "*.mjs"])
        );
        assert_eq!(
            twice["overrides"][2]["rules"]["@nx/dependency-checks"],
            json!(["error", {"ignoredDependencies": ["@swc/helpers"]}])
        );
    }

    #[test]
    fn test_allow_swc_helpers_keeps_existing_options() {
        let mut store = store();
        run_until(&mut store, "set-module-resolution");
        store
            .update(".eslintrc.json", |config| {
                config["overrides"][2]["rules"]["@nx/dependency-checks"] =
                    json!(["warn", {"ignoredFiles": ["vite.config.ts"]}]);
                Ok(())
            })
            .unwrap();

        (step("allow-swc-helpers").run)(&mut store, &options()).unwrap();

        assert_eq!(
            store.get(".eslintrc.json").unwrap()["overrides"][2]["rules"]["@nx/dependency-checks"],
            json!(["warn", {"ignoredFiles": ["vite.config.ts"], "ignoredDependencies": ["@swc/helpers"]}])
        );
    }

    #[test]
    fn test_exclude_tools_from_production() {
        let mut store = store();
        run_until(&mut store, "exclude-tools-from-production");
        let production = read_workspace(&store).unwrap()["namedInputs"]["production"].clone();
        assert_eq!(
            production.as_array().unwrap().last(),
            Some(&json!("!{projectRoot}/tools/**/*"))
        );
    }

    #[test]
    fn test_install_semver_sets_prepare_script() {
        let mut store = store();
        run_until(&mut store, "install-semver");
        let pkg = store.get("package.json").unwrap();
        assert_eq!(pkg["scripts"]["prepare"], json!(defaults::PREPARE_SCRIPT));
        assert_eq!(pkg["devDependencies"]["is-ci"], json!("^3.0.0"));
        assert!(pkg["devDependencies"].get("@jscutlery/semver").is_some());
        assert_eq!(pkg["dependencies"]["tslib"], json!("^2.3.0"));
    }

    #[test]
    fn test_move_plugin_to_dev_dependencies() {
        let mut store = store();
        run_until(&mut store, "move-plugin-to-dev-dependencies");
        let pkg = store.get("package.json").unwrap();
        assert!(pkg["dependencies"].get("@gvrs-nx/ts-package").is_none());
        assert_eq!(
            pkg["devDependencies"]["@gvrs-nx/ts-package"],
            json!(defaults::PLUGIN_VERSION)
        );
    }

    #[test]
    fn test_install_deploy_replaces_publish() {
        let mut store = store();
        run_until(&mut store, "install-deploy");

        assert!(!store.exists("tools/scripts/publish.mjs"));
        let config = read_project_configuration(&store, "my-lib").unwrap();
        assert!(!config.has_target("publish"));

        let deploy = config.target("deploy").unwrap();
        assert_eq!(deploy.default_configuration.as_deref(), Some("local"));
        assert_eq!(
            serde_json::Value::Object(deploy.configurations),
            json!({
                "local": {"registry": "http://localhost:4873"},
                "npm": {"registry": "https://registry.npmjs.org"}
            })
        );
        assert!(config.validate_depends_on("my-lib").is_ok());
    }

    #[test]
    fn test_husky_notice_is_last_task() {
        let mut store = store();
        let tasks = run_until(&mut store, "husky-notice");
        assert_eq!(tasks.last(), Some(&Task::Notice(Notice::EnableHusky)));
    }
}
