//! End-to-end tests for the `gvrs-nx preset` command.

mod common;
use common::prelude::*;
use serde_json::json;

fn preset(fixture: &TestFixture) -> assert_cmd::Command {
    let mut cmd = fixture.command();
    cmd.arg("preset")
        .arg("--name")
        .arg("my-lib")
        .arg("--npm-scope")
        .arg("acme")
        .arg("--skip-install");
    cmd
}

#[test]
fn test_preset_help() {
    let mut cmd = cargo_bin_cmd!("gvrs-nx");
    cmd.arg("preset")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--npm-scope"))
        .stdout(predicate::str::contains("--local-registry"))
        .stdout(predicate::str::contains("--dry-run"));
}

#[test]
fn test_preset_prints_changes_and_husky_notice() {
    let fixture = TestFixture::new().with_host_workspace();

    preset(&fixture)
        .assert()
        .success()
        .stdout(predicate::str::contains("UPDATE package.json"))
        .stdout(predicate::str::contains("CREATE project.json"))
        .stdout(predicate::str::contains("CREATE .husky/commit-msg"))
        .stdout(predicate::str::contains("Husky is not yet enabled"))
        .stdout(predicate::str::contains("To enable Husky, run:"))
        .stdout(predicate::str::contains("npm run prepare"));
}

#[test]
fn test_preset_configures_deploy_for_local_registry() {
    let fixture = TestFixture::new().with_host_workspace();
    preset(&fixture).assert().success();

    let project = fixture.read_json("project.json");
    let deploy = &project["targets"]["deploy"];
    assert_eq!(deploy["executor"], "ngx-deploy-npm:deploy");
    assert_eq!(deploy["defaultConfiguration"], "local");
    assert_eq!(
        deploy["configurations"]["local"]["registry"],
        "http://localhost:4873"
    );
    assert_eq!(
        deploy["configurations"]["npm"]["registry"],
        "https://registry.npmjs.org"
    );
    assert!(project["targets"].get("publish").is_none());
    fixture
        .child("tools/scripts/publish.mjs")
        .assert(predicate::path::missing());
}

#[test]
fn test_preset_custom_local_registry() {
    let fixture = TestFixture::new().with_host_workspace();
    preset(&fixture)
        .arg("--local-registry")
        .arg("http://localhost:9000")
        .assert()
        .success();

    let project = fixture.read_json("project.json");
    assert_eq!(
        project["targets"]["deploy"]["configurations"]["local"]["registry"],
        "http://localhost:9000"
    );
}

#[test]
fn test_preset_writes_package_and_workspace_files() {
    let fixture = TestFixture::new().with_host_workspace();
    preset(&fixture).assert().success();

    let pkg = fixture.read_json("package.json");
    assert_eq!(pkg["name"], "@acme/my-lib");
    assert!(pkg["dependencies"]["tslib"].is_string());
    assert!(pkg["dependencies"].get("@gvrs-nx/ts-package").is_none());
    assert!(pkg["devDependencies"].get("@gvrs-nx/ts-package").is_some());
    assert!(pkg["devDependencies"].get("@jscutlery/semver").is_some());
    assert!(pkg["devDependencies"].get("ngx-deploy-npm").is_some());

    let nx = fixture.read_json("nx.json");
    assert_eq!(
        nx["namedInputs"]["production"],
        json!(["default", "!{projectRoot}/tools/**/*"])
    );

    let tsconfig = fixture.read_json("tsconfig.json");
    assert_eq!(tsconfig["compilerOptions"]["module"], "ES2015");

    let project = fixture.read_json("project.json");
    assert_eq!(project["targets"]["build"]["options"]["generateExportsField"], true);

    fixture
        .child("src/index.ts")
        .assert(predicate::path::exists());
}

#[test]
fn test_preset_commit_msg_hook() {
    let fixture = TestFixture::new().with_host_workspace();
    preset(&fixture).assert().success();

    fixture
        .child(".husky/commit-msg")
        .assert(predicate::str::contains(r#"commitlint --edit "$1""#));
    assert_eq!(
        fixture.read_json(".commitlintrc.json"),
        json!({"extends": ["@commitlint/config-conventional"], "rules": {}})
    );

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = std::fs::metadata(fixture.path().join(".husky/commit-msg"))
            .unwrap()
            .permissions()
            .mode();
        assert_ne!(mode & 0o111, 0, "commit-msg hook should be executable");
    }
}

#[test]
fn test_preset_lint_config() {
    let fixture = TestFixture::new().with_host_workspace();
    preset(&fixture).assert().success();

    let eslintrc = fixture.read_json(".eslintrc.json");
    let overrides = eslintrc["overrides"].as_array().unwrap();
    let js = overrides
        .iter()
        .find(|o| o["files"].as_array().unwrap().contains(&json!("*.js")))
        .unwrap();
    assert!(js["files"].as_array().unwrap().contains(&json!("*.mjs")));

    let checks = overrides
        .iter()
        .find_map(|o| o["rules"].get("@nx/dependency-checks"))
        .unwrap();
    assert_eq!(
        checks,
        &json!(["error", {"ignoredDependencies": ["@swc/helpers"]}])
    );
}

#[test]
fn test_preset_dry_run_writes_nothing() {
    let fixture = TestFixture::new().with_host_workspace();

    preset(&fixture)
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains("no changes were made"))
        .stdout(predicate::str::contains("CREATE project.json"))
        .stdout(predicate::str::contains("Husky").not());

    fixture.child("project.json").assert(predicate::path::missing());
    fixture
        .child("package.json")
        .assert(common::workspaces::HOST_PACKAGE_JSON);
}

#[test]
fn test_preset_options_file() {
    let fixture = TestFixture::new()
        .with_host_workspace()
        .with_file("preset.yaml", "name: from-file\nnpmScope: '@acme'\ndefaultBase: develop\n");

    fixture
        .command()
        .arg("preset")
        .arg("--options-file")
        .arg("preset.yaml")
        .arg("--skip-install")
        .assert()
        .success();

    assert_eq!(fixture.read_json("package.json")["name"], "@acme/from-file");
    assert_eq!(fixture.read_json("nx.json")["defaultBase"], "develop");
}

#[test]
fn test_preset_keeps_host_default_base() {
    let fixture = TestFixture::new()
        .with_host_workspace()
        .with_file("nx.json", r#"{"defaultBase": "develop"}"#);

    preset(&fixture).assert().success();

    assert_eq!(fixture.read_json("nx.json")["defaultBase"], "develop");
}

#[test]
fn test_preset_default_base_flag_overrides_host() {
    let fixture = TestFixture::new()
        .with_host_workspace()
        .with_file("nx.json", r#"{"defaultBase": "develop"}"#);

    preset(&fixture)
        .arg("--default-base")
        .arg("trunk")
        .assert()
        .success();

    assert_eq!(fixture.read_json("nx.json")["defaultBase"], "trunk");
}

#[test]
fn test_preset_directory_flag() {
    let fixture = TestFixture::new().with_file("ws/package.json", common::workspaces::HOST_PACKAGE_JSON);

    fixture
        .command()
        .arg("preset")
        .arg("--name")
        .arg("lib")
        .arg("--directory")
        .arg("ws")
        .arg("--skip-install")
        .assert()
        .success();

    fixture.child("ws/project.json").assert(predicate::path::exists());
    fixture.child("project.json").assert(predicate::path::missing());
}

#[test]
fn test_preset_invalid_name_fails_without_changes() {
    let fixture = TestFixture::new().with_host_workspace();

    fixture
        .command()
        .arg("preset")
        .arg("--name")
        .arg("My Lib")
        .arg("--skip-install")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid project name"));

    fixture.child("project.json").assert(predicate::path::missing());
}

#[test]
fn test_preset_ambiguous_lint_override_fails_without_changes() {
    let fixture = TestFixture::new().with_host_workspace().with_file(
        ".eslintrc.json",
        r#"{"overrides": [
            {"files": ["*.ts"], "rules": {"@nx/dependency-checks": "error"}},
            {"files": ["*.json"], "rules": {"@nx/dependency-checks": "warn"}}
        ]}"#,
    );

    preset(&fixture)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Ambiguous match"));

    fixture.child("project.json").assert(predicate::path::missing());
    fixture.child(".husky").assert(predicate::path::missing());
}
