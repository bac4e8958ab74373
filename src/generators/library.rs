//! Publishable library scaffold
//!
//! Creates a root project built by `@nx/rollup:rollup`, tested by vitest and
//! linted by eslint, with a `publish` target backed by
//! `tools/scripts/publish.mjs`.

use log::debug;
use serde_json::{json, Value as JsonValue};

use super::{seed_json, to_camel_case};
use crate::defaults;
use crate::documents::{join_key, DocumentStore};
use crate::error::Result;
use crate::lint::LINT_CONFIG_FILE;
use crate::merge::json::fill_defaults;
use crate::package_json::{add_dependencies_to_manifest, PACKAGE_JSON};
use crate::project::{add_project_configuration, ProjectConfiguration};
use crate::tasks::Task;
use crate::workspace::{ensure_default_base, set_default_base, update_workspace};

/// Options of the library scaffold
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryOptions {
    pub name: String,
    /// Workspace-relative root; `.` makes it the root project
    pub root: String,
    /// Published package name
    pub import_path: String,
    /// Overrides the host's `defaultBase`, which otherwise falls back to `main`
    pub default_base: Option<String>,
}

/// Scaffold the library and register it with the store
pub fn generate(store: &mut DocumentStore, options: &LibraryOptions) -> Result<Vec<Task>> {
    debug!("scaffolding library {} at {}", options.name, options.root);
    let nx_version = host_nx_version(store);

    add_project_configuration(store, &options.name, &options.root, &project_configuration(options)?)?;
    update_manifest(store, options, &nx_version)?;
    seed_json(store, &key(options, "tsconfig.json"), &tsconfig())?;
    seed_json(store, &key(options, "tsconfig.lib.json"), &tsconfig_lib())?;
    seed_json(store, &key(options, "tsconfig.spec.json"), &tsconfig_spec())?;
    seed_json(store, &key(options, LINT_CONFIG_FILE), &lint_config())?;
    write_sources(store, options)?;
    update_workspace_defaults(store, options)?;

    Ok(vec![Task::InstallPackages])
}

fn key(options: &LibraryOptions, file: &str) -> String {
    join_key(&options.root, file)
}

/// The Nx version the host workspace pins, so plugins match it
fn host_nx_version(store: &DocumentStore) -> String {
    store
        .get(PACKAGE_JSON)
        .ok()
        .and_then(|pkg| {
            ["devDependencies", "dependencies"]
                .iter()
                .find_map(|section| pkg.get(section)?.get("nx")?.as_str().map(str::to_string))
        })
        .unwrap_or_else(|| defaults::NX_VERSION.to_string())
}

fn project_configuration(options: &LibraryOptions) -> Result<ProjectConfiguration> {
    let name = &options.name;
    let root = &options.root;
    let source_root = join_key(root, "src");
    let output_path = format!("dist/{}", if root == "." { name.as_str() } else { root.as_str() });
    let schema = if root == "." {
        "node_modules/nx/schemas/project-schema.json".to_string()
    } else {
        let depth = root.split('/').filter(|s| !s.is_empty()).count();
        format!("{}node_modules/nx/schemas/project-schema.json", "../".repeat(depth))
    };

    let config = json!({
        "name": name,
        "$schema": schema,
        "sourceRoot": source_root,
        "projectType": "library",
        "targets": {
            "build": {
                "executor": "@nx/rollup:rollup",
                "outputs": ["{options.outputPath}"],
                "options": {
                    "outputPath": output_path,
                    "main": join_key(root, "src/index.ts"),
                    "tsConfig": join_key(root, "tsconfig.lib.json"),
                    "assets": [],
                    "project": join_key(root, "package.json"),
                    "compiler": "swc",
                    "format": ["cjs", "esm"],
                    "rollupConfig": join_key(root, "rollup.config.js")
                }
            },
            "publish": {
                "command": format!("node {} {} {{args.ver}} {{args.tag}}", defaults::PUBLISH_SCRIPT, name),
                "dependsOn": ["build"]
            },
            "lint": {
                "executor": "@nx/eslint:lint",
                "outputs": ["{options.outputFile}"]
            },
            "test": {
                "executor": "@nx/vite:test",
                "outputs": ["{options.reportsDirectory}"],
                "options": {
                    "reportsDirectory": format!("coverage/{}", if root == "." { name.as_str() } else { root.as_str() })
                }
            }
        },
        "tags": []
    });
    Ok(serde_json::from_value(config)?)
}

fn update_manifest(store: &mut DocumentStore, options: &LibraryOptions, nx_version: &str) -> Result<()> {
    let key = key(options, PACKAGE_JSON);
    store.update_or(&key, json!({}), |pkg| {
        // published packages cannot be private
        if let Some(obj) = pkg.as_object_mut() {
            obj.shift_remove("private");
        }
        pkg["name"] = json!(options.import_path);
        if pkg.get("version").is_none() {
            pkg["version"] = json!(defaults::INITIAL_PACKAGE_VERSION);
        }
        fill_defaults(
            pkg,
            &json!({"scripts": {}, "dependencies": {}}),
        );
        add_dependencies_to_manifest(
            pkg,
            &[],
            &[
                ("@nx/eslint", nx_version),
                ("@nx/eslint-plugin", nx_version),
                ("@nx/js", nx_version),
                ("@nx/rollup", nx_version),
                ("@nx/vite", nx_version),
                ("@swc/core", defaults::SWC_CORE_VERSION),
                ("eslint", defaults::ESLINT_VERSION),
                ("jsonc-eslint-parser", defaults::JSONC_ESLINT_PARSER_VERSION),
                ("vite", defaults::VITE_VERSION),
                ("vitest", defaults::VITEST_VERSION),
            ],
        )
    })
}

fn tsconfig() -> JsonValue {
    json!({
        "compilerOptions": {
            "module": "commonjs",
            "forceConsistentCasingInFileNames": true,
            "strict": true,
            "noImplicitOverride": true,
            "noPropertyAccessFromIndexSignature": true,
            "noImplicitReturns": true,
            "noFallthroughCasesInSwitch": true,
            "types": ["vitest"]
        },
        "files": [],
        "include": [],
        "references": [
            {"path": "./tsconfig.lib.json"},
            {"path": "./tsconfig.spec.json"}
        ]
    })
}

fn tsconfig_lib() -> JsonValue {
    json!({
        "extends": "./tsconfig.json",
        "compilerOptions": {
            "outDir": "./dist/out-tsc",
            "declaration": true,
            "types": ["node"]
        },
        "include": ["src/**/*.ts"],
        "exclude": ["vite.config.ts", "src/**/*.spec.ts", "src/**/*.test.ts"]
    })
}

fn tsconfig_spec() -> JsonValue {
    json!({
        "extends": "./tsconfig.json",
        "compilerOptions": {
            "outDir": "./dist/out-tsc",
            "types": ["vitest/globals", "vitest/importMeta", "vite/client", "node"]
        },
        "include": [
            "vite.config.ts",
            "src/**/*.test.ts",
            "src/**/*.spec.ts",
            "src/**/*.d.ts"
        ]
    })
}

fn lint_config() -> JsonValue {
    json!({
        "root": true,
        "ignorePatterns": ["!**/*"],
        "plugins": ["@nx"],
        "overrides": [
            {
                "files": ["*.ts", "*.tsx"],
                "extends": ["plugin:@nx/typescript"],
                "rules": {}
            },
            {
                "files": ["*.js", "*.jsx"],
                "extends": ["plugin:@nx/javascript"],
                "rules": {}
            },
            {
                "files": ["*.json"],
                "parser": "jsonc-eslint-parser",
                "rules": {
                    (defaults::DEPENDENCY_CHECKS_RULE): "error"
                }
            }
        ]
    })
}

fn write_sources(store: &mut DocumentStore, options: &LibraryOptions) -> Result<()> {
    let name = &options.name;
    let ident = to_camel_case(name);
    let output_dir = if options.root == "." { name.as_str() } else { options.root.as_str() };

    let files = [
        (
            "README.md".to_string(),
            format!(
                "# {name}\n\nThis library was generated with [Nx](https://nx.dev).\n\n\
                 ## Building\n\nRun `nx build {name}` to build the library.\n\n\
                 ## Running unit tests\n\nRun `nx test {name}` to execute the unit tests via [Vitest](https://vitest.dev/).\n"
            ),
        ),
        (
            "rollup.config.js".to_string(),
            "// Extra rollup configuration, merged over the options of the build target\n\
             module.exports = (config) => config;\n"
                .to_string(),
        ),
        (
            "vite.config.ts".to_string(),
            format!(
                "/// <reference types='vitest' />\n\
                 import {{ defineConfig }} from 'vite';\n\n\
                 export default defineConfig({{\n  \
                   root: __dirname,\n  \
                   cacheDir: './node_modules/.vite/{name}',\n\n  \
                   test: {{\n    \
                     globals: true,\n    \
                     environment: 'node',\n    \
                     include: ['src/**/*.{{test,spec}}.{{js,mjs,cjs,ts,mts,cts,jsx,tsx}}'],\n    \
                     reporters: ['default'],\n    \
                     coverage: {{\n      \
                       reportsDirectory: './coverage/{output_dir}',\n      \
                       provider: 'v8',\n    \
                     }},\n  \
                   }},\n\
                 }});\n"
            ),
        ),
        ("src/index.ts".to_string(), format!("export * from './lib/{name}';\n")),
        (
            format!("src/lib/{name}.ts"),
            format!("export function {ident}(): string {{\n  return '{name}';\n}}\n"),
        ),
        (
            format!("src/lib/{name}.spec.ts"),
            format!(
                "import {{ {ident} }} from './{name}';\n\n\
                 describe('{ident}', () => {{\n  \
                   it('should work', () => {{\n    \
                     expect({ident}()).toEqual('{name}');\n  \
                   }});\n\
                 }});\n"
            ),
        ),
        (defaults::PUBLISH_SCRIPT.to_string(), PUBLISH_SCRIPT_SOURCE.to_string()),
    ];

    for (file, content) in files {
        store.write_text_if_absent(&key(options, &file), &content)?;
    }
    Ok(())
}

fn update_workspace_defaults(store: &mut DocumentStore, options: &LibraryOptions) -> Result<()> {
    update_workspace(store, |config| {
        fill_defaults(
            config,
            &json!({
                "namedInputs": {
                    "default": ["{projectRoot}/**/*", "sharedGlobals"],
                    "production": [
                        "default",
                        "!{projectRoot}/**/?(*.)+(spec|test).[jt]s?(x)?(.snap)",
                        "!{projectRoot}/tsconfig.spec.json",
                        "!{projectRoot}/.eslintrc.json"
                    ],
                    "sharedGlobals": []
                },
                "targetDefaults": {
                    "build": {
                        "cache": true,
                        "dependsOn": ["^build"],
                        "inputs": ["production", "^production"]
                    },
                    "lint": {"cache": true},
                    "test": {"cache": true, "inputs": ["default", "^production"]}
                }
            }),
        );
        Ok(())
    })?;
    match &options.default_base {
        Some(base) => set_default_base(store, base),
        None => ensure_default_base(store, defaults::DEFAULT_BASE),
    }
}

const PUBLISH_SCRIPT_SOURCE: &str = r#"/**
 * Publishes the built package to npm.
 *
 * Usage: node tools/scripts/publish.mjs {name} {version} {tag}
 */
import { execSync } from 'child_process';
import { readFileSync, writeFileSync } from 'fs';

import devkit from '@nx/devkit';
const { readCachedProjectGraph } = devkit;

function invariant(condition, message) {
  if (!condition) {
    console.error(message);
    process.exit(1);
  }
}

const [, , name, version, tag = 'next'] = process.argv;

const validVersion = /^\d+\.\d+\.\d+(-\w+\.\d+)?/;
invariant(
  version && validVersion.test(version),
  `No version provided or version did not match Semantic Versioning, expected: #.#.#-tag.# or #.#.#, got ${version}.`
);

const graph = readCachedProjectGraph();
const project = graph.nodes[name];

invariant(project, `Could not find project "${name}" in the workspace.`);

const outputPath = project.data?.targets?.build?.options?.outputPath;
invariant(outputPath, `Could not find "build.options.outputPath" of project "${name}".`);

process.chdir(outputPath);

try {
  const json = JSON.parse(readFileSync(`package.json`).toString());
  json.version = version;
  writeFileSync(`package.json`, JSON.stringify(json, null, 2));
} catch (e) {
  console.error(`Error reading package.json file from library build output.`);
}

execSync(`npm publish --access public --tag ${tag}`);
"#;
