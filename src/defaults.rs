//! Default values for the gvrs-nx plugins.
//!
//! This module centralizes the package versions, registries and document
//! entries the preset writes, so the steps and the built-in generators agree
//! on them.

/// Name of the package shipping the preset
pub const PLUGIN_PACKAGE: &str = "@gvrs-nx/ts-package";

/// Version the preset pins itself at in `devDependencies`
pub const PLUGIN_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initial version of a scaffolded package
pub const INITIAL_PACKAGE_VERSION: &str = "0.0.1";

/// Default branch affected commands compare against
pub const DEFAULT_BASE: &str = "main";

/// Nx version used when the host workspace does not pin one
pub const NX_VERSION: &str = "17.1.3";

pub const VITE_VERSION: &str = "^5.0.0";
pub const VITEST_VERSION: &str = "^1.0.4";
pub const SWC_CORE_VERSION: &str = "~1.3.85";
pub const ESLINT_VERSION: &str = "~8.48.0";
pub const JSONC_ESLINT_PARSER_VERSION: &str = "^2.1.0";
pub const TSLIB_VERSION: &str = "^2.3.0";
pub const IS_CI_VERSION: &str = "^3.0.0";
pub const JSCUTLERY_SEMVER_VERSION: &str = "^5.2.0";
pub const COMMITLINT_VERSION: &str = "^19.0.0";
pub const HUSKY_VERSION: &str = "^8.0.3";
pub const NGX_DEPLOY_NPM_VERSION: &str = "^8.0.1";

/// Registry of the `local` deploy configuration
pub const LOCAL_REGISTRY: &str = "http://localhost:4873";

/// Registry of the `npm` deploy configuration
pub const NPM_REGISTRY: &str = "https://registry.npmjs.org";

/// Lint rule whose ignore list must admit the swc runtime helpers
pub const DEPENDENCY_CHECKS_RULE: &str = "@nx/dependency-checks";

/// Runtime helpers emitted by the swc compiler
pub const SWC_HELPERS_PACKAGE: &str = "@swc/helpers";

/// Named input that decides which files invalidate production builds
pub const PRODUCTION_INPUT: &str = "production";

/// Release helper scripts are not production inputs
pub const TOOLS_EXCLUSION: &str = "!{projectRoot}/tools/**/*";

/// Script the library scaffold ships for publishing; the deploy target
/// replaces it
pub const PUBLISH_SCRIPT: &str = "tools/scripts/publish.mjs";

/// Release commit message used by the version target
pub const RELEASE_COMMIT_FORMAT: &str = "chore: release version {version} [skip ci]";

/// `prepare` script: install the git hooks, except outside a git checkout
/// and on CI
pub const PREPARE_SCRIPT: &str = "node -e \"if(require('fs').existsSync('.git')){/* proceed only if .git is found */ process.exit(1)}\" || is-ci || husky install";

/// Target the publint executor runs as when none is given
pub const PUBLINT_TARGET: &str = "publint";

/// Environment variable replacing the publint command line
pub const PUBLINT_COMMAND_ENV: &str = "GVRS_NX_PUBLINT_COMMAND";
