//! # The publint executor
//!
//! Lints the package a build produced with the `publint` tool. The package
//! directory comes either straight from `buildOutputPath`, or from the
//! output path recorded by another target (`buildTarget`).
//!
//! A lint failure is an expected outcome, not an error: [`run_executor`]
//! reports it as `ExecutorResult { success: false }`. Errors are reserved for
//! options that cannot be acted on, and they are raised before any process
//! is spawned.

use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::defaults;
use crate::error::{Error, Result};
use crate::filesystem::Tree;
use crate::package_manager::PackageManager;
use crate::workspace::{ProjectGraph, ProjectNode};

/// Lowest severity publint reports
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    #[default]
    Suggestion,
    Warning,
    Error,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self {
            Level::Suggestion => "suggestion",
            Level::Warning => "warning",
            Level::Error => "error",
        };
        f.write_str(level)
    }
}

fn default_strict() -> bool {
    true
}

/// Options of the executor, as stored in a target's `options`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublintOptions {
    #[serde(default)]
    pub build_target: Option<String>,
    #[serde(default)]
    pub build_output_path: Option<String>,
    #[serde(default)]
    pub level: Level,
    #[serde(default = "default_strict")]
    pub strict: bool,
}

impl Default for PublintOptions {
    fn default() -> Self {
        Self {
            build_target: None,
            build_output_path: None,
            level: Level::default(),
            strict: default_strict(),
        }
    }
}

/// What the executor knows about the workspace it runs in
#[derive(Debug)]
pub struct ExecutorContext {
    /// Project the executor runs for; target strings without a project refer to it
    pub project_name: Option<String>,
    pub graph: ProjectGraph,
    pub verbose: bool,
}

impl ExecutorContext {
    /// Build a context by discovering the projects below `workspace_root`
    pub fn load(workspace_root: &Path, project_name: Option<String>, verbose: bool) -> Result<Self> {
        Ok(Self {
            project_name,
            graph: ProjectGraph::load(workspace_root)?,
            verbose,
        })
    }

    pub fn workspace_root(&self) -> &Path {
        self.graph.workspace_root()
    }
}

/// Result reported back to the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExecutorResult {
    pub success: bool,
}

/// A parsed `project:target:configuration` reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetString {
    pub project: String,
    pub target: String,
    pub configuration: Option<String>,
}

/// Parse a target reference
///
/// A bare `target` refers to `default_project`.
pub fn parse_target_string(value: &str, default_project: Option<&str>) -> Result<TargetString> {
    let parts: Vec<&str> = value.split(':').collect();
    let parsed = match parts.as_slice() {
        [target] => default_project.map(|project| (project, *target, None)),
        [project, target] => Some((*project, *target, None)),
        [project, target, configuration] => Some((*project, *target, Some(*configuration))),
        _ => None,
    };
    match parsed {
        Some((project, target, configuration))
            if !project.is_empty()
                && !target.is_empty()
                && configuration.map_or(true, |c| !c.is_empty()) =>
        {
            Ok(TargetString {
                project: project.to_string(),
                target: target.to_string(),
                configuration: configuration.map(str::to_string),
            })
        }
        _ => Err(Error::resolution(value, format!("Invalid buildTarget: {}", value))),
    }
}

/// Replace `{workspaceRoot}`, `{projectRoot}`, `{projectName}` and
/// `{options.*}` placeholders in a target output
///
/// Returns `None` when a placeholder has no value.
pub fn interpolate_output(
    output: &str,
    workspace_root: &Path,
    project: &ProjectNode,
    options: &Map<String, JsonValue>,
) -> Option<String> {
    let mut result = String::with_capacity(output.len());
    let mut rest = output;
    while let Some(start) = rest.find('{') {
        result.push_str(&rest[..start]);
        let end = rest[start..].find('}')? + start;
        let token = &rest[start + 1..end];
        let value = match token {
            "workspaceRoot" => workspace_root.to_string_lossy().into_owned(),
            "projectRoot" => project.root.clone(),
            "projectName" => project.name.clone(),
            _ => {
                let key = token.strip_prefix("options.")?;
                match crate::merge::json::get_json_path(&JsonValue::Object(options.clone()), key)? {
                    JsonValue::String(s) => s.clone(),
                    JsonValue::Number(n) => n.to_string(),
                    _ => return None,
                }
            }
        };
        result.push_str(&value);
        rest = &rest[end + 1..];
    }
    result.push_str(rest);
    Some(result)
}

/// Determine the directory to lint, resolved against the workspace root
pub fn resolve_output_path(options: &PublintOptions, ctx: &ExecutorContext) -> Result<PathBuf> {
    let output_path = match (&options.build_output_path, &options.build_target) {
        (None, None) => {
            return Err(Error::configuration(
                "You must set either 'buildTarget' or 'buildOutputPath'.",
            ))
        }
        (Some(path), build_target) => {
            if let Some(build_target) = build_target {
                warn!(
                    "both buildTarget '{}' and buildOutputPath '{}' are set, using buildOutputPath",
                    build_target, path
                );
            }
            path.clone()
        }
        (None, Some(build_target)) => build_target_output_path(build_target, ctx)?,
    };
    Ok(ctx.workspace_root().join(output_path))
}

fn build_target_output_path(build_target: &str, ctx: &ExecutorContext) -> Result<String> {
    let invalid = || Error::resolution(build_target, format!("Invalid buildTarget: {}", build_target));

    let target_string = parse_target_string(build_target, ctx.project_name.as_deref())?;
    let project = ctx.graph.project(&target_string.project).map_err(|_| invalid())?;
    let target = project
        .config
        .target(&target_string.target)
        .map_err(|_| invalid())?;
    let options = target
        .merged_options(target_string.configuration.as_deref())
        .map_err(|_| invalid())?;

    let output_path = match options.get("outputPath").and_then(JsonValue::as_str) {
        Some(path) => Some(path.to_string()),
        None => target
            .outputs
            .first()
            .and_then(|output| interpolate_output(output, ctx.workspace_root(), project, &options)),
    };
    debug!("buildTarget {} resolved to {:?}", build_target, output_path);

    output_path.filter(|p| !p.is_empty()).ok_or_else(|| {
        Error::resolution(
            build_target,
            format!(
                "Unable to get the outputPath from buildTarget {0}. Make sure {0} has an outputPath property or manually provide a buildOutputPath property",
                build_target
            ),
        )
    })
}

/// Read the executor options stored in `project`'s `target`
///
/// A missing target yields default options when `required` is false.
pub fn options_from_target(
    graph: &ProjectGraph,
    project: &str,
    target: &str,
    required: bool,
) -> Result<PublintOptions> {
    let node = graph.project(project)?;
    if !node.config.has_target(target) && !required {
        return Ok(PublintOptions::default());
    }
    let options = node.config.target(target)?.merged_options(None)?;
    serde_json::from_value(JsonValue::Object(options))
        .map_err(|e| Error::configuration(format!("Invalid options for {}:{}: {}", project, target, e)))
}

/// The command line running publint on `package_dir`
///
/// `GVRS_NX_PUBLINT_COMMAND`, when set, replaces the `<exec> publint` prefix.
pub fn publint_command(
    package_dir: &Path,
    options: &PublintOptions,
    package_manager: PackageManager,
) -> Vec<String> {
    let mut command: Vec<String> = match env::var(defaults::PUBLINT_COMMAND_ENV) {
        Ok(custom) if !custom.trim().is_empty() => {
            custom.split_whitespace().map(str::to_string).collect()
        }
        _ => package_manager
            .exec()
            .iter()
            .map(|s| s.to_string())
            .chain(std::iter::once("publint".to_string()))
            .collect(),
    };
    command.extend([
        package_dir.to_string_lossy().into_owned(),
        "--level".to_string(),
        options.level.to_string(),
        "--strict".to_string(),
        options.strict.to_string(),
    ]);
    command
}

/// Lint the package directory the options point at
pub fn run_executor(options: &PublintOptions, ctx: &ExecutorContext) -> Result<ExecutorResult> {
    let package_dir = resolve_output_path(options, ctx)?;
    let package_manager = PackageManager::detect(&Tree::with_root(ctx.workspace_root()));
    let command = publint_command(&package_dir, options, package_manager);
    debug!("running {:?} in {}", command, ctx.workspace_root().display());

    let status = Command::new(&command[0])
        .args(&command[1..])
        .current_dir(ctx.workspace_root())
        .status();

    let failure = match status {
        Ok(status) if status.success() => return Ok(ExecutorResult { success: true }),
        Ok(status) => format!("Command failed with {}: {}", status, command.join(" ")),
        Err(e) => format!("Failed to run {}: {}", command.join(" "), e),
    };
    debug!("{}", failure);
    if ctx.verbose {
        eprintln!("{}", failure);
    }
    Ok(ExecutorResult { success: false })
}
