//! Publint command implementation
//!
//! Runs the publint executor for one project target. Options stored in the
//! target's `options` are the base; command line flags override them.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Args;
use log::debug;

use gvrs_nx::defaults;
use gvrs_nx::publint::{options_from_target, run_executor, ExecutorContext, Level, PublintOptions};
use gvrs_nx::workspace::{find_workspace_root, ProjectGraph};

/// Arguments for the publint command
#[derive(Args, Debug)]
pub struct PublintArgs {
    /// Target whose options to use, as PROJECT or PROJECT:TARGET
    #[arg(value_name = "PROJECT[:TARGET]")]
    pub target: Option<String>,

    /// Target that builds the package, as [PROJECT:]TARGET[:CONFIGURATION]
    #[arg(long, value_name = "TARGET")]
    pub build_target: Option<String>,

    /// Directory of the built package, relative to the workspace root
    #[arg(long, value_name = "PATH")]
    pub build_output_path: Option<String>,

    /// Lowest severity to report
    #[arg(long, value_enum)]
    pub level: Option<Level>,

    /// Report warnings as errors
    #[arg(long, value_name = "BOOL")]
    pub strict: Option<bool>,

    /// Workspace root (defaults to the nearest directory with an nx.json)
    #[arg(long, value_name = "PATH")]
    pub workspace_root: Option<PathBuf>,

    /// Print why the lint failed
    #[arg(short, long, env = "NX_VERBOSE_LOGGING")]
    pub verbose: bool,
}

impl PublintArgs {
    fn overrides(&self, mut options: PublintOptions) -> PublintOptions {
        if let Some(build_target) = &self.build_target {
            options.build_target = Some(build_target.clone());
        }
        if let Some(build_output_path) = &self.build_output_path {
            options.build_output_path = Some(build_output_path.clone());
        }
        if let Some(level) = self.level {
            options.level = level;
        }
        if let Some(strict) = self.strict {
            options.strict = strict;
        }
        options
    }
}

fn workspace_root(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(root) = explicit {
        return Ok(root.to_path_buf());
    }
    let cwd = std::env::current_dir().context("Failed to get current directory")?;
    Ok(find_workspace_root(&cwd).unwrap_or(cwd))
}

/// Project and target to read options from
///
/// Without an explicit target the root project's `publint` target is used,
/// and may be absent.
fn select_target(graph: &ProjectGraph, target: Option<&str>) -> Result<(String, String, bool)> {
    match target {
        Some(value) => match value.split_once(':') {
            Some((project, target)) => Ok((project.to_string(), target.to_string(), true)),
            None => Ok((value.to_string(), defaults::PUBLINT_TARGET.to_string(), false)),
        },
        None => {
            let project = graph
                .root_project()
                .context("No project given and the workspace root has no project.json")?;
            Ok((project.name.clone(), defaults::PUBLINT_TARGET.to_string(), false))
        }
    }
}

/// Execute the publint command
pub fn execute(args: PublintArgs) -> Result<ExitCode> {
    let root = workspace_root(args.workspace_root.as_deref())?;
    let graph = ProjectGraph::load(&root)?;
    let (project, target, required) = select_target(&graph, args.target.as_deref())?;
    debug!("publint for {}:{} in {}", project, target, root.display());

    let options = args.overrides(options_from_target(&graph, &project, &target, required)?);
    let ctx = ExecutorContext {
        project_name: Some(project),
        graph,
        verbose: args.verbose,
    };

    let result = run_executor(&options, &ctx)?;
    Ok(if result.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
