//! Preset command implementation
//!
//! Runs the ts-package preset against a workspace directory: every mutation
//! step is staged in memory, the result is committed in one go, then the
//! package install and operator notices follow.

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Args;
use log::debug;

use gvrs_nx::filesystem::Tree;
use gvrs_nx::output::{print_changes, print_notice, OutputConfig};
use gvrs_nx::preset::orchestrator::execute_preset;
use gvrs_nx::preset::PresetOptions;

/// Arguments for the preset command
#[derive(Args, Debug)]
pub struct PresetArgs {
    /// Name of the package project
    #[arg(long)]
    pub name: Option<String>,

    /// npm scope of the published package, with or without the leading '@'
    #[arg(long, value_name = "SCOPE")]
    pub npm_scope: Option<String>,

    /// Base branch used by affected commands
    #[arg(long, value_name = "BRANCH")]
    pub default_base: Option<String>,

    /// Registry URL of the local deploy configuration
    #[arg(long, value_name = "URL")]
    pub local_registry: Option<String>,

    /// Workspace directory (defaults to current directory)
    #[arg(short, long, value_name = "PATH")]
    pub directory: Option<PathBuf>,

    /// YAML or JSON file with preset options; flags take precedence
    #[arg(long, value_name = "PATH", env = "GVRS_NX_PRESET_OPTIONS")]
    pub options_file: Option<PathBuf>,

    /// Show what would be done without making changes
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Do not install packages after writing the workspace
    #[arg(long)]
    pub skip_install: bool,
}

impl PresetArgs {
    fn options(&self) -> Result<PresetOptions> {
        let from_flags = PresetOptions {
            name: self.name.clone(),
            npm_scope: self.npm_scope.clone(),
            default_base: self.default_base.clone(),
            local_registry: self.local_registry.clone(),
        };
        match &self.options_file {
            Some(path) => {
                let from_file = PresetOptions::from_file(path)
                    .with_context(|| format!("Failed to read options file {}", path.display()))?;
                Ok(from_file.overridden_by(from_flags))
            }
            None => Ok(from_flags),
        }
    }
}

/// Execute the preset command
pub fn execute(args: PresetArgs, output: &OutputConfig) -> Result<ExitCode> {
    let options = args.options()?;
    let directory = match &args.directory {
        Some(dir) => dir.clone(),
        None => std::env::current_dir().context("Failed to get current directory")?,
    };
    debug!("running preset in {}", directory.display());

    let summary = execute_preset(
        Tree::with_root(&directory),
        &options,
        args.skip_install,
        if args.dry_run { None } else { Some(&directory) },
    )?;

    let mut stdout = io::stdout().lock();
    print_changes(&mut stdout, output, &summary.changes, args.dry_run)?;
    for notice in &summary.notices {
        print_notice(&mut stdout, output, notice)?;
    }

    Ok(ExitCode::SUCCESS)
}
