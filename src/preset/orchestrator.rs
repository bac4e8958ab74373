//! Orchestrator for a complete preset run
//!
//! A run has two halves:
//!
//! 1. [`generate`]: every step of the plan runs against the document store,
//!    target references are validated and the touched JSON documents are
//!    formatted. Nothing leaves memory.
//! 2. [`execute_preset`]: the staged tree is committed once, then the queued
//!    tasks run in order against the committed snapshot.
//!
//! If any step fails, the run stops before the commit: the host directory is
//! untouched and no task runs.

use std::path::Path;

use log::{debug, info};

use super::steps::PRESET_STEPS;
use super::{normalize, PresetOptions};
use crate::documents::DocumentStore;
use crate::error::Result;
use crate::filesystem::{FileChange, Tree};
use crate::project::read_project_configuration;
use crate::tasks::{run_tasks, RenderedNotice, Task, TaskContext};
use crate::write;

/// Outcome of a preset run
#[derive(Debug)]
pub struct Summary {
    /// Changes against the host directory, in path order
    pub changes: Vec<FileChange>,
    /// Whether the changes were written to disk
    pub committed: bool,
    pub installed: bool,
    pub notices: Vec<RenderedNotice>,
}

/// Run the step plan against `store` and return the queued tasks
pub fn generate(store: &mut DocumentStore, options: &PresetOptions) -> Result<Vec<Task>> {
    let options = normalize(options)?;
    let mut tasks = Vec::new();

    for step in PRESET_STEPS {
        debug!("running step {}", step.name);
        tasks.extend((step.run)(store, &options)?);
    }

    let projects: Vec<String> = store.project_names().map(str::to_string).collect();
    for project in projects {
        read_project_configuration(store, &project)?.validate_depends_on(&project)?;
    }

    store.format()?;
    Ok(tasks)
}

/// Run the preset against `tree` and commit the result to `output_path`
///
/// With `output_path` set to `None` nothing is written and no task runs; the
/// summary still lists the changes that would have been made.
pub fn execute_preset(
    tree: Tree,
    options: &PresetOptions,
    skip_install: bool,
    output_path: Option<&Path>,
) -> Result<Summary> {
    let mut store = DocumentStore::new(tree);
    let tasks = generate(&mut store, options)?;
    let tree = store.into_tree();
    let changes = tree.changes();

    let Some(output) = output_path else {
        info!("dry run, {} change(s) not written", changes.len());
        return Ok(Summary {
            changes,
            committed: false,
            installed: false,
            notices: Vec::new(),
        });
    };

    write::commit(&tree, output)?;

    let ctx = TaskContext {
        workspace_root: Some(output.to_path_buf()),
        skip_install,
    };
    let report = run_tasks(&tasks, &tree, &ctx);

    Ok(Summary {
        changes,
        committed: true,
        installed: report.installed,
        notices: report.notices,
    })
}
