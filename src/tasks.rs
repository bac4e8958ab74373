//! Deferred tasks
//!
//! Mutation steps do not touch the outside world. Anything that must happen
//! after the workspace files are final (installing packages, telling the
//! operator what to do next) is queued as a [`Task`] and run by
//! [`run_tasks`] once the tree has been committed.
//!
//! Tasks are plain values. They receive the committed snapshot and the
//! run's [`TaskContext`] explicitly when they run.

use std::path::PathBuf;
use std::process::Command;

use log::{debug, info, warn};

use crate::filesystem::Tree;
use crate::package_manager::PackageManager;

/// A line of a notice body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodyLine {
    Text(String),
    /// A command the operator should run, rendered emphasized
    Command(String),
}

/// Operator notices a generator can queue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    /// Git hooks are only installed once the workspace is a git checkout
    EnableHusky,
}

/// A notice resolved against the committed workspace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedNotice {
    pub title: String,
    pub body: Vec<BodyLine>,
}

impl Notice {
    pub fn render(&self, package_manager: PackageManager) -> RenderedNotice {
        match self {
            Notice::EnableHusky => RenderedNotice {
                title: "Husky is not yet enabled".to_string(),
                body: vec![
                    BodyLine::Text(
                        "Nx initializes the git repo only after running the preset".to_string(),
                    ),
                    BodyLine::Text("To enable Husky, run:".to_string()),
                    BodyLine::Command(package_manager.run_command("prepare")),
                ],
            },
        }
    }
}

/// Work deferred until the tree is committed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Task {
    /// Install the dependencies declared in `package.json`
    InstallPackages,
    Notice(Notice),
}

/// What tasks may rely on when they run
#[derive(Debug, Clone, Default)]
pub struct TaskContext {
    /// Directory the tree was committed to; `None` when nothing was written
    pub workspace_root: Option<PathBuf>,
    pub skip_install: bool,
}

/// What running the task queue produced
#[derive(Debug, Default)]
pub struct TaskReport {
    pub installed: bool,
    pub notices: Vec<RenderedNotice>,
}

/// Run `tasks` in queue order against the committed `snapshot`
///
/// Installs are coalesced: the first one runs, later ones are no-ops. A
/// failing install is reported and does not stop the queue.
pub fn run_tasks(tasks: &[Task], snapshot: &Tree, ctx: &TaskContext) -> TaskReport {
    let package_manager = PackageManager::detect(snapshot);
    let mut report = TaskReport::default();
    let mut install_attempted = false;

    for task in tasks {
        match task {
            Task::InstallPackages => {
                if install_attempted {
                    continue;
                }
                install_attempted = true;
                report.installed = install_packages(package_manager, ctx);
            }
            Task::Notice(notice) => {
                debug!("queued notice {:?}", notice);
                report.notices.push(notice.render(package_manager));
            }
        }
    }

    report
}

fn install_packages(package_manager: PackageManager, ctx: &TaskContext) -> bool {
    if ctx.skip_install {
        debug!("skipping package install");
        return false;
    }
    let Some(root) = &ctx.workspace_root else {
        debug!("nothing committed, skipping package install");
        return false;
    };

    let command = package_manager.install_command();
    info!("running `{}` in {}", command.join(" "), root.display());
    match Command::new(&command[0])
        .args(&command[1..])
        .current_dir(root)
        .status()
    {
        Ok(status) if status.success() => true,
        Ok(status) => {
            warn!("`{}` exited with {}", command.join(" "), status);
            false
        }
        Err(e) => {
            warn!("failed to run `{}`: {}", command.join(" "), e);
            false
        }
    }
}
