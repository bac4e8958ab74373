//! Committing a staged tree to disk
//!
//! This is the last structural step of a generator run. It flushes every
//! staged change of a [`Tree`] into the output directory:
//!
//! 1.  **Writes**: parent directories are created, content is written and, on
//!     Unix-like systems, permissions are applied (e.g. the executable bit of
//!     a git hook).
//! 2.  **Deletes**: staged deletions remove the file if it is still present.
//!
//! Nothing in the pipeline touches the host directory before this point, so a
//! failed run never leaves a partially edited workspace behind.

use std::fs;
use std::path::Path;

use log::info;

use crate::error::{Error, Result};
use crate::filesystem::{ChangeKind, FileChange, Tree};

/// Write all staged changes of `tree` below `output_path`
///
/// Returns the list of changes that were applied, in path order.
pub fn commit(tree: &Tree, output_path: &Path) -> Result<Vec<FileChange>> {
    let changes = tree.changes();

    for (relative_path, file) in tree.written_files() {
        let full_path = output_path.join(relative_path);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::Filesystem {
                message: format!("Failed to create directory '{}': {}", parent.display(), e),
            })?;
        }

        fs::write(&full_path, &file.content).map_err(|e| Error::Filesystem {
            message: format!("Failed to write file '{}': {}", full_path.display(), e),
        })?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = fs::Permissions::from_mode(file.permissions);
            fs::set_permissions(&full_path, perms).map_err(|e| Error::Filesystem {
                message: format!(
                    "Failed to set permissions on '{}': {}",
                    full_path.display(),
                    e
                ),
            })?;
        }
    }

    for change in changes.iter().filter(|c| c.kind == ChangeKind::Delete) {
        let full_path = output_path.join(&change.path);
        if full_path.exists() {
            fs::remove_file(&full_path).map_err(|e| Error::Filesystem {
                message: format!("Failed to delete file '{}': {}", full_path.display(), e),
            })?;
        }
    }

    info!(
        "committed {} change(s) to {}",
        changes.len(),
        output_path.display()
    );

    Ok(changes)
}
