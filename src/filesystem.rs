//! Staging tree over a workspace directory
//!
//! A [`Tree`] is an overlay over the host workspace. Reads fall through to
//! disk unless the path has a staged change; writes and deletes stay in memory
//! until [`crate::write::commit`] flushes them. A tree without a root is purely
//! in-memory, which is what the unit tests use.

use crate::error::{Error, Result};
use glob::Pattern;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Represents a file with content and metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct File {
    /// File content as bytes
    pub content: Vec<u8>,
    /// File permissions (simplified as u32)
    pub permissions: u32,
}

impl File {
    /// Create a new file with content
    pub fn new(content: Vec<u8>) -> Self {
        Self {
            content,
            permissions: 0o644,
        }
    }

    /// Create a new file from string content
    pub fn from_string(content: &str) -> Self {
        Self::new(content.as_bytes().to_vec())
    }

    /// Mark the file as executable
    pub fn executable(mut self) -> Self {
        self.permissions = 0o755;
        self
    }
}

#[derive(Debug, Clone)]
enum Staged {
    Write(File),
    Delete,
}

/// How a staged path differs from the host directory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Create,
    Update,
    Delete,
}

impl std::fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ChangeKind::Create => "CREATE",
            ChangeKind::Update => "UPDATE",
            ChangeKind::Delete => "DELETE",
        };
        f.write_str(label)
    }
}

/// A staged change, as reported to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChange {
    pub path: PathBuf,
    pub kind: ChangeKind,
}

/// Staging overlay for a workspace directory
#[derive(Debug, Clone, Default)]
pub struct Tree {
    root: Option<PathBuf>,
    staged: BTreeMap<PathBuf, Staged>,
}

impl Tree {
    /// Create an in-memory tree with no backing directory
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a tree backed by the given workspace directory
    pub fn with_root<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: Some(root.as_ref().to_path_buf()),
            staged: BTreeMap::new(),
        }
    }

    /// Read a file, honouring staged writes and deletes
    pub fn read<P: AsRef<Path>>(&self, path: P) -> Result<Option<File>> {
        let key = normalize(path.as_ref())?;
        match self.staged.get(&key) {
            Some(Staged::Write(file)) => Ok(Some(file.clone())),
            Some(Staged::Delete) => Ok(None),
            None => self.read_host(&key),
        }
    }

    /// Read a file as UTF-8 text
    pub fn read_string<P: AsRef<Path>>(&self, path: P) -> Result<Option<String>> {
        let path = path.as_ref();
        match self.read(path)? {
            Some(file) => String::from_utf8(file.content)
                .map(Some)
                .map_err(|_| Error::Filesystem {
                    message: format!("File content is not valid UTF-8: {}", path.display()),
                }),
            None => Ok(None),
        }
    }

    /// Check if a file exists in the staged view
    pub fn exists<P: AsRef<Path>>(&self, path: P) -> bool {
        matches!(self.read(path), Ok(Some(_)))
    }

    /// Stage a file write
    pub fn write<P: AsRef<Path>>(&mut self, path: P, file: File) -> Result<()> {
        let key = normalize(path.as_ref())?;
        self.staged.insert(key, Staged::Write(file));
        Ok(())
    }

    /// Stage a file write with string content
    pub fn write_string<P: AsRef<Path>>(&mut self, path: P, content: &str) -> Result<()> {
        self.write(path, File::from_string(content))
    }

    /// Stage a file deletion. Deleting a missing file is a no-op.
    pub fn delete<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let key = normalize(path.as_ref())?;
        if self.read_host(&key)?.is_some() {
            self.staged.insert(key, Staged::Delete);
        } else {
            self.staged.remove(&key);
        }
        Ok(())
    }

    /// List staged changes in path order
    pub fn changes(&self) -> Vec<FileChange> {
        self.staged
            .iter()
            .map(|(path, staged)| {
                let kind = match staged {
                    Staged::Delete => ChangeKind::Delete,
                    Staged::Write(_) if self.host_exists(path) => ChangeKind::Update,
                    Staged::Write(_) => ChangeKind::Create,
                };
                FileChange {
                    path: path.clone(),
                    kind,
                }
            })
            .collect()
    }

    /// Iterate over staged writes as (path, file) pairs
    pub fn written_files(&self) -> impl Iterator<Item = (&PathBuf, &File)> {
        self.staged.iter().filter_map(|(path, staged)| match staged {
            Staged::Write(file) => Some((path, file)),
            Staged::Delete => None,
        })
    }

    /// List staged writes matching a glob pattern
    pub fn list_written_glob(&self, pattern: &str) -> Result<Vec<PathBuf>> {
        let pattern = Pattern::new(pattern)?;
        Ok(self
            .written_files()
            .filter(|(path, _)| path.to_str().is_some_and(|p| pattern.matches(p)))
            .map(|(path, _)| path.clone())
            .collect())
    }

    /// Whether anything has been staged
    pub fn is_clean(&self) -> bool {
        self.staged.is_empty()
    }

    fn host_exists(&self, key: &Path) -> bool {
        self.root
            .as_ref()
            .is_some_and(|root| root.join(key).is_file())
    }

    fn read_host(&self, key: &Path) -> Result<Option<File>> {
        let Some(root) = &self.root else {
            return Ok(None);
        };
        let full_path = root.join(key);
        if !full_path.is_file() {
            return Ok(None);
        }
        let content = fs::read(&full_path)?;
        let mut file = File::new(content);
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.permissions = fs::metadata(&full_path)?.permissions().mode() & 0o777;
        }
        Ok(Some(file))
    }
}

/// Normalize a workspace-relative path: drop `.` segments, reject escapes
fn normalize(path: &Path) -> Result<PathBuf> {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::Normal(part) => normalized.push(part),
            _ => {
                return Err(Error::Filesystem {
                    message: format!("Path must be relative to the workspace: {}", path.display()),
                })
            }
        }
    }
    if normalized.as_os_str().is_empty() {
        return Err(Error::Filesystem {
            message: "Empty path".to_string(),
        });
    }
    Ok(normalized)
}
