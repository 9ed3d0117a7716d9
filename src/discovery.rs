//! Project file discovery.
//!
//! Walks the project root and yields every regular file as a [`FileRecord`].
//! Two kinds of directories are pruned (never descended into):
//!
//! - hidden directories, whose name starts with `.` (`.git`, `.cache`, …)
//! - configured dependency-cache directories (`node_modules` by default)
//!
//! The root itself is never pruned, so running against `.` works.
//!
//! The walk is lazy: [`Discovery::files`] returns an iterator that reads
//! directories as it goes. Calling it again starts a fresh walk, so the
//! sequence can be consumed any number of times. Entries are sorted by file
//! name within each directory, which keeps repeated runs identical.
//!
//! A symlink to a file is reported like a regular file, with the target's
//! size. Symlinked directories are not followed; the project is assumed to
//! be a tree.

use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("Project root not found: {0}")]
    RootMissing(PathBuf),
    #[error("Project root is not a directory: {0}")]
    NotADirectory(PathBuf),
    #[error("Cannot read project root {path}: {source}")]
    RootUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Cannot read {path}: {source}")]
    Metadata {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),
}

/// A discovered file.
///
/// `path` is relative to the project root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileRecord {
    pub path: PathBuf,
    pub size_bytes: u64,
    /// Lowercase extension without the dot; empty when the file has none.
    pub extension: String,
}

impl FileRecord {
    /// Root-relative path with `/` separators, for display and matching.
    pub fn display_path(&self) -> String {
        self.path
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }
}

/// Lowercase extension of `path` without the dot, or an empty string.
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

/// A validated project root plus its pruning rules.
#[derive(Debug, Clone)]
pub struct Discovery {
    root: PathBuf,
    pruned_dirs: Vec<String>,
}

impl Discovery {
    /// Check that `root` exists and is a readable directory.
    pub fn new(root: &Path, pruned_dirs: &[String]) -> Result<Self, DiscoveryError> {
        let metadata = fs::metadata(root).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => DiscoveryError::RootMissing(root.to_path_buf()),
            _ => DiscoveryError::RootUnreadable {
                path: root.to_path_buf(),
                source,
            },
        })?;
        if !metadata.is_dir() {
            return Err(DiscoveryError::NotADirectory(root.to_path_buf()));
        }
        fs::read_dir(root).map_err(|source| DiscoveryError::RootUnreadable {
            path: root.to_path_buf(),
            source,
        })?;

        Ok(Self {
            root: root.to_path_buf(),
            pruned_dirs: pruned_dirs.to_vec(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Start a fresh walk over the project.
    pub fn files(&self) -> impl Iterator<Item = Result<FileRecord, DiscoveryError>> + '_ {
        WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !self.is_pruned(entry))
            .filter_map(|entry| match entry {
                Ok(entry) if is_file(&entry) => Some(self.record(&entry)),
                Ok(_) => None,
                Err(e) => Some(Err(DiscoveryError::Walk(e))),
            })
    }

    /// Collect the whole walk, failing on the first unreadable entry.
    pub fn collect(&self) -> Result<Vec<FileRecord>, DiscoveryError> {
        self.files().collect()
    }

    fn is_pruned(&self, entry: &DirEntry) -> bool {
        if entry.depth() == 0 || !entry.file_type().is_dir() {
            return false;
        }
        let name = entry.file_name().to_string_lossy();
        let pruned = name.starts_with('.') || self.pruned_dirs.iter().any(|d| name == d.as_str());
        if pruned {
            debug!(dir = %entry.path().display(), "pruned directory");
        }
        pruned
    }

    fn record(&self, entry: &DirEntry) -> Result<FileRecord, DiscoveryError> {
        let size_bytes = if entry.path_is_symlink() {
            fs::metadata(entry.path())
                .map_err(|source| DiscoveryError::Metadata {
                    path: entry.path().to_path_buf(),
                    source,
                })?
                .len()
        } else {
            entry.metadata()?.len()
        };
        let path = entry
            .path()
            .strip_prefix(&self.root)
            .unwrap_or(entry.path())
            .to_path_buf();
        Ok(FileRecord {
            extension: extension_of(&path),
            path,
            size_bytes,
        })
    }
}

/// Regular files and symlinks whose target is a file.
fn is_file(entry: &DirEntry) -> bool {
    entry.file_type().is_file() || (entry.path_is_symlink() && entry.path().is_file())
}
