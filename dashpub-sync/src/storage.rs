//! Local dashboard storage.
//!
//! The reconciler reads dashboards through [`DashboardStore`] so tests can
//! swap the filesystem for [`MemStore`].

use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Dir,
}

/// Read-only view of local dashboard folders.
pub trait DashboardStore {
    /// Kind of the entry at `path`, or `None` if nothing exists there.
    fn stat(&self, path: &Path) -> io::Result<Option<EntryKind>>;

    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Every regular file under `root`, recursively, in file-name order.
    fn walk_files(&self, root: &Path) -> io::Result<Vec<PathBuf>>;
}

/// The real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsStore;

impl DashboardStore for FsStore {
    fn stat(&self, path: &Path) -> io::Result<Option<EntryKind>> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.is_dir() => Ok(Some(EntryKind::Dir)),
            Ok(_) => Ok(Some(EntryKind::File)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        std::fs::read(path)
    }

    fn walk_files(&self, root: &Path) -> io::Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in WalkDir::new(root).follow_links(true).sort_by_file_name() {
            let entry = entry?;
            if entry.file_type().is_file() {
                files.push(entry.into_path());
            }
        }
        Ok(files)
    }
}

/// In-memory store; directories are implied by the files added.
#[derive(Debug, Clone, Default)]
pub struct MemStore {
    files: BTreeMap<PathBuf, Vec<u8>>,
    dirs: BTreeSet<PathBuf>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `path` and all its ancestors as directories.
    pub fn add_dir(&mut self, path: impl AsRef<Path>) -> &mut Self {
        for ancestor in path.as_ref().ancestors() {
            if !ancestor.as_os_str().is_empty() {
                self.dirs.insert(ancestor.to_path_buf());
            }
        }
        self
    }

    pub fn add_file(&mut self, path: impl AsRef<Path>, contents: impl Into<Vec<u8>>) -> &mut Self {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            self.add_dir(parent);
        }
        self.files.insert(path.to_path_buf(), contents.into());
        self
    }

    pub fn with_file(mut self, path: impl AsRef<Path>, contents: impl Into<Vec<u8>>) -> Self {
        self.add_file(path, contents);
        self
    }
}

impl DashboardStore for MemStore {
    fn stat(&self, path: &Path) -> io::Result<Option<EntryKind>> {
        if self.files.contains_key(path) {
            Ok(Some(EntryKind::File))
        } else if self.dirs.contains(path) {
            Ok(Some(EntryKind::Dir))
        } else {
            Ok(None)
        }
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        self.files.get(path).cloned().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("{} not found", path.display()))
        })
    }

    fn walk_files(&self, root: &Path) -> io::Result<Vec<PathBuf>> {
        if self.stat(root)?.is_none() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} not found", root.display()),
            ));
        }
        Ok(self
            .files
            .keys()
            .filter(|p| p.starts_with(root))
            .cloned()
            .collect())
    }
}
