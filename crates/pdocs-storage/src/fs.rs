//! Filesystem storage backend.

use std::fs;
use std::path::{Path, PathBuf};

use crate::storage::{Storage, StorageError, StorageErrorKind};

const BACKEND: &str = "Fs";

/// Storage backed by the local filesystem.
///
/// Walks directories with the `ignore` crate, with every filter disabled so
/// hidden and git-ignored files are listed too.
#[derive(Clone, Copy, Debug, Default)]
pub struct FsStorage;

impl FsStorage {
    /// Create a new filesystem storage.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Storage for FsStorage {
    fn list_files(&self, root: &Path) -> Result<Vec<PathBuf>, StorageError> {
        if !root.is_dir() {
            return Err(StorageError::not_found(BACKEND, root));
        }

        let walker = ignore::WalkBuilder::new(root)
            .standard_filters(false)
            .follow_links(true)
            .build();

        let mut files = Vec::new();
        for entry in walker {
            let entry = entry.map_err(|e| {
                StorageError::new(BACKEND, StorageErrorKind::Other, root).caused_by(e)
            })?;
            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }
            let relative = entry.path().strip_prefix(root).map_err(|_| {
                StorageError::new(BACKEND, StorageErrorKind::InvalidPath, entry.path())
            })?;
            files.push(relative.to_path_buf());
        }

        files.sort();
        tracing::debug!(root = %root.display(), count = files.len(), "Listed files");
        Ok(files)
    }

    fn read(&self, path: &Path) -> Result<String, StorageError> {
        fs::read_to_string(path).map_err(|e| StorageError::from_io(BACKEND, path, e))
    }

    fn write(&self, path: &Path, contents: &str) -> Result<(), StorageError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| StorageError::from_io(BACKEND, parent, e))?;
        }
        fs::write(path, contents).map_err(|e| StorageError::from_io(BACKEND, path, e))
    }

    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }
}
