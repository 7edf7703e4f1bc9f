//! Mock storage implementation for testing.
//!
//! Provides [`MockStorage`] for unit testing without filesystem access.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::storage::{Storage, StorageError, StorageErrorKind};

const BACKEND: &str = "Mock";

/// Mock storage for testing.
///
/// Files live in memory, keyed by the exact path they were added under.
/// Writes go to the same map and are also recorded in order, so tests can
/// assert on what a run produced.
///
/// # Example
///
/// ```ignore
/// use std::path::Path;
/// use pdocs_storage::{MockStorage, Storage};
///
/// let storage = MockStorage::new()
///     .with_file("docs/intro.md", "# Intro")
///     .with_file("templates/page.html", "{{ content }}");
///
/// storage.write(Path::new("public/intro.html"), "<h1>Intro</h1>").unwrap();
/// assert_eq!(storage.written(), vec![Path::new("public/intro.html")]);
/// ```
#[derive(Debug, Default)]
pub struct MockStorage {
    files: RwLock<BTreeMap<PathBuf, String>>,
    writes: RwLock<Vec<PathBuf>>,
    read_only: RwLock<HashSet<PathBuf>>,
}

impl MockStorage {
    /// Create a new empty mock storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_file(self, path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        self.files
            .write()
            .unwrap()
            .insert(path.into(), content.into());
        self
    }

    /// Make writes to `path` fail with [`StorageErrorKind::PermissionDenied`].
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_read_only(self, path: impl Into<PathBuf>) -> Self {
        self.read_only.write().unwrap().insert(path.into());
        self
    }

    /// Paths written so far, in write order.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn written(&self) -> Vec<PathBuf> {
        self.writes.read().unwrap().clone()
    }

    /// Current content of a file.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn content(&self, path: impl AsRef<Path>) -> Option<String> {
        self.files.read().unwrap().get(path.as_ref()).cloned()
    }
}

impl Storage for MockStorage {
    fn list_files(&self, root: &Path) -> Result<Vec<PathBuf>, StorageError> {
        let files = self.files.read().unwrap();
        let listed: Vec<PathBuf> = files
            .keys()
            .filter_map(|path| path.strip_prefix(root).ok())
            .filter(|relative| !relative.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .collect();

        if listed.is_empty() {
            return Err(StorageError::not_found(BACKEND, root));
        }
        Ok(listed)
    }

    fn read(&self, path: &Path) -> Result<String, StorageError> {
        self.files
            .read()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| StorageError::not_found(BACKEND, path))
    }

    fn write(&self, path: &Path, contents: &str) -> Result<(), StorageError> {
        if self.read_only.read().unwrap().contains(path) {
            return Err(StorageError::new(
                BACKEND,
                StorageErrorKind::PermissionDenied,
                path,
            ));
        }
        self.files
            .write()
            .unwrap()
            .insert(path.to_path_buf(), contents.to_owned());
        self.writes.write().unwrap().push(path.to_path_buf());
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.read().unwrap().contains_key(path)
    }
}
