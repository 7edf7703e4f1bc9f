//! File access capability and its error type.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// What went wrong, independent of the backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum StorageErrorKind {
    /// No file or directory at the path.
    NotFound,
    /// The backend refused access.
    PermissionDenied,
    /// Something already occupies the path, e.g. a file where a directory
    /// is needed.
    AlreadyExists,
    /// The path can't be represented by the backend.
    InvalidPath,
    /// Content is not valid UTF-8.
    InvalidData,
    /// Anything else.
    Other,
}

impl StorageErrorKind {
    fn describe(self) -> &'static str {
        match self {
            Self::NotFound => "not found",
            Self::PermissionDenied => "permission denied",
            Self::AlreadyExists => "already exists",
            Self::InvalidPath => "invalid path",
            Self::InvalidData => "invalid data",
            Self::Other => "storage failure",
        }
    }
}

impl From<io::ErrorKind> for StorageErrorKind {
    fn from(kind: io::ErrorKind) -> Self {
        match kind {
            io::ErrorKind::NotFound => Self::NotFound,
            io::ErrorKind::PermissionDenied => Self::PermissionDenied,
            io::ErrorKind::AlreadyExists | io::ErrorKind::NotADirectory => Self::AlreadyExists,
            io::ErrorKind::InvalidData => Self::InvalidData,
            _ => Self::Other,
        }
    }
}

type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

/// Failed storage operation.
///
/// Displays as `[Backend] kind: path`; the backend's own error, if any, is
/// exposed through [`std::error::Error::source`].
#[derive(Debug)]
pub struct StorageError {
    /// Error category.
    pub kind: StorageErrorKind,
    /// Backend that failed (`"Fs"`, `"Mock"`).
    pub backend: &'static str,
    /// Path the operation was applied to.
    pub path: PathBuf,
    source: Option<BoxedSource>,
}

impl StorageError {
    /// Create an error without an underlying cause.
    #[must_use]
    pub fn new(backend: &'static str, kind: StorageErrorKind, path: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            backend,
            path: path.into(),
            source: None,
        }
    }

    /// Shorthand for a [`StorageErrorKind::NotFound`] error.
    #[must_use]
    pub fn not_found(backend: &'static str, path: impl Into<PathBuf>) -> Self {
        Self::new(backend, StorageErrorKind::NotFound, path)
    }

    /// Wrap an I/O error, deriving the kind from it.
    #[must_use]
    pub fn from_io(backend: &'static str, path: impl Into<PathBuf>, err: io::Error) -> Self {
        Self::new(backend, err.kind().into(), path).caused_by(err)
    }

    /// Attach the backend error that caused this one.
    #[must_use]
    pub fn caused_by(mut self, cause: impl Into<BoxedSource>) -> Self {
        self.source = Some(cause.into());
        self
    }

    /// The underlying cause, if it is an `E`.
    #[must_use]
    pub fn cause<E: std::error::Error + 'static>(&self) -> Option<&E> {
        self.source.as_deref()?.downcast_ref()
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.backend,
            self.kind.describe(),
            self.path.display()
        )
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|cause| cause as &(dyn std::error::Error + 'static))
    }
}

/// File access used by the site generator.
///
/// Paths are passed through as given (absolute, or relative to the working
/// directory); backends do not impose a root of their own.
pub trait Storage: Send + Sync {
    /// List every file below `root`, recursively.
    ///
    /// Returned paths are relative to `root`, sorted, and never include
    /// directories.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if `root` does not exist or cannot be walked.
    fn list_files(&self, root: &Path) -> Result<Vec<PathBuf>, StorageError>;

    /// Read a UTF-8 text file.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the file doesn't exist, can't be read or
    /// is not valid UTF-8.
    fn read(&self, path: &Path) -> Result<String, StorageError>;

    /// Write a file, creating missing parent directories first.
    ///
    /// Existing files are replaced.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if a directory can't be created or the file
    /// can't be written.
    fn write(&self, path: &Path, contents: &str) -> Result<(), StorageError>;

    /// Check if a file exists at `path`.
    ///
    /// Returns `false` on errors (treats errors as "doesn't exist").
    fn exists(&self, path: &Path) -> bool;
}
