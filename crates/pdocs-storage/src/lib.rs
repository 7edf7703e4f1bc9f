//! Storage abstraction for pdocs.
//!
//! The site generator never touches the filesystem directly. It goes through
//! the [`Storage`] trait, which keeps generation testable and lets the
//! output land anywhere a backend can write.
//!
//! The crate provides:
//! - [`Storage`] trait with `list_files()`, `read()`, `write()` and `exists()`
//! - [`FsStorage`] for the local filesystem
//! - [`MockStorage`] for testing (behind the `mock` feature flag)
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use pdocs_storage::{FsStorage, Storage};
//!
//! let storage = FsStorage::new();
//! for template in storage.list_files(Path::new("templates"))? {
//!     println!("{}", template.display());
//! }
//! ```

mod fs;
#[cfg(feature = "mock")]
mod mock;
mod storage;

pub use fs::FsStorage;
#[cfg(feature = "mock")]
pub use mock::MockStorage;
pub use storage::{Storage, StorageError, StorageErrorKind};
