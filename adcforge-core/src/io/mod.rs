//! Read-only views of the process environment and filesystem.
//!
//! This module provides:
//! - [`Environment`] - Trait for looking up environment variables
//! - [`FileOpener`] - Trait for reading whole files
//! - [`ProcessEnvironment`] / [`OsFileOpener`] - Production implementations
//! - [`StaticEnvironment`] / [`MemoryFileOpener`] - In-memory fakes for tests
//!
//! Resolution only ever reads through these traits, so tests substitute
//! fakes instead of setting and restoring real environment variables.

use std::io;
use std::path::Path;

use crate::error::AdcError;
use crate::model::CredentialFile;

mod memory;

pub use memory::{MemoryFileOpener, StaticEnvironment};

/// Lookup of environment variables by name.
pub trait Environment: Send + Sync {
    /// Value of `name`, or `None` when unset.
    ///
    /// A variable set to the empty string is `Some("")`.
    fn var(&self, name: &str) -> Option<String>;
}

/// Whole-file reads.
pub trait FileOpener: Send + Sync {
    /// Read the complete contents of `path`.
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;
}

impl<T: Environment + ?Sized> Environment for &T {
    fn var(&self, name: &str) -> Option<String> {
        (**self).var(name)
    }
}

impl<T: FileOpener + ?Sized> FileOpener for &T {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        (**self).read(path)
    }
}

/// Read `path` through `files`, mapping any failure to
/// [`AdcError::CannotOpenFile`].
pub fn read_credential_file<F: FileOpener + ?Sized>(
    files: &F,
    path: &Path,
) -> Result<CredentialFile, AdcError> {
    files
        .read(path)
        .map(|bytes| CredentialFile::new(path, bytes))
        .map_err(|source| AdcError::CannotOpenFile {
            path: path.to_path_buf(),
            source,
        })
}

/// The real process environment.
///
/// Variables whose value is not valid Unicode are treated as unset.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnvironment;

impl Environment for ProcessEnvironment {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// The real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsFileOpener;

impl FileOpener for OsFileOpener {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        std::fs::read(path)
    }
}
