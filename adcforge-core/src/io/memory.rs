//! In-memory environment and filesystem fakes.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::{Environment, FileOpener};

/// Fixed set of environment variables.
#[derive(Debug, Clone, Default)]
pub struct StaticEnvironment {
    vars: HashMap<String, String>,
}

impl StaticEnvironment {
    /// Create an environment with no variables set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an environment from existing pairs.
    pub fn with_vars(vars: HashMap<String, String>) -> Self {
        Self { vars }
    }

    /// Set a variable.
    pub fn with_var(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }

    /// Remove a variable.
    pub fn without_var(mut self, name: &str) -> Self {
        self.vars.remove(name);
        self
    }
}

impl Environment for StaticEnvironment {
    fn var(&self, name: &str) -> Option<String> {
        self.vars.get(name).cloned()
    }
}

#[derive(Debug, Clone)]
enum Entry {
    Contents(Vec<u8>),
    Unreadable,
}

/// Filesystem fake holding whole files in memory.
///
/// Every read is recorded, so tests can assert which paths a resolution
/// touched.
#[derive(Debug, Default)]
pub struct MemoryFileOpener {
    files: HashMap<PathBuf, Entry>,
    reads: Mutex<Vec<PathBuf>>,
}

impl MemoryFileOpener {
    /// Create an empty filesystem.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a readable file.
    pub fn with_file(mut self, path: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) -> Self {
        self.files.insert(path.into(), Entry::Contents(contents.into()));
        self
    }

    /// Add a file that exists but fails to open.
    pub fn with_unreadable(mut self, path: impl Into<PathBuf>) -> Self {
        self.files.insert(path.into(), Entry::Unreadable);
        self
    }

    /// Paths read so far, in order.
    pub fn reads(&self) -> Vec<PathBuf> {
        self.reads
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl FileOpener for MemoryFileOpener {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        self.reads
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(path.to_path_buf());

        match self.files.get(path) {
            Some(Entry::Contents(bytes)) => Ok(bytes.clone()),
            Some(Entry::Unreadable) => Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "permission denied",
            )),
            None => Err(io::Error::new(
                io::ErrorKind::NotFound,
                "No such file or directory",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_environment() {
        let env = StaticEnvironment::new()
            .with_var("HOME", "/home/test")
            .with_var("EMPTY", "")
            .with_var("GONE", "x")
            .without_var("GONE");

        assert_eq!(env.var("HOME").as_deref(), Some("/home/test"));
        assert_eq!(env.var("EMPTY").as_deref(), Some(""));
        assert_eq!(env.var("GONE"), None);
    }

    #[test]
    fn test_memory_file_opener_records_reads() {
        let files = MemoryFileOpener::new()
            .with_file("/a.json", b"{}".to_vec())
            .with_unreadable("/locked.json");

        assert_eq!(files.read(Path::new("/a.json")).unwrap(), b"{}");
        assert_eq!(
            files.read(Path::new("/locked.json")).unwrap_err().kind(),
            io::ErrorKind::PermissionDenied
        );
        assert_eq!(
            files.read(Path::new("/missing.json")).unwrap_err().kind(),
            io::ErrorKind::NotFound
        );

        assert_eq!(
            files.reads(),
            vec![
                PathBuf::from("/a.json"),
                PathBuf::from("/locked.json"),
                PathBuf::from("/missing.json"),
            ]
        );
    }
}
