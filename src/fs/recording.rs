//! Recording filesystem double for tests.
use anyhow::Result;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::{FileSystem, SystemFileSystem};

/// A mutating call observed by [`RecordingFileSystem`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mutation {
    /// Port method name, e.g. `"copy_file"`.
    pub kind: &'static str,
    /// Path that was mutated (the destination for copies and links).
    pub path: PathBuf,
}

/// Delegates to [`SystemFileSystem`] while recording every mutating call.
///
/// Ownership changes are recorded but never applied, so tests do not need
/// privileges. Read and write access can be denied per path with
/// [`deny_read`](Self::deny_read) and [`deny_write`](Self::deny_write), which
/// keeps permission tests meaningful when they run as root.
///
/// # Example
///
/// ```
/// use dotfiles_manager::fs::{FileSystem, RecordingFileSystem};
///
/// let dir = tempfile::tempdir().unwrap();
/// let fs = RecordingFileSystem::new();
/// fs.mkdir(&dir.path().join("a")).unwrap();
/// assert_eq!(fs.kinds(), vec!["mkdir"]);
/// ```
#[derive(Debug, Default)]
pub struct RecordingFileSystem {
    inner: SystemFileSystem,
    calls: Mutex<Vec<Mutation>>,
    unreadable: HashSet<PathBuf>,
    unwritable: HashSet<PathBuf>,
}

impl RecordingFileSystem {
    /// Create a recorder with nothing denied.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Report `path` as unreadable.
    #[must_use]
    pub fn deny_read(mut self, path: impl Into<PathBuf>) -> Self {
        self.unreadable.insert(path.into());
        self
    }

    /// Report `path` as unwritable.
    #[must_use]
    pub fn deny_write(mut self, path: impl Into<PathBuf>) -> Self {
        self.unwritable.insert(path.into());
        self
    }

    /// All mutations recorded so far, in call order.
    #[must_use]
    pub fn calls(&self) -> Vec<Mutation> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Method names of all recorded mutations, in call order.
    #[must_use]
    pub fn kinds(&self) -> Vec<&'static str> {
        self.calls().into_iter().map(|m| m.kind).collect()
    }

    /// Forget recorded mutations.
    pub fn clear(&self) {
        if let Ok(mut guard) = self.calls.lock() {
            guard.clear();
        }
    }

    fn record(&self, kind: &'static str, path: &Path) {
        if let Ok(mut guard) = self.calls.lock() {
            guard.push(Mutation {
                kind,
                path: path.to_path_buf(),
            });
        }
    }
}

impl FileSystem for RecordingFileSystem {
    fn exists(&self, path: &Path) -> bool {
        self.inner.exists(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        self.inner.is_file(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.inner.is_dir(path)
    }

    fn is_symlink(&self, path: &Path) -> bool {
        self.inner.is_symlink(path)
    }

    fn can_read(&self, path: &Path) -> bool {
        !self.unreadable.contains(path) && self.inner.can_read(path)
    }

    fn can_write(&self, path: &Path) -> bool {
        !self.unwritable.contains(path) && self.inner.can_write(path)
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        self.inner.resolve(path)
    }

    fn mkdir(&self, path: &Path) -> Result<()> {
        self.record("mkdir", path);
        self.inner.mkdir(path)
    }

    fn copy_file(&self, src: &Path, dst: &Path) -> Result<()> {
        self.record("copy_file", dst);
        self.inner.copy_file(src, dst)
    }

    fn copy_dir(&self, src: &Path, dst: &Path) -> Result<()> {
        self.record("copy_dir", dst);
        self.inner.copy_dir(src, dst)
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        self.record("remove_file", path);
        self.inner.remove_file(path)
    }

    fn remove_dir(&self, path: &Path) -> Result<()> {
        self.record("remove_dir", path);
        self.inner.remove_dir(path)
    }

    fn symlink_file(&self, target: &Path, link: &Path) -> Result<()> {
        self.record("symlink_file", link);
        self.inner.symlink_file(target, link)
    }

    fn symlink_dir(&self, target: &Path, link: &Path) -> Result<()> {
        self.record("symlink_dir", link);
        self.inner.symlink_dir(target, link)
    }

    fn chown(&self, path: &Path, _user: &str) -> Result<()> {
        self.record("chown", path);
        Ok(())
    }

    fn read(&self, path: &Path) -> Result<String> {
        self.inner.read(path)
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        self.inner.read_dir(path)
    }

    fn write(&self, path: &Path, content: &str) -> Result<()> {
        self.record("write", path);
        self.inner.write(path, content)
    }
}
