//! Filesystem port used by every operation node.
//!
//! Operations never touch [`std::fs`] directly: they go through the
//! [`FileSystem`] trait so trees can be exercised against a recording double
//! in tests. Production code uses [`SystemFileSystem`].

mod recording;
mod system;

pub use recording::{Mutation, RecordingFileSystem};
pub use system::{SystemFileSystem, copy_dir_recursive, current_user, ensure_parent_dir};

use anyhow::Result;
use std::path::{Path, PathBuf};

/// Abstraction over the filesystem queries and mutations used by operations.
///
/// Predicates follow symbolic links (a dangling link does not "exist") except
/// [`FileSystem::is_symlink`], which inspects the link itself.
pub trait FileSystem: Send + Sync + std::fmt::Debug {
    /// Returns `true` if `path` exists.
    fn exists(&self, path: &Path) -> bool;

    /// Returns `true` if `path` is a regular file.
    fn is_file(&self, path: &Path) -> bool;

    /// Returns `true` if `path` is a directory.
    fn is_dir(&self, path: &Path) -> bool;

    /// Returns `true` if `path` itself is a symbolic link, dangling or not.
    fn is_symlink(&self, path: &Path) -> bool;

    /// Returns `true` if the current process may read `path`.
    fn can_read(&self, path: &Path) -> bool;

    /// Returns `true` if the current process may write `path`.
    fn can_write(&self, path: &Path) -> bool;

    /// Canonical absolute form of `path`.
    ///
    /// Symbolic links are resolved as far as the path exists; missing
    /// trailing components are appended unchanged.
    fn resolve(&self, path: &Path) -> PathBuf;

    /// Create `path` and any missing ancestors.
    ///
    /// # Errors
    ///
    /// Returns an error if a directory cannot be created.
    fn mkdir(&self, path: &Path) -> Result<()>;

    /// Copy the regular file `src` to `dst`, overwriting it.
    ///
    /// # Errors
    ///
    /// Returns an error if the copy fails.
    fn copy_file(&self, src: &Path, dst: &Path) -> Result<()>;

    /// Recursively copy the directory `src` into `dst`.
    ///
    /// # Errors
    ///
    /// Returns an error if any entry cannot be copied.
    fn copy_dir(&self, src: &Path, dst: &Path) -> Result<()>;

    /// Remove a file or a symbolic link (never its target).
    ///
    /// # Errors
    ///
    /// Returns an error if removal fails.
    fn remove_file(&self, path: &Path) -> Result<()>;

    /// Remove a directory and everything below it.
    ///
    /// # Errors
    ///
    /// Returns an error if removal fails.
    fn remove_dir(&self, path: &Path) -> Result<()>;

    /// Create a symbolic link at `link` pointing to the file `target`.
    ///
    /// # Errors
    ///
    /// Returns an error if the link cannot be created.
    fn symlink_file(&self, target: &Path, link: &Path) -> Result<()>;

    /// Create a symbolic link at `link` pointing to the directory `target`.
    ///
    /// # Errors
    ///
    /// Returns an error if the link cannot be created.
    fn symlink_dir(&self, target: &Path, link: &Path) -> Result<()>;

    /// Give `path` (recursively for directories) to `user` and its primary group.
    ///
    /// # Errors
    ///
    /// Returns an error if the user is unknown or ownership cannot be changed.
    fn chown(&self, path: &Path, user: &str) -> Result<()>;

    /// Read `path` as UTF-8 text.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not UTF-8.
    fn read(&self, path: &Path) -> Result<String>;

    /// Entries directly below the directory `path`, sorted by path.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be listed.
    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>>;

    /// Write `content` to `path`, creating or truncating it.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    fn write(&self, path: &Path, content: &str) -> Result<()>;
}

/// Kind of an existing filesystem entry, probed at execute time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// A regular file (or a link to one).
    File,
    /// A directory (or a link to one).
    Directory,
}

impl EntryKind {
    /// Probe `path`; `None` when it is absent or neither a file nor a directory.
    #[must_use]
    pub fn probe(fs: &dyn FileSystem, path: &Path) -> Option<Self> {
        if fs.is_dir(path) {
            Some(Self::Directory)
        } else if fs.is_file(path) {
            Some(Self::File)
        } else {
            None
        }
    }

    /// Noun used in log lines.
    #[must_use]
    pub const fn noun(self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Directory => "directory",
        }
    }
}
