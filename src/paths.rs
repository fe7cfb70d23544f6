//! Path pairs and their derivation from user-supplied identifiers.
use std::path::{Component, Path, PathBuf};

use crate::error::PathError;
use crate::fs::FileSystem;

/// Default name of the marker file written into directories copied to the store.
pub const DEFAULT_IGNORE_MARKER: &str = ".dotfiles-ignore";

/// Source and destination of an operation.
///
/// Single-path operations use the same value for both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPair {
    source: PathBuf,
    destination: PathBuf,
}

impl PathPair {
    /// Pair `source` with `destination`.
    pub fn new(source: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
        }
    }

    /// Pair for operations that act on one path.
    pub fn single(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            source: path.clone(),
            destination: path,
        }
    }

    /// The path read from.
    #[must_use]
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// The path written to.
    #[must_use]
    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// The same pair with source and destination exchanged.
    #[must_use]
    pub fn swapped(self) -> Self {
        Self {
            source: self.destination,
            destination: self.source,
        }
    }

    /// Returns `true` when source and destination are the same path.
    #[must_use]
    pub fn is_single(&self) -> bool {
        self.source == self.destination
    }
}

/// Maps identifiers under `$HOME` (or the store) to home/store path pairs.
///
/// Identifiers may be absolute, start with `~`, or be relative to the
/// working directory. The derived pair always has the home-side path as
/// source and the store-side path as destination.
#[derive(Debug, Clone)]
pub struct PathDeriver {
    home: PathBuf,
    store: PathBuf,
    cwd: PathBuf,
    ignore_marker: String,
}

impl PathDeriver {
    /// Create a deriver rooted at `home` and `store`.
    pub fn new(home: &Path, store: &Path, ignore_marker: impl Into<String>) -> Self {
        let home = normalize(home);
        let cwd = std::env::current_dir().map_or_else(|_| home.clone(), |dir| normalize(&dir));
        Self {
            store: normalize(store),
            home,
            cwd,
            ignore_marker: ignore_marker.into(),
        }
    }

    /// Resolve relative identifiers against `cwd` instead of the process
    /// working directory.
    #[must_use]
    pub fn with_cwd(mut self, cwd: &Path) -> Self {
        self.cwd = normalize(cwd);
        self
    }

    /// Home directory this deriver maps from.
    #[must_use]
    pub fn home(&self) -> &Path {
        &self.home
    }

    /// Store directory this deriver maps to.
    #[must_use]
    pub fn store(&self) -> &Path {
        &self.store
    }

    /// Name of the ignore marker file.
    #[must_use]
    pub fn ignore_marker(&self) -> &str {
        &self.ignore_marker
    }

    /// Derive the `(home path, store path)` pair for `raw`.
    ///
    /// # Errors
    ///
    /// Returns [`PathError`] if the identifier lies outside both roots,
    /// names a root itself, or is excluded by the ignore marker.
    pub fn derive(&self, fs: &dyn FileSystem, raw: &str) -> Result<PathPair, PathError> {
        let relative = self.relative(raw)?;
        self.check_ignored(fs, &relative)?;
        Ok(PathPair::new(
            self.home.join(&relative),
            self.store.join(&relative),
        ))
    }

    /// The identifier relative to its root.
    fn relative(&self, raw: &str) -> Result<PathBuf, PathError> {
        let path = normalize(&self.expand(raw));
        let relative = path
            .strip_prefix(&self.store)
            .or_else(|_| path.strip_prefix(&self.home))
            .map_err(|_| PathError::OutsideHome {
                path: path.display().to_string(),
                home: self.home.display().to_string(),
            })?;
        if relative.as_os_str().is_empty() {
            return Err(PathError::Root(path.display().to_string()));
        }
        Ok(relative.to_path_buf())
    }

    fn expand(&self, raw: &str) -> PathBuf {
        if raw == "~" {
            return self.home.clone();
        }
        if let Some(rest) = raw.strip_prefix("~/") {
            return self.home.join(rest);
        }
        let path = Path::new(raw);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.cwd.join(path)
        }
    }

    fn check_ignored(&self, fs: &dyn FileSystem, relative: &Path) -> Result<(), PathError> {
        let ignored = |reason: String| PathError::Ignored {
            path: self.home.join(relative).display().to_string(),
            reason,
        };
        if relative
            .components()
            .any(|c| c.as_os_str() == self.ignore_marker.as_str())
        {
            return Err(ignored(format!("'{}' is a marker file", self.ignore_marker)));
        }
        for ancestor in relative.ancestors().skip(1) {
            if ancestor.as_os_str().is_empty() {
                break;
            }
            if fs.exists(&self.store.join(ancestor).join(&self.ignore_marker)) {
                return Err(ignored(format!(
                    "'{}' is managed as a whole",
                    self.home.join(ancestor).display()
                )));
            }
        }
        Ok(())
    }
}

/// Lexically normalise `path`: drop `.` and fold `..` without touching the
/// filesystem.
#[must_use]
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}
