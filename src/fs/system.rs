//! Production filesystem backed by [`std::fs`].
use anyhow::{Context as _, Result};
use std::path::{Path, PathBuf};

use super::FileSystem;

/// Production [`FileSystem`] implementation.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemFileSystem;

impl FileSystem for SystemFileSystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn is_symlink(&self, path: &Path) -> bool {
        path.symlink_metadata()
            .is_ok_and(|meta| meta.file_type().is_symlink())
    }

    fn can_read(&self, path: &Path) -> bool {
        #[cfg(unix)]
        {
            nix::unistd::access(path, nix::unistd::AccessFlags::R_OK).is_ok()
        }
        #[cfg(not(unix))]
        {
            std::fs::metadata(path).is_ok()
        }
    }

    fn can_write(&self, path: &Path) -> bool {
        #[cfg(unix)]
        {
            nix::unistd::access(path, nix::unistd::AccessFlags::W_OK).is_ok()
        }
        #[cfg(not(unix))]
        {
            std::fs::metadata(path).is_ok_and(|meta| !meta.permissions().readonly())
        }
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        resolve_lenient(path)
    }

    fn mkdir(&self, path: &Path) -> Result<()> {
        std::fs::create_dir_all(path)
            .with_context(|| format!("creating directory {}", path.display()))
    }

    fn copy_file(&self, src: &Path, dst: &Path) -> Result<()> {
        std::fs::copy(src, dst)
            .map(|_| ())
            .with_context(|| format!("copying {} to {}", src.display(), dst.display()))
    }

    fn copy_dir(&self, src: &Path, dst: &Path) -> Result<()> {
        copy_dir_recursive(src, dst)
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        let meta = std::fs::symlink_metadata(path)
            .with_context(|| format!("reading metadata: {}", path.display()))?;
        if is_dir_like(&meta) && meta.file_type().is_symlink() {
            // Directory links on Windows are removed as directories.
            std::fs::remove_dir(path)
        } else {
            std::fs::remove_file(path)
        }
        .with_context(|| format!("removing file: {}", path.display()))
    }

    fn remove_dir(&self, path: &Path) -> Result<()> {
        if self.is_symlink(path) {
            return self.remove_file(path);
        }
        std::fs::remove_dir_all(path)
            .with_context(|| format!("removing directory: {}", path.display()))
    }

    fn symlink_file(&self, target: &Path, link: &Path) -> Result<()> {
        #[cfg(unix)]
        let result = std::os::unix::fs::symlink(target, link);
        #[cfg(windows)]
        let result = std::os::windows::fs::symlink_file(target, link);
        result.with_context(|| {
            format!(
                "creating symlink {} -> {}",
                link.display(),
                target.display()
            )
        })
    }

    fn symlink_dir(&self, target: &Path, link: &Path) -> Result<()> {
        #[cfg(unix)]
        let result = std::os::unix::fs::symlink(target, link);
        #[cfg(windows)]
        let result = std::os::windows::fs::symlink_dir(target, link);
        result.with_context(|| {
            format!(
                "creating symlink {} -> {}",
                link.display(),
                target.display()
            )
        })
    }

    fn chown(&self, path: &Path, user: &str) -> Result<()> {
        #[cfg(unix)]
        {
            let account = nix::unistd::User::from_name(user)
                .with_context(|| format!("looking up user '{user}'"))?
                .ok_or_else(|| anyhow::anyhow!("unknown user '{user}'"))?;
            chown_recursive(path, account.uid, account.gid)
        }
        #[cfg(not(unix))]
        {
            // Ownership is not modelled on this platform.
            let _ = (path, user);
            Ok(())
        }
    }

    fn read(&self, path: &Path) -> Result<String> {
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let mut entries = std::fs::read_dir(path)
            .and_then(|dir| {
                dir.map(|entry| entry.map(|e| e.path()))
                    .collect::<std::io::Result<Vec<_>>>()
            })
            .with_context(|| format!("listing {}", path.display()))?;
        entries.sort();
        Ok(entries)
    }

    fn write(&self, path: &Path, content: &str) -> Result<()> {
        std::fs::write(path, content).with_context(|| format!("writing {}", path.display()))
    }
}

/// Name of the account running this process, if it can be determined.
#[must_use]
pub fn current_user() -> Option<String> {
    #[cfg(unix)]
    {
        nix::unistd::User::from_uid(nix::unistd::Uid::current())
            .ok()
            .flatten()
            .map(|account| account.name)
    }
    #[cfg(not(unix))]
    {
        std::env::var("USERNAME").ok()
    }
}

/// Ensure the parent directory of `path` exists, creating it (and any
/// ancestors) if necessary.
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub fn ensure_parent_dir(fs: &dyn FileSystem, path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() && !fs.is_dir(parent) => {
            fs.mkdir(parent)
        }
        _ => Ok(()),
    }
}

/// Recursively copy a directory tree, merging into `dst` if it exists.
///
/// Symlinks within the source tree are *followed*: their content is copied
/// rather than the link itself.
///
/// # Errors
///
/// Returns an error if the destination directory cannot be created, a source
/// entry cannot be read, or a file cannot be copied.
pub fn copy_dir_recursive(src: &Path, dst: &Path) -> Result<()> {
    std::fs::create_dir_all(dst)
        .with_context(|| format!("creating directory {}", dst.display()))?;
    for entry in
        std::fs::read_dir(src).with_context(|| format!("reading directory {}", src.display()))?
    {
        let entry = entry.with_context(|| format!("reading entry in {}", src.display()))?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());
        if src_path.is_dir() {
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path).with_context(|| {
                format!("copying {} to {}", src_path.display(), dst_path.display())
            })?;
        }
    }
    Ok(())
}

/// Canonicalize the longest existing prefix of `path` and re-append the rest.
fn resolve_lenient(path: &Path) -> PathBuf {
    if let Ok(canonical) = dunce::canonicalize(path) {
        return canonical;
    }
    let mut missing = Vec::new();
    let mut current = path;
    while let Some(parent) = current.parent() {
        if let Some(name) = current.file_name() {
            missing.push(name.to_os_string());
        }
        if let Ok(base) = dunce::canonicalize(parent) {
            return missing.iter().rev().fold(base, |acc, name| acc.join(name));
        }
        current = parent;
    }
    path.to_path_buf()
}

/// Change ownership below `path` without following symbolic links.
#[cfg(unix)]
fn chown_recursive(path: &Path, uid: nix::unistd::Uid, gid: nix::unistd::Gid) -> Result<()> {
    let meta = std::fs::symlink_metadata(path)
        .with_context(|| format!("reading metadata: {}", path.display()))?;
    if meta.file_type().is_symlink() {
        return Ok(());
    }
    nix::unistd::chown(path, Some(uid), Some(gid))
        .with_context(|| format!("changing owner of {}", path.display()))?;
    if meta.is_dir() {
        for entry in std::fs::read_dir(path)
            .with_context(|| format!("reading directory {}", path.display()))?
        {
            let entry = entry.with_context(|| format!("reading entry in {}", path.display()))?;
            chown_recursive(&entry.path(), uid, gid)?;
        }
    }
    Ok(())
}

/// On Windows, `symlink_metadata().is_dir()` returns `false` for directory
/// symlinks, so the raw `FILE_ATTRIBUTE_DIRECTORY` bit is checked instead.
fn is_dir_like(meta: &std::fs::Metadata) -> bool {
    #[cfg(windows)]
    {
        use std::os::windows::fs::MetadataExt;
        meta.file_attributes() & 0x10 != 0
    }
    #[cfg(not(windows))]
    {
        let _ = meta;
        false
    }
}
