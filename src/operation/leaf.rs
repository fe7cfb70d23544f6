//! Leaf operations: the only nodes that touch the filesystem.
use anyhow::{Context as _, Result};
use std::path::Path;

use super::{Context, Plan};
use crate::error::OperationError;
use crate::fs::{EntryKind, FileSystem, ensure_parent_dir};
use crate::logging::highlight;
use crate::paths::PathPair;
use crate::{prompt, template};

/// Content written by [`Leaf::WriteFile`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// Fixed text.
    Literal(String),
    /// The file's own content, expanded as a template.
    Template,
}

/// A single filesystem action.
///
/// Every leaf runs the same access checks during validation: an existing
/// source must be a file or directory and readable, and an existing
/// destination must be writable. `force` skips the two permission checks.
#[derive(Debug, Clone)]
pub enum Leaf {
    /// Copy a file or directory tree, creating parent directories.
    Copy(PathPair),
    /// Replace the destination with a link to the source.
    Symlink(PathPair),
    /// Remove a file, a directory tree, or a link (never its target).
    Delete(PathPair),
    /// Write content to a file.
    WriteFile {
        /// Target file (source and destination are the same).
        pair: PathPair,
        /// What to write.
        payload: Payload,
    },
    /// Give a path to a user.
    ChangeOwner {
        /// Target path (source and destination are the same).
        pair: PathPair,
        /// Account name.
        user: String,
    },
}

impl Leaf {
    /// The paths this leaf acts on.
    #[must_use]
    pub const fn pair(&self) -> &PathPair {
        match self {
            Self::Copy(pair) | Self::Symlink(pair) | Self::Delete(pair) => pair,
            Self::WriteFile { pair, .. } | Self::ChangeOwner { pair, .. } => pair,
        }
    }

    /// One-line description. Links render as `link -> target`.
    pub(super) fn label(&self) -> String {
        let pair = self.pair();
        let (source, destination) = (pair.source().display(), pair.destination().display());
        match self {
            Self::Copy(_) => format!("copy {source} -> {destination}"),
            Self::Symlink(_) => format!("symlink {destination} -> {source}"),
            Self::Delete(_) => format!("delete {destination}"),
            Self::WriteFile {
                payload: Payload::Literal(_),
                ..
            } => format!("write {destination}"),
            Self::WriteFile {
                payload: Payload::Template,
                ..
            } => format!("template {destination}"),
            Self::ChangeOwner { user, .. } => format!("chown {destination} {user}"),
        }
    }

    pub(super) fn validate(
        &self,
        ctx: &Context<'_>,
        plan: &mut Plan,
    ) -> Result<(), OperationError> {
        // Copy rejections take precedence over permission errors.
        if let Self::Copy(pair) = self {
            self.check_copy(ctx, plan, pair)?;
        }
        self.check_access(ctx, plan)?;
        if let Self::Delete(pair) = self {
            plan.schedule_removal(pair.destination());
        }
        Ok(())
    }

    fn check_access(&self, ctx: &Context<'_>, plan: &Plan) -> Result<(), OperationError> {
        let pair = self.pair();
        let (source, destination) = (pair.source(), pair.destination());
        if plan.present(ctx.fs, source) {
            if EntryKind::probe(ctx.fs, source).is_none() {
                return Err(OperationError::invalid(
                    format!("invalid type of file '{}'", source.display()),
                    self.label(),
                ));
            }
            if !ctx.flags.force && !ctx.fs.can_read(source) {
                return Err(OperationError::permission(
                    format!("Read Permission denied '{}'", source.display()),
                    self.label(),
                ));
            }
        }
        if plan.present(ctx.fs, destination) && !ctx.flags.force && !ctx.fs.can_write(destination)
        {
            return Err(OperationError::permission(
                format!("Write Permission denied '{}'", destination.display()),
                self.label(),
            ));
        }
        Ok(())
    }

    fn check_copy(
        &self,
        ctx: &Context<'_>,
        plan: &Plan,
        pair: &PathPair,
    ) -> Result<(), OperationError> {
        let (source, destination) = (pair.source(), pair.destination());
        if plan.removes(source) {
            return Err(OperationError::invalid(
                format!("'{}' is removed before it can be copied", source.display()),
                self.label(),
            ));
        }
        let collides = pair.is_single()
            || (!plan.removes(destination)
                && ctx.fs.resolve(source) == ctx.fs.resolve(destination));
        if collides {
            return Err(OperationError::invalid(
                format!("'{}' already linked", source.display()),
                self.label(),
            ));
        }
        Ok(())
    }

    pub(super) fn execute(&self, ctx: &Context<'_>) -> Result<()> {
        match self {
            Self::Copy(pair) => copy(ctx, pair.source(), pair.destination()),
            Self::Symlink(pair) => symlink(ctx, pair.source(), pair.destination()),
            Self::Delete(pair) => delete(ctx, pair.destination()),
            Self::WriteFile {
                pair,
                payload: Payload::Literal(content),
            } => {
                let path = pair.destination();
                ensure_parent_dir(ctx.fs, path)?;
                ctx.fs.write(path, content)?;
                ctx.log.info(&format!("write file '{}'", highlight(path)));
                Ok(())
            }
            Self::WriteFile {
                pair,
                payload: Payload::Template,
            } => expand_template(ctx, pair.destination()),
            Self::ChangeOwner { pair, user } => {
                let path = pair.destination();
                ctx.fs.chown(path, user)?;
                ctx.log
                    .debug(&format!("change owner '{}' to {user}", highlight(path)));
                Ok(())
            }
        }
    }
}

fn copy(ctx: &Context<'_>, source: &Path, destination: &Path) -> Result<()> {
    let Some(kind) = EntryKind::probe(ctx.fs, source) else {
        ctx.log
            .warn(&format!("nothing to copy at '{}'", highlight(source)));
        return Ok(());
    };
    ensure_parent_dir(ctx.fs, destination)?;
    if ctx.fs.is_symlink(destination) {
        ctx.fs.remove_file(destination)?;
    }
    match kind {
        EntryKind::File => ctx.fs.copy_file(source, destination)?,
        EntryKind::Directory => ctx.fs.copy_dir(source, destination)?,
    }
    ctx.log
        .info(&format!("copy {} '{}'", kind.noun(), highlight(destination)));
    Ok(())
}

fn symlink(ctx: &Context<'_>, target: &Path, link: &Path) -> Result<()> {
    let fs = ctx.fs;
    let Some(kind) = EntryKind::probe(fs, target) else {
        ctx.log.warn(&format!(
            "'{}' not found, symlink '{}' skipped",
            highlight(target),
            highlight(link)
        ));
        return Ok(());
    };
    if fs.exists(link) || fs.is_symlink(link) {
        if fs.resolve(link) == fs.resolve(target) {
            ctx.log
                .show(&format!("symlink already exists '{}', ignore...", highlight(link)));
            return Ok(());
        }
        if ctx.flags.no {
            ctx.log
                .show(&format!("symlink '{}' ignored...", highlight(link)));
            return Ok(());
        }
        if !ctx.flags.yes {
            let question = format!("'{}' already exists, remove it ?", highlight(link));
            if !prompt::confirm(ctx.prompt, ctx.log, &question)? {
                ctx.log
                    .show(&format!("symlink '{}' ignored...", highlight(link)));
                return Ok(());
            }
        }
        remove_entry(fs, link)?;
    }
    ensure_parent_dir(fs, link)?;
    match kind {
        EntryKind::File => fs.symlink_file(target, link)?,
        EntryKind::Directory => fs.symlink_dir(target, link)?,
    }
    ctx.log
        .info(&format!("symlink {} '{}'", kind.noun(), highlight(link)));
    Ok(())
}

fn delete(ctx: &Context<'_>, path: &Path) -> Result<()> {
    let noun = if ctx.fs.is_symlink(path) {
        ctx.fs.remove_file(path)?;
        "symlink"
    } else {
        let Some(kind) = EntryKind::probe(ctx.fs, path) else {
            ctx.log
                .debug(&format!("nothing to delete at '{}'", highlight(path)));
            return Ok(());
        };
        match kind {
            EntryKind::File => ctx.fs.remove_file(path)?,
            EntryKind::Directory => ctx.fs.remove_dir(path)?,
        }
        kind.noun()
    };
    ctx.log.info(&format!("delete {noun} '{}'", highlight(path)));
    Ok(())
}

/// Expand `path` in place, or every file below it when it is a directory.
fn expand_template(ctx: &Context<'_>, path: &Path) -> Result<()> {
    if ctx.fs.is_dir(path) {
        for child in ctx.fs.read_dir(path)? {
            if !ctx.fs.is_symlink(&child) {
                expand_template(ctx, &child)?;
            }
        }
        return Ok(());
    }
    if !ctx.fs.is_file(path) || !template::is_text_file(path) {
        ctx.log
            .debug(&format!("'{}' is not a text file, left as is", highlight(path)));
        return Ok(());
    }
    let current = ctx.fs.read(path)?;
    let expanded = template::expand(&current, ctx.flags)
        .with_context(|| format!("expanding template {}", path.display()))?;
    let Some(expanded) = expanded else {
        ctx.log
            .warn(&format!("'{}' is not a valid template, left as is", highlight(path)));
        return Ok(());
    };
    if expanded == current {
        return Ok(());
    }
    ctx.fs.write(path, &expanded)?;
    ctx.log
        .info(&format!("expand template '{}'", highlight(path)));
    Ok(())
}

/// Remove whatever is at `path` without following links.
fn remove_entry(fs: &dyn FileSystem, path: &Path) -> Result<()> {
    if fs.is_symlink(path) || fs.is_file(path) {
        fs.remove_file(path)
    } else {
        fs.remove_dir(path)
    }
}
