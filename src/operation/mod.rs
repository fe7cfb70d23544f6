//! Operation trees.
//!
//! A tree is built once per entry, validated as a whole, then executed. No
//! filesystem mutation happens during validation, and execution only starts
//! once every node on the selected path has validated.
//!
//! Nodes come in five shapes:
//!
//! - **composite** ([`Operation::All`]): children in order
//! - **gates** ([`Gate`]): run children when a predicate holds
//! - **fallback** ([`Fallback`]): try the primary, else the alternative
//! - **messages** ([`Message`]): log or ask, then run follow-up children
//! - **leaves** ([`Leaf`]): copy, symlink, delete, write, change owner
//!
//! Trees render as indented text through [`Display`](fmt::Display); the
//! alternative of a fallback is prefixed with `| `.

mod fallback;
mod gate;
mod leaf;
mod message;

pub use fallback::{Branch, Fallback};
pub use gate::{Gate, GateKind};
pub use leaf::{Leaf, Payload};
pub use message::{Message, MessageKind};

use anyhow::Result;
use std::fmt;
use std::ops::BitOr;
use std::path::{Path, PathBuf};

use crate::error::OperationError;
use crate::flags::Flags;
use crate::fs::FileSystem;
use crate::logging::{Log, Severity};
use crate::paths::PathPair;
use crate::prompt::Prompt;

/// Everything a node needs while validating or executing.
pub struct Context<'a> {
    /// Filesystem port.
    pub fs: &'a dyn FileSystem,
    /// Run options.
    pub flags: &'a Flags,
    /// Log sink.
    pub log: &'a dyn Log,
    /// Source of confirmation answers.
    pub prompt: &'a dyn Prompt,
}

impl<'a> Context<'a> {
    /// Bundle the collaborators of a run.
    #[must_use]
    pub fn new(
        fs: &'a dyn FileSystem,
        flags: &'a Flags,
        log: &'a dyn Log,
        prompt: &'a dyn Prompt,
    ) -> Self {
        Self {
            fs,
            flags,
            log,
            prompt,
        }
    }

    /// The same context with different flags.
    #[must_use]
    pub fn with_flags<'b>(&'b self, flags: &'b Flags) -> Context<'b> {
        Context {
            fs: self.fs,
            flags,
            log: self.log,
            prompt: self.prompt,
        }
    }
}

impl fmt::Debug for Context<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("fs", &self.fs)
            .field("flags", &self.flags)
            .finish_non_exhaustive()
    }
}

/// Effects scheduled by already-validated siblings.
///
/// Validation happens before anything runs, so a node that follows a
/// `Delete` would otherwise see the deleted path as still present. Removals
/// are recorded here and consulted by later nodes of the same tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Plan {
    removals: Vec<PathBuf>,
}

impl Plan {
    /// Record that `path` will be removed before later siblings run.
    pub fn schedule_removal(&mut self, path: &Path) {
        if !self.removes(path) {
            self.removals.push(path.to_path_buf());
        }
    }

    /// Returns `true` if `path` is scheduled for removal.
    #[must_use]
    pub fn removes(&self, path: &Path) -> bool {
        self.removals.iter().any(|p| p == path)
    }

    /// Returns `true` if `path` exists now and is not scheduled for removal.
    #[must_use]
    pub fn present(&self, fs: &dyn FileSystem, path: &Path) -> bool {
        !self.removes(path) && fs.exists(path)
    }
}

/// A node of an operation tree.
#[derive(Debug, Clone)]
pub enum Operation {
    /// Children validated and executed in order.
    All(Vec<Self>),
    /// Children guarded by a predicate.
    Gate(Gate),
    /// Primary with an alternative used when the primary does not validate.
    Fallback(Fallback),
    /// Log line or question followed by children.
    Message(Message),
    /// A single filesystem action.
    Leaf(Leaf),
}

impl Operation {
    // -----------------------------------------------------------------------
    // Constructors
    // -----------------------------------------------------------------------

    /// Run `children` in order.
    #[must_use]
    pub const fn all(children: Vec<Self>) -> Self {
        Self::All(children)
    }

    /// Run `children` if `path` exists; fail validation otherwise.
    pub fn exists(path: impl Into<PathBuf>, children: Vec<Self>) -> Self {
        Self::Gate(Gate::new(GateKind::Exists(path.into()), children))
    }

    /// Run `children` if `path` is a directory; skip silently otherwise.
    pub fn is_dir(path: impl Into<PathBuf>, children: Vec<Self>) -> Self {
        Self::Gate(Gate::new(GateKind::IsDir(path.into()), children))
    }

    /// Run `children` if `path` is a regular file; skip silently otherwise.
    pub fn is_file(path: impl Into<PathBuf>, children: Vec<Self>) -> Self {
        Self::Gate(Gate::new(GateKind::IsFile(path.into()), children))
    }

    /// Run `children` if `holds`, decided when the tree is built.
    #[must_use]
    pub fn condition(holds: bool, children: Vec<Self>) -> Self {
        Self::Gate(Gate::new(GateKind::Condition(holds), children))
    }

    /// Run `children` as if every confirmation were answered "yes".
    #[must_use]
    pub fn force_yes(children: Vec<Self>) -> Self {
        Self::Gate(Gate::new(GateKind::ForceYes, children))
    }

    /// Log `text` at `severity`.
    pub fn message(severity: Severity, text: impl Into<String>) -> Self {
        Self::Message(Message::new(MessageKind::Log(severity), text, Vec::new()))
    }

    /// Log `text` at `severity`, then run `next`.
    pub fn message_then(severity: Severity, text: impl Into<String>, next: Vec<Self>) -> Self {
        Self::Message(Message::new(MessageKind::Log(severity), text, next))
    }

    /// Log `text` at every verbosity.
    pub fn show(text: impl Into<String>) -> Self {
        Self::message(Severity::Show, text)
    }

    /// Log `text` as an error.
    pub fn error(text: impl Into<String>) -> Self {
        Self::message(Severity::Error, text)
    }

    /// Ask `question`; run `next` only when the answer is yes.
    pub fn ask(question: impl Into<String>, next: Vec<Self>) -> Self {
        Self::Message(Message::new(MessageKind::Ask, question, next))
    }

    /// Copy `source` to `destination`.
    pub fn copy(source: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        Self::Leaf(Leaf::Copy(PathPair::new(source, destination)))
    }

    /// Replace `destination` with a link to `source`.
    pub fn symlink(source: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        Self::Leaf(Leaf::Symlink(PathPair::new(source, destination)))
    }

    /// Remove `path`.
    pub fn delete(path: impl Into<PathBuf>) -> Self {
        Self::Leaf(Leaf::Delete(PathPair::single(path)))
    }

    /// Write `content` to `path`.
    pub fn write_file(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self::Leaf(Leaf::WriteFile {
            pair: PathPair::single(path),
            payload: Payload::Literal(content.into()),
        })
    }

    /// Expand the template variables found in `path` in place.
    pub fn write_template(path: impl Into<PathBuf>) -> Self {
        Self::Leaf(Leaf::WriteFile {
            pair: PathPair::single(path),
            payload: Payload::Template,
        })
    }

    /// Give `path` to `user`.
    pub fn change_owner(path: impl Into<PathBuf>, user: impl Into<String>) -> Self {
        Self::Leaf(Leaf::ChangeOwner {
            pair: PathPair::single(path),
            user: user.into(),
        })
    }

    /// Use `alternative` when `self` does not validate.
    #[must_use]
    pub fn or(self, alternative: Self) -> Self {
        Self::Fallback(Fallback::new(self, alternative))
    }

    // -----------------------------------------------------------------------
    // Validation and execution
    // -----------------------------------------------------------------------

    /// Check that the tree can run, deciding gates and fallbacks.
    ///
    /// # Errors
    ///
    /// Returns the first [`OperationError`] raised along the selected path.
    pub fn validate(&mut self, ctx: &Context<'_>) -> Result<(), OperationError> {
        self.validate_in(ctx, &mut Plan::default())
    }

    /// [`validate`](Self::validate) against effects already scheduled in `plan`.
    ///
    /// # Errors
    ///
    /// Returns the first [`OperationError`] raised along the selected path.
    pub fn validate_in(
        &mut self,
        ctx: &Context<'_>,
        plan: &mut Plan,
    ) -> Result<(), OperationError> {
        match self {
            Self::All(children) => validate_all(children, ctx, plan),
            Self::Gate(gate) => gate.validate(ctx, plan),
            Self::Fallback(fallback) => fallback.validate(ctx, plan),
            Self::Message(message) => message.validate(ctx, plan),
            Self::Leaf(leaf) => leaf.validate(ctx, plan),
        }
    }

    /// Perform the selected path of a validated tree.
    ///
    /// # Errors
    ///
    /// Returns an error if a filesystem action fails, a template does not
    /// expand, or a fallback was never validated.
    pub fn execute(&self, ctx: &Context<'_>) -> Result<()> {
        match self {
            Self::All(children) => execute_all(children, ctx),
            Self::Gate(gate) => gate.execute(ctx),
            Self::Fallback(fallback) => fallback.execute(ctx),
            Self::Message(message) => message.execute(ctx),
            Self::Leaf(leaf) => leaf.execute(ctx),
        }
    }

    /// Validate, then execute.
    ///
    /// # Errors
    ///
    /// Returns the validation error or the execution error.
    pub fn run(&mut self, ctx: &Context<'_>) -> Result<()> {
        self.validate(ctx)?;
        self.execute(ctx)
    }

    /// Returns `true` if validation selected the alternative of any fallback
    /// on the path that will execute.
    #[must_use]
    pub fn fell_back(&self) -> bool {
        match self {
            Self::All(children) => children.iter().any(Self::fell_back),
            Self::Gate(gate) => {
                gate.decision() == Some(true) && gate.children().iter().any(Self::fell_back)
            }
            Self::Fallback(fallback) => match fallback.selected() {
                Some(Branch::Alternative) => true,
                Some(Branch::Primary) => fallback.primary().fell_back(),
                None => false,
            },
            Self::Message(message) => message.next().iter().any(Self::fell_back),
            Self::Leaf(_) => false,
        }
    }

    // -----------------------------------------------------------------------
    // Rendering
    // -----------------------------------------------------------------------

    /// One-line description of this node, without its children.
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::All(_) => "all".to_string(),
            Self::Gate(gate) => gate.label(),
            Self::Fallback(_) => "fallback".to_string(),
            Self::Message(message) => message.label(),
            Self::Leaf(leaf) => leaf.label(),
        }
    }

    fn render(&self, lines: &mut Vec<String>, depth: usize, prefix: &str) {
        if let Self::Fallback(fallback) = self {
            fallback.primary().render(lines, depth, prefix);
            fallback.alternative().render(lines, depth, "| ");
            return;
        }
        lines.push(format!("{:indent$}{prefix}{}", "", self.label(), indent = depth * 2));
        let children: &[Self] = match self {
            Self::All(children) => children,
            Self::Gate(gate) => gate.children(),
            Self::Message(message) => message.next(),
            Self::Fallback(_) | Self::Leaf(_) => &[],
        };
        for child in children {
            child.render(lines, depth + 1, "");
        }
    }
}

impl BitOr for Operation {
    type Output = Self;

    fn bitor(self, alternative: Self) -> Self {
        self.or(alternative)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut lines = Vec::new();
        self.render(&mut lines, 0, "");
        f.write_str(&lines.join("\n"))
    }
}

/// Validate `children` in order, stopping at the first rejection.
pub(crate) fn validate_all(
    children: &mut [Operation],
    ctx: &Context<'_>,
    plan: &mut Plan,
) -> Result<(), OperationError> {
    children
        .iter_mut()
        .try_for_each(|child| child.validate_in(ctx, plan))
}

/// Execute `children` in order, stopping at the first error.
pub(crate) fn execute_all(children: &[Operation], ctx: &Context<'_>) -> Result<()> {
    children.iter().try_for_each(|child| child.execute(ctx))
}
