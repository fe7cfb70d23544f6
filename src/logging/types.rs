//! Core logging types: entry records, status, severity and the [`Log`] trait.

/// Per-entry result for summary reporting.
#[derive(Debug, Clone)]
pub struct EntryRecord {
    /// Source identifier of the entry.
    pub name: String,
    /// Final status of the entry.
    pub status: EntryStatus,
    /// Optional detail message (e.g., skip reason or error description).
    pub message: Option<String>,
}

/// Status of a processed entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryStatus {
    /// The tree validated and executed its primary path.
    Ok,
    /// A fallback alternative ran, or the entry was excluded.
    Skipped,
    /// The tree validated in dry-run mode; nothing was executed.
    DryRun,
    /// Validation rejected the tree or execution raised an error.
    Failed,
}

/// Severity of a message node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Always printed, regardless of verbosity.
    Show,
    /// Debug detail.
    Debug,
    /// Normal progress output.
    Info,
    /// Something unexpected that did not stop the entry.
    Warning,
    /// A failure; printed on stderr.
    Error,
}

impl Severity {
    /// Lower-case label used when rendering trees.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Show => "show",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warning => "warn",
            Self::Error => "error",
        }
    }
}

/// Abstraction over logging backends.
///
/// Both [`Logger`](super::logger::Logger) (direct output) and
/// [`BufferedLog`](super::buffered::BufferedLog) (captured output)
/// implement this trait, so operation code logs without knowing where
/// output goes.
pub trait Log: Send + Sync {
    /// Log a stage header (major section).
    fn stage(&self, msg: &str);
    /// Log a message that is printed regardless of verbosity.
    fn show(&self, msg: &str);
    /// Log an informational message.
    fn info(&self, msg: &str);
    /// Log a debug message (suppressed on console unless verbose).
    fn debug(&self, msg: &str);
    /// Log a warning message.
    fn warn(&self, msg: &str);
    /// Log an error message.
    fn error(&self, msg: &str);
    /// Log a dry-run action message.
    fn dry_run(&self, msg: &str);
    /// Record an entry result for the summary.
    fn record_entry(&self, name: &str, status: EntryStatus, message: Option<&str>);

    /// Dispatch `msg` to the method matching `severity`.
    fn emit(&self, severity: Severity, msg: &str) {
        match severity {
            Severity::Show => self.show(msg),
            Severity::Debug => self.debug(msg),
            Severity::Info => self.info(msg),
            Severity::Warning => self.warn(msg),
            Severity::Error => self.error(msg),
        }
    }
}
