//! In-memory logger that captures output for later inspection.
use std::sync::Mutex;

use super::types::{EntryRecord, EntryStatus, Log, Severity};

/// Kind of a captured line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// A stage header.
    Stage,
    /// A message at the given severity.
    Message(Severity),
    /// A dry-run line.
    DryRun,
}

/// A single buffered line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    /// What kind of line this is.
    pub kind: LineKind,
    /// The message text, including any ANSI styling.
    pub text: String,
}

/// Implement the display methods of [`Log`] by buffering each message as a
/// [`Line`] of the corresponding kind.
macro_rules! buffer_log_methods {
    ($($method:ident => $kind:expr),+ $(,)?) => {
        $(
            fn $method(&self, msg: &str) {
                self.push($kind, msg);
            }
        )+
    };
}

/// Logger that keeps every line and entry record in memory.
///
/// Used wherever output must be inspected rather than printed.
#[derive(Debug, Default)]
pub struct BufferedLog {
    lines: Mutex<Vec<Line>>,
    records: Mutex<Vec<EntryRecord>>,
}

impl BufferedLog {
    /// Create an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, kind: LineKind, msg: &str) {
        if let Ok(mut guard) = self.lines.lock() {
            guard.push(Line {
                kind,
                text: msg.to_string(),
            });
        }
    }

    /// All captured lines, in order.
    #[must_use]
    pub fn lines(&self) -> Vec<Line> {
        self.lines.lock().map_or_else(|_| vec![], |g| g.clone())
    }

    /// Captured message texts at `severity`, with ANSI codes stripped.
    #[must_use]
    pub fn messages(&self, severity: Severity) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter(|line| line.kind == LineKind::Message(severity))
            .map(|line| super::strip_ansi(&line.text))
            .collect()
    }

    /// Returns `true` if any captured line contains `needle` (ANSI stripped).
    #[must_use]
    pub fn contains(&self, needle: &str) -> bool {
        self.lines()
            .iter()
            .any(|line| super::strip_ansi(&line.text).contains(needle))
    }

    /// All recorded entry results.
    #[must_use]
    pub fn records(&self) -> Vec<EntryRecord> {
        self.records.lock().map_or_else(|_| vec![], |g| g.clone())
    }
}

impl Log for BufferedLog {
    buffer_log_methods! {
        stage   => LineKind::Stage,
        show    => LineKind::Message(Severity::Show),
        info    => LineKind::Message(Severity::Info),
        debug   => LineKind::Message(Severity::Debug),
        warn    => LineKind::Message(Severity::Warning),
        error   => LineKind::Message(Severity::Error),
        dry_run => LineKind::DryRun,
    }

    fn record_entry(&self, name: &str, status: EntryStatus, message: Option<&str>) {
        if let Ok(mut guard) = self.records.lock() {
            guard.push(EntryRecord {
                name: name.to_string(),
                status,
                message: message.map(String::from),
            });
        }
    }
}
