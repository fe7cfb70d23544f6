//! Process-wide run options shared by every node of an operation tree.
use std::collections::BTreeMap;

/// Read-only run options threaded through every `validate`/`execute` call.
///
/// Constructed once from the command line and configuration, then passed by
/// reference. Nodes never mutate it; [`ForceYes`](crate::operation::Gate)
/// derives an adjusted copy for its own subtree via [`Flags::forced_yes`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Flags {
    /// Skip confirmation prompts and proceed.
    pub yes: bool,
    /// Skip confirmation prompts and decline.
    pub no: bool,
    /// Bypass the read/write permission checks performed during validation.
    pub force: bool,
    /// Keep the store copy when unlinking.
    pub no_remove: bool,
    /// Validate and report, never execute.
    pub dry_run: bool,
    /// Template variables available to `WriteFileTemplate`.
    pub vars: BTreeMap<String, String>,
}

impl Flags {
    /// Copy of these flags with confirmation forced to "yes".
    #[must_use]
    pub fn forced_yes(&self) -> Self {
        Self {
            yes: true,
            no: false,
            ..self.clone()
        }
    }

    /// Add (or replace) a template variable.
    #[must_use]
    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }

    /// Boolean options exposed to templates, by name.
    #[must_use]
    pub const fn switches(&self) -> [(&'static str, bool); 4] {
        [
            ("yes", self.yes),
            ("no", self.no),
            ("force", self.force),
            ("no_remove", self.no_remove),
        ]
    }
}
