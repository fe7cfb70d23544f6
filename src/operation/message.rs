//! Log lines and questions embedded in a tree.
use anyhow::Result;

use super::{Context, Operation, Plan, execute_all, validate_all};
use crate::error::OperationError;
use crate::logging::{Severity, strip_ansi};
use crate::prompt;

/// What a [`Message`] does when executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    /// Log the text at a severity, then run the follow-up children.
    Log(Severity),
    /// Ask the text as a yes/no question; run the children on "yes".
    Ask,
}

/// A message node.
///
/// Messages never fail validation on their own; their follow-up children
/// are validated like any other subtree.
#[derive(Debug, Clone)]
pub struct Message {
    kind: MessageKind,
    text: String,
    next: Vec<Operation>,
}

impl Message {
    /// Create a message of `kind` followed by `next`.
    pub fn new(kind: MessageKind, text: impl Into<String>, next: Vec<Operation>) -> Self {
        Self {
            kind,
            text: text.into(),
            next,
        }
    }

    /// The text logged or asked.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Follow-up children.
    #[must_use]
    pub fn next(&self) -> &[Operation] {
        &self.next
    }

    pub(super) fn label(&self) -> String {
        let text = strip_ansi(&self.text);
        match self.kind {
            MessageKind::Log(severity) => format!("{} {text}", severity.label()),
            MessageKind::Ask => format!("ask {text}"),
        }
    }

    /// Answer to the question, honouring the `yes` and `no` flags before
    /// asking interactively.
    ///
    /// # Errors
    ///
    /// Returns an error if the prompt cannot be read.
    pub fn confirmed(&self, ctx: &Context<'_>) -> Result<bool> {
        if ctx.flags.yes {
            return Ok(true);
        }
        if ctx.flags.no {
            return Ok(false);
        }
        Ok(prompt::confirm(ctx.prompt, ctx.log, &self.text)?)
    }

    pub(super) fn validate(
        &mut self,
        ctx: &Context<'_>,
        plan: &mut Plan,
    ) -> Result<(), OperationError> {
        validate_all(&mut self.next, ctx, plan)
    }

    pub(super) fn execute(&self, ctx: &Context<'_>) -> Result<()> {
        match self.kind {
            MessageKind::Log(severity) => {
                ctx.log.emit(severity, &self.text);
                execute_all(&self.next, ctx)
            }
            MessageKind::Ask => {
                if self.confirmed(ctx)? {
                    execute_all(&self.next, ctx)
                } else {
                    ctx.log.debug(&format!("declined: {}", self.text));
                    Ok(())
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::flags::Flags;
    use crate::fs::RecordingFileSystem;
    use crate::logging::BufferedLog;
    use crate::prompt::MockPrompt;

    #[test]
    fn message_logs_then_runs_next() {
        let fs = RecordingFileSystem::new();
        let log = BufferedLog::new();
        let prompt = MockPrompt::new();
        let flags = Flags::default();
        let ctx = Context::new(&fs, &flags, &log, &prompt);

        let mut tree = Operation::message_then(
            Severity::Warning,
            "first",
            vec![Operation::message(Severity::Info, "second")],
        );
        tree.run(&ctx).unwrap();
        assert_eq!(log.messages(Severity::Warning), vec!["first"]);
        assert_eq!(log.messages(Severity::Info), vec!["second"]);
    }

    #[test]
    fn ask_runs_next_on_yes() {
        let fs = RecordingFileSystem::new();
        let log = BufferedLog::new();
        let mut prompt = MockPrompt::new();
        prompt
            .expect_ask()
            .times(1)
            .returning(|_| Ok(Some("yes\n".to_string())));
        let flags = Flags::default();
        let ctx = Context::new(&fs, &flags, &log, &prompt);

        let mut tree = Operation::ask("continue ?", vec![Operation::show("continued")]);
        tree.run(&ctx).unwrap();
        assert!(log.contains("continued"));
    }

    #[test]
    fn ask_skips_next_on_no() {
        let fs = RecordingFileSystem::new();
        let log = BufferedLog::new();
        let mut prompt = MockPrompt::new();
        prompt
            .expect_ask()
            .times(1)
            .returning(|_| Ok(Some("n".to_string())));
        let flags = Flags::default();
        let ctx = Context::new(&fs, &flags, &log, &prompt);

        let mut tree = Operation::ask("continue ?", vec![Operation::show("continued")]);
        tree.run(&ctx).unwrap();
        assert!(!log.contains("continued"));
    }

    #[test]
    fn no_flag_declines_without_prompting() {
        let fs = RecordingFileSystem::new();
        let log = BufferedLog::new();
        let prompt = MockPrompt::new();
        let flags = Flags {
            no: true,
            ..Flags::default()
        };
        let ctx = Context::new(&fs, &flags, &log, &prompt);

        let mut tree = Operation::ask("continue ?", vec![Operation::show("continued")]);
        tree.run(&ctx).unwrap();
        assert!(!log.contains("continued"));
    }

    #[test]
    fn label_strips_styling() {
        let tree = Operation::error("'\x1b[1;31m/h/.vimrc\x1b[0m' not exists");
        assert_eq!(tree.label(), "error '/h/.vimrc' not exists");
    }
}
