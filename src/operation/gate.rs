//! Predicate-guarded children.
use anyhow::Result;
use std::path::PathBuf;

use super::{Context, Operation, Plan, execute_all, validate_all};
use crate::error::OperationError;

/// Predicate of a [`Gate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateKind {
    /// The path must exist; validation fails otherwise.
    Exists(PathBuf),
    /// Children apply only when the path is a directory.
    IsDir(PathBuf),
    /// Children apply only when the path is a regular file.
    IsFile(PathBuf),
    /// Children apply only when the value, fixed at build time, is `true`.
    Condition(bool),
    /// Children always apply, with confirmation forced to "yes".
    ForceYes,
}

/// Children guarded by a predicate evaluated once, during validation.
///
/// The decision is stored so that execution follows exactly the path that
/// was validated, even if the filesystem changed in between.
#[derive(Debug, Clone)]
pub struct Gate {
    kind: GateKind,
    children: Vec<Operation>,
    decision: Option<bool>,
}

impl Gate {
    /// Guard `children` with `kind`.
    #[must_use]
    pub const fn new(kind: GateKind, children: Vec<Operation>) -> Self {
        Self {
            kind,
            children,
            decision: None,
        }
    }

    /// The predicate.
    #[must_use]
    pub const fn kind(&self) -> &GateKind {
        &self.kind
    }

    /// Guarded children.
    #[must_use]
    pub fn children(&self) -> &[Operation] {
        &self.children
    }

    /// Whether the children apply; `None` until validated.
    #[must_use]
    pub const fn decision(&self) -> Option<bool> {
        self.decision
    }

    pub(super) fn label(&self) -> String {
        match &self.kind {
            GateKind::Exists(path) => format!("exists {}", path.display()),
            GateKind::IsDir(path) => format!("is-dir {}", path.display()),
            GateKind::IsFile(path) => format!("is-file {}", path.display()),
            GateKind::Condition(holds) => format!("condition {holds}"),
            GateKind::ForceYes => "force-yes".to_string(),
        }
    }

    pub(super) fn validate(
        &mut self,
        ctx: &Context<'_>,
        plan: &mut Plan,
    ) -> Result<(), OperationError> {
        let applies = match &self.kind {
            GateKind::Exists(path) => {
                if !plan.present(ctx.fs, path) {
                    self.decision = None;
                    return Err(OperationError::invalid(
                        format!("'{}' not found", path.display()),
                        self.label(),
                    ));
                }
                true
            }
            GateKind::IsDir(path) => plan.present(ctx.fs, path) && ctx.fs.is_dir(path),
            GateKind::IsFile(path) => plan.present(ctx.fs, path) && ctx.fs.is_file(path),
            GateKind::Condition(holds) => *holds,
            GateKind::ForceYes => true,
        };
        self.decision = Some(applies);
        if !applies {
            return Ok(());
        }
        if self.kind == GateKind::ForceYes {
            let flags = ctx.flags.forced_yes();
            return validate_all(&mut self.children, &ctx.with_flags(&flags), plan);
        }
        validate_all(&mut self.children, ctx, plan)
    }

    pub(super) fn execute(&self, ctx: &Context<'_>) -> Result<()> {
        match self.decision {
            None => anyhow::bail!("'{}' executed before validation", self.label()),
            Some(false) => Ok(()),
            Some(true) if self.kind == GateKind::ForceYes => {
                let flags = ctx.flags.forced_yes();
                execute_all(&self.children, &ctx.with_flags(&flags))
            }
            Some(true) => execute_all(&self.children, ctx),
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::flags::Flags;
    use crate::fs::RecordingFileSystem;
    use crate::logging::{BufferedLog, Severity};
    use crate::prompt::MockPrompt;

    fn run(tree: &mut Operation, flags: &Flags) -> (RecordingFileSystem, BufferedLog) {
        let fs = RecordingFileSystem::new();
        let log = BufferedLog::new();
        let prompt = MockPrompt::new();
        let ctx = Context::new(&fs, flags, &log, &prompt);
        tree.run(&ctx).unwrap();
        (fs, log)
    }

    #[test]
    fn exists_rejects_missing_path() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("missing");
        let fs = RecordingFileSystem::new();
        let log = BufferedLog::new();
        let prompt = MockPrompt::new();
        let flags = Flags::default();
        let ctx = Context::new(&fs, &flags, &log, &prompt);

        let mut tree = Operation::exists(&missing, vec![Operation::show("never")]);
        let err = tree.validate(&ctx).unwrap_err();
        assert!(!err.is_permission());
        assert!(err.message().ends_with("not found"));
    }

    #[test]
    fn is_dir_on_file_skips_silently() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("f");
        std::fs::write(&file, "x").unwrap();

        let mut tree = Operation::is_dir(&file, vec![Operation::show("dir")]);
        let (fs, log) = run(&mut tree, &Flags::default());
        assert!(fs.calls().is_empty());
        assert!(log.lines().is_empty());
    }

    #[test]
    fn is_dir_on_directory_runs_children() {
        let tmp = tempfile::tempdir().unwrap();
        let marker = tmp.path().join(".dotfiles-ignore");
        let mut tree = Operation::is_dir(tmp.path(), vec![Operation::write_file(&marker, "")]);
        let (fs, _log) = run(&mut tree, &Flags::default());
        assert_eq!(fs.kinds(), vec!["write"]);
        assert!(marker.exists());
    }

    #[test]
    fn is_file_on_directory_skips() {
        let tmp = tempfile::tempdir().unwrap();
        let mut tree = Operation::is_file(tmp.path(), vec![Operation::show("file")]);
        let (_fs, log) = run(&mut tree, &Flags::default());
        assert!(log.lines().is_empty());
    }

    #[test]
    fn condition_false_skips_children() {
        let mut tree = Operation::condition(false, vec![Operation::show("hidden")]);
        let (_fs, log) = run(&mut tree, &Flags::default());
        assert!(log.lines().is_empty());
    }

    #[test]
    fn condition_true_runs_children() {
        let mut tree = Operation::condition(true, vec![Operation::show("visible")]);
        let (_fs, log) = run(&mut tree, &Flags::default());
        assert_eq!(log.messages(Severity::Show), vec!["visible"]);
    }

    #[test]
    fn force_yes_answers_questions_without_prompting() {
        // MockPrompt has no expectations: any call would panic.
        let mut tree = Operation::force_yes(vec![Operation::ask(
            "proceed ?",
            vec![Operation::show("accepted")],
        )]);
        let flags = Flags {
            no: true,
            ..Flags::default()
        };
        let (_fs, log) = run(&mut tree, &flags);
        assert_eq!(log.messages(Severity::Show), vec!["accepted"]);
    }

    #[test]
    fn decision_is_taken_at_validation() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("d");
        std::fs::create_dir(&dir).unwrap();
        let fs = RecordingFileSystem::new();
        let log = BufferedLog::new();
        let prompt = MockPrompt::new();
        let flags = Flags::default();
        let ctx = Context::new(&fs, &flags, &log, &prompt);

        let mut tree = Operation::is_dir(&dir, vec![Operation::show("was a dir")]);
        tree.validate(&ctx).unwrap();
        std::fs::remove_dir(&dir).unwrap();
        tree.execute(&ctx).unwrap();
        assert!(log.contains("was a dir"));
    }

    #[test]
    fn gate_executed_without_validation_fails() {
        let fs = RecordingFileSystem::new();
        let log = BufferedLog::new();
        let prompt = MockPrompt::new();
        let flags = Flags::default();
        let ctx = Context::new(&fs, &flags, &log, &prompt);
        let tree = Operation::condition(true, vec![]);
        assert!(tree.execute(&ctx).is_err());
    }
}
