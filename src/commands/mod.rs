//! Command handlers and the per-entry driver they share.
//!
//! Each command builds one operation tree per entry, then hands the trees to
//! [`process_entry`], which validates, reports and executes them one at a
//! time. A failing entry never stops the entries after it.
pub mod install;
pub mod link;
pub mod unlink;

use anyhow::Result;

use crate::cli::{EntryOpts, GlobalOpts};
use crate::config::Settings;
use crate::error::PathError;
use crate::fs::{FileSystem, SystemFileSystem};
use crate::logging::{EntryStatus, Log, Logger};
use crate::operation::{Context, Operation};
use crate::paths::{PathDeriver, PathPair};
use crate::prompt::StdinPrompt;

/// Builds the tree for one derived `(home, store)` pair.
pub type TreeBuilder = fn(&PathPair, &Settings, &dyn FileSystem) -> Operation;

/// Shared state produced by the common command setup sequence.
#[derive(Debug)]
pub struct CommandSetup {
    /// Resolved settings.
    pub settings: Settings,
    /// Maps entry identifiers to path pairs.
    pub deriver: PathDeriver,
}

impl CommandSetup {
    /// Resolve settings and prepare path derivation.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded or resolved.
    pub fn init(global: &GlobalOpts, log: &Logger) -> Result<Self> {
        log.stage("Resolving settings");
        let settings = Settings::from_env(global)?;
        Ok(Self::from_settings(settings, log))
    }

    /// Prepare path derivation for already resolved `settings`.
    pub fn from_settings(settings: Settings, log: &dyn Log) -> Self {
        log.info(&format!("home: {}", settings.home.display()));
        log.info(&format!("store: {}", settings.store.display()));
        log.debug(&format!("owner: {}", settings.user));
        log.debug(&format!("{} template variable(s)", settings.flags.vars.len()));
        let deriver = PathDeriver::new(&settings.home, &settings.store, &settings.ignore_marker);
        Self { settings, deriver }
    }

    /// Identifiers to process: the command line, else the config file.
    #[must_use]
    pub fn identifiers(&self, opts: &EntryOpts) -> Vec<String> {
        if opts.paths.is_empty() {
            self.settings.entries.clone()
        } else {
            opts.paths.clone()
        }
    }

    /// Derive the pair for `raw` and build its tree.
    ///
    /// # Errors
    ///
    /// Returns [`PathError`] if `raw` cannot be mapped to a pair.
    pub fn tree(
        &self,
        fs: &dyn FileSystem,
        raw: &str,
        build: TreeBuilder,
    ) -> Result<Operation, PathError> {
        let pair = self.deriver.derive(fs, raw)?;
        Ok(build(&pair, &self.settings, fs))
    }
}

/// Run `build` over every entry with the real filesystem and stdin prompt.
///
/// # Errors
///
/// Returns an error if setup fails or one or more entries failed.
pub fn run_with(
    global: &GlobalOpts,
    opts: &EntryOpts,
    log: &Logger,
    build: TreeBuilder,
) -> Result<()> {
    let setup = CommandSetup::init(global, log)?;
    let identifiers = setup.identifiers(opts);
    if identifiers.is_empty() {
        log.warn("no entries given and none configured");
        return Ok(());
    }

    let fs = SystemFileSystem;
    let prompt = StdinPrompt;
    let ctx = Context::new(&fs, &setup.settings.flags, log, &prompt);

    log.stage("Processing entries");
    for raw in &identifiers {
        process_entry(raw, setup.tree(&fs, raw, build), &ctx);
    }

    log.print_summary();

    let count = log.failure_count();
    if count > 0 {
        anyhow::bail!("{count} entr{} failed", if count == 1 { "y" } else { "ies" });
    }
    Ok(())
}

/// Validate and execute one entry's tree, recording the outcome.
///
/// Nothing is executed unless the whole tree validates. In dry-run mode the
/// validated tree is reported instead of executed.
pub fn process_entry(
    name: &str,
    tree: Result<Operation, PathError>,
    ctx: &Context<'_>,
) -> EntryStatus {
    let log = ctx.log;
    let (status, message) = match tree {
        Err(err @ PathError::Ignored { .. }) => {
            log.warn(&err.to_string());
            (EntryStatus::Skipped, Some(err.to_string()))
        }
        Err(err) => {
            log.error(&err.to_string());
            (EntryStatus::Failed, Some(err.to_string()))
        }
        Ok(mut tree) => {
            log.debug(&format!("{name}:\n{tree}"));
            run_tree(&mut tree, ctx)
        }
    };
    log.record_entry(name, status, message.as_deref());
    status
}

fn run_tree(tree: &mut Operation, ctx: &Context<'_>) -> (EntryStatus, Option<String>) {
    let log = ctx.log;
    if let Err(err) = tree.validate(ctx) {
        log.error(err.message());
        log.debug(&format!("rejected by: {}", err.node()));
        return (EntryStatus::Failed, Some(err.message().to_string()));
    }
    if ctx.flags.dry_run {
        for line in tree.to_string().lines() {
            log.dry_run(line);
        }
        return (EntryStatus::DryRun, None);
    }
    if let Err(err) = tree.execute(ctx) {
        log.error(&format!("{err:#}"));
        return (EntryStatus::Failed, Some(format!("{err:#}")));
    }
    if tree.fell_back() {
        (EntryStatus::Skipped, None)
    } else {
        (EntryStatus::Ok, None)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::flags::Flags;
    use crate::fs::RecordingFileSystem;
    use crate::logging::{BufferedLog, LineKind, Severity};
    use crate::prompt::MockPrompt;

    struct Harness {
        fs: RecordingFileSystem,
        flags: Flags,
        log: BufferedLog,
        prompt: MockPrompt,
    }

    impl Harness {
        fn new(flags: Flags) -> Self {
            Self {
                fs: RecordingFileSystem::new(),
                flags,
                log: BufferedLog::new(),
                prompt: MockPrompt::new(),
            }
        }

        fn process(&self, tree: Result<Operation, PathError>) -> EntryStatus {
            let ctx = Context::new(&self.fs, &self.flags, &self.log, &self.prompt);
            process_entry("entry", tree, &ctx)
        }
    }

    #[test]
    fn validated_tree_executes() {
        let tmp = tempfile::tempdir().unwrap();
        let h = Harness::new(Flags::default());
        let file = tmp.path().join("f");
        let status = h.process(Ok(Operation::write_file(&file, "x")));
        assert_eq!(status, EntryStatus::Ok);
        assert!(file.exists());
        assert_eq!(h.log.records()[0].status, EntryStatus::Ok);
    }

    #[test]
    fn rejected_tree_fails_without_mutation() {
        let tmp = tempfile::tempdir().unwrap();
        let h = Harness::new(Flags::default());
        let tree = Operation::all(vec![
            Operation::write_file(tmp.path().join("f"), "x"),
            Operation::exists(tmp.path().join("missing"), vec![]),
        ]);
        assert_eq!(h.process(Ok(tree)), EntryStatus::Failed);
        assert!(h.fs.calls().is_empty());
        assert_eq!(h.log.messages(Severity::Error).len(), 1);
    }

    #[test]
    fn absorbed_fallback_is_skipped() {
        let tmp = tempfile::tempdir().unwrap();
        let h = Harness::new(Flags::default());
        let tree = Operation::exists(tmp.path().join("missing"), vec![])
            | Operation::error("'missing' not exists");
        assert_eq!(h.process(Ok(tree)), EntryStatus::Skipped);
        assert!(h.log.contains("not exists"));
    }

    #[test]
    fn dry_run_reports_tree_and_executes_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        let h = Harness::new(Flags {
            dry_run: true,
            ..Flags::default()
        });
        let file = tmp.path().join("f");
        let status = h.process(Ok(Operation::write_file(&file, "x")));
        assert_eq!(status, EntryStatus::DryRun);
        assert!(h.fs.calls().is_empty());
        assert!(
            h.log
                .lines()
                .iter()
                .any(|l| l.kind == LineKind::DryRun && l.text.starts_with("write "))
        );
    }

    #[test]
    fn ignored_identifier_is_skipped_with_warning() {
        let h = Harness::new(Flags::default());
        let err = PathError::Ignored {
            path: "/h/.config/nvim/init.lua".to_string(),
            reason: "'/h/.config/nvim' is managed as a whole".to_string(),
        };
        assert_eq!(h.process(Err(err)), EntryStatus::Skipped);
        assert_eq!(h.log.messages(Severity::Warning).len(), 1);
    }

    #[test]
    fn unmappable_identifier_fails() {
        let h = Harness::new(Flags::default());
        let err = PathError::OutsideHome {
            path: "/etc/hosts".to_string(),
            home: "/h".to_string(),
        };
        assert_eq!(h.process(Err(err)), EntryStatus::Failed);
    }

    #[test]
    fn execute_error_marks_entry_failed() {
        let tmp = tempfile::tempdir().unwrap();
        let h = Harness::new(Flags::default());
        let file = tmp.path().join("broken.conf");
        std::fs::write(&file, "{{ missing_variable }}").unwrap();
        let status = h.process(Ok(Operation::write_template(&file)));
        assert_eq!(status, EntryStatus::Failed);
        assert!(h.log.records()[0].message.is_some());
    }

    #[test]
    fn identifiers_prefer_command_line() {
        let log = BufferedLog::new();
        let settings = Settings {
            store: "/h/dotfiles".into(),
            home: "/h".into(),
            user: "alice".to_string(),
            ignore_marker: crate::paths::DEFAULT_IGNORE_MARKER.to_string(),
            entries: vec!["~/.bashrc".to_string()],
            flags: Flags::default(),
        };
        let setup = CommandSetup::from_settings(settings, &log);
        assert_eq!(setup.identifiers(&EntryOpts::default()), vec!["~/.bashrc"]);
        let opts = EntryOpts {
            paths: vec!["~/.vimrc".to_string()],
        };
        assert_eq!(setup.identifiers(&opts), vec!["~/.vimrc"]);
    }
}
