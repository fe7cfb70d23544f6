// Shared helpers for integration tests.
//
// Provides a temporary home directory with a store inside it and runs the
// command tree builders through the same per-entry driver the binary uses,
// with a recording filesystem, an in-memory log and scripted answers.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use dotfiles_manager::commands::{CommandSetup, TreeBuilder, process_entry};
use dotfiles_manager::config::Settings;
use dotfiles_manager::flags::Flags;
use dotfiles_manager::fs::RecordingFileSystem;
use dotfiles_manager::logging::{BufferedLog, EntryStatus};
use dotfiles_manager::operation::Context;
use dotfiles_manager::paths::DEFAULT_IGNORE_MARKER;
use dotfiles_manager::prompt::Prompt;

/// Answers questions from a fixed script; end of script is end of input.
#[derive(Debug, Default)]
pub struct ScriptedPrompt {
    answers: Mutex<VecDeque<String>>,
    asked: Mutex<Vec<String>>,
}

impl ScriptedPrompt {
    pub fn new(answers: &[&str]) -> Self {
        Self {
            answers: Mutex::new(answers.iter().map(|a| (*a).to_string()).collect()),
            asked: Mutex::new(Vec::new()),
        }
    }

    /// Questions asked so far.
    pub fn asked(&self) -> Vec<String> {
        self.asked.lock().expect("asked lock").clone()
    }
}

impl Prompt for ScriptedPrompt {
    fn ask(&self, question: &str) -> io::Result<Option<String>> {
        self.asked
            .lock()
            .expect("asked lock")
            .push(question.to_string());
        Ok(self.answers.lock().expect("answers lock").pop_front())
    }
}

/// An isolated home directory (with the store at `<home>/dotfiles`) backed
/// by a [`tempfile::TempDir`].
pub struct Fixture {
    pub root: tempfile::TempDir,
    pub flags: Flags,
    pub fs: RecordingFileSystem,
    pub log: BufferedLog,
    pub prompt: ScriptedPrompt,
}

impl Fixture {
    pub fn new() -> Self {
        let root = tempfile::tempdir().expect("create temp dir");
        std::fs::create_dir_all(root.path().join("dotfiles")).expect("create store");
        Self {
            root,
            flags: Flags::default(),
            fs: RecordingFileSystem::new(),
            log: BufferedLog::new(),
            prompt: ScriptedPrompt::default(),
        }
    }

    #[must_use]
    pub fn with_flags(mut self, flags: Flags) -> Self {
        self.flags = flags;
        self
    }

    #[must_use]
    pub fn with_fs(mut self, fs: RecordingFileSystem) -> Self {
        self.fs = fs;
        self
    }

    #[must_use]
    pub fn with_answers(mut self, answers: &[&str]) -> Self {
        self.prompt = ScriptedPrompt::new(answers);
        self
    }

    pub fn home(&self) -> &Path {
        self.root.path()
    }

    pub fn store(&self) -> PathBuf {
        self.home().join("dotfiles")
    }

    /// Write `content` to `home/<rel>`, creating parents.
    pub fn home_file(&self, rel: &str, content: &str) -> PathBuf {
        write(&self.home().join(rel), content)
    }

    /// Write `content` to `store/<rel>`, creating parents.
    pub fn store_file(&self, rel: &str, content: &str) -> PathBuf {
        write(&self.store().join(rel), content)
    }

    pub fn settings(&self) -> Settings {
        Settings {
            store: self.store(),
            home: self.home().to_path_buf(),
            user: "alice".to_string(),
            ignore_marker: DEFAULT_IGNORE_MARKER.to_string(),
            entries: Vec::new(),
            flags: self.flags.clone(),
        }
    }

    /// Derive, build and process one identifier like the binary does.
    pub fn process(&self, raw: &str, build: TreeBuilder) -> EntryStatus {
        let setup = CommandSetup::from_settings(self.settings(), &self.log);
        let deriver = setup.deriver.clone().with_cwd(self.home());
        let tree = deriver
            .derive(&self.fs, raw)
            .map(|pair| build(&pair, &setup.settings, &self.fs));
        let ctx = Context::new(&self.fs, &setup.settings.flags, &self.log, &self.prompt);
        process_entry(raw, tree, &ctx)
    }

    /// Returns `true` if `path` is a link pointing at `target`.
    pub fn links_to(path: &Path, target: &Path) -> bool {
        std::fs::read_link(path).is_ok_and(|t| t == target)
    }
}

fn write(path: &Path, content: &str) -> PathBuf {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create parent dir");
    }
    std::fs::write(path, content).expect("write file");
    path.to_path_buf()
}
