//! Command-line interface.
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Top-level CLI entry point.
#[derive(Parser, Debug)]
#[command(
    name = "dotfiles",
    about = "Move dotfiles into a store and link them back into place",
    version
)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Options shared by every subcommand.
    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Options shared across all subcommands.
#[derive(Parser, Debug, Clone, Default)]
pub struct GlobalOpts {
    /// Dotfiles store directory (defaults to $DOTFILES_ROOT, then ~/dotfiles)
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// Home directory entries are linked into (defaults to $HOME)
    #[arg(long, global = true)]
    pub home: Option<PathBuf>,

    /// Configuration file (defaults to $XDG_CONFIG_HOME/dotfiles/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Owner given to files copied into place
    #[arg(long, global = true)]
    pub user: Option<String>,

    /// Preview changes without applying
    #[arg(short = 'd', long, global = true)]
    pub dry_run: bool,

    /// Answer "yes" to every question
    #[arg(short = 'y', long, global = true, conflicts_with = "no")]
    pub yes: bool,

    /// Answer "no" to every question
    #[arg(short = 'n', long, global = true)]
    pub no: bool,

    /// Skip read/write permission checks
    #[arg(short = 'f', long, global = true)]
    pub force: bool,

    /// Keep the store copy when unlinking
    #[arg(long, global = true)]
    pub no_remove: bool,

    /// Template variable, repeatable
    #[arg(long = "var", value_name = "KEY=VALUE", global = true)]
    pub vars: Vec<String>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Move entries into the store and link them back
    Link(EntryOpts),
    /// Restore linked entries from the store
    Unlink(EntryOpts),
    /// Copy entries out of the store, expanding templates
    Install(EntryOpts),
    /// Print version information
    Version,
}

impl Command {
    /// Name used for the log file.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Link(_) => "link",
            Self::Unlink(_) => "unlink",
            Self::Install(_) => "install",
            Self::Version => "version",
        }
    }
}

/// Entries to process.
#[derive(Parser, Debug, Clone, Default)]
pub struct EntryOpts {
    /// Paths under $HOME or the store; defaults to `entries` from the config file
    #[arg(value_name = "PATH")]
    pub paths: Vec<String>,
}
