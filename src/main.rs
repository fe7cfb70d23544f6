//! Command-line entry point for the dotfiles manager.

use anyhow::Result;
use clap::Parser;

use dotfiles_manager::cli::{Cli, Command};
use dotfiles_manager::commands;
use dotfiles_manager::logging::{self, Logger, Verbosity};

fn main() -> Result<()> {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = Cli::parse();

    let verbosity = Verbosity::from_switches(args.quiet, args.verbose);
    logging::init_subscriber(verbosity, args.command.name());
    let log = Logger::new(args.command.name());

    match &args.command {
        Command::Link(opts) => commands::link::run(&args.global, opts, &log),
        Command::Unlink(opts) => commands::unlink::run(&args.global, opts, &log),
        Command::Install(opts) => commands::install::run(&args.global, opts, &log),
        Command::Version => {
            let version = option_env!("DOTFILES_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"));
            log.show(&format!("dotfiles {version}"));
            Ok(())
        }
    }
}
