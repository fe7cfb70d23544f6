//! `install`: materialise store entries into home as plain copies.
//!
//! Unlike `link`, installed entries are independent of the store: text
//! files are expanded as templates once they are in place, so one store can
//! serve several machines or users.
use anyhow::Result;

use crate::cli::{EntryOpts, GlobalOpts};
use crate::config::Settings;
use crate::fs::FileSystem;
use crate::logging::{Logger, alert, highlight};
use crate::operation::Operation;
use crate::paths::PathPair;

/// Run the install command.
///
/// # Errors
///
/// Returns an error if settings cannot be resolved or any entry failed.
pub fn run(global: &GlobalOpts, opts: &EntryOpts, log: &Logger) -> Result<()> {
    super::run_with(global, opts, log, build)
}

/// Build the install tree for a `(home, store)` pair.
///
/// An existing home entry is only replaced after confirmation. A home entry
/// that is already a link into the store is left alone. Installed
/// directories lose the ignore marker `link` wrote into the store copy.
#[must_use]
pub fn build(pair: &PathPair, settings: &Settings, fs: &dyn FileSystem) -> Operation {
    let pair = pair.clone().swapped();
    let (store, home) = (pair.source(), pair.destination());

    if fs.exists(home) && fs.resolve(home) == fs.resolve(store) {
        return Operation::show(format!("'{}' already linked, ignore...", highlight(home)));
    }

    let materialise = vec![
        Operation::copy(store, home),
        Operation::is_dir(
            store,
            vec![Operation::delete(home.join(&settings.ignore_marker))],
        ),
        Operation::write_template(home),
        Operation::change_owner(home, &settings.user),
    ];
    let body = if fs.exists(home) || fs.is_symlink(home) {
        let mut steps = vec![Operation::delete(home)];
        steps.extend(materialise);
        Operation::ask(
            format!("'{}' already exists, replace it ?", highlight(home)),
            steps,
        )
    } else {
        Operation::all(materialise)
    };

    Operation::exists(store, vec![body])
        | Operation::error(format!("'{}' not exists", alert(store)))
}
