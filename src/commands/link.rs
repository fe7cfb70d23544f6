//! `link`: move an entry into the store and link it back into place.
use anyhow::Result;

use crate::cli::{EntryOpts, GlobalOpts};
use crate::config::Settings;
use crate::fs::FileSystem;
use crate::logging::{Logger, alert};
use crate::operation::Operation;
use crate::paths::PathPair;

/// Run the link command.
///
/// # Errors
///
/// Returns an error if settings cannot be resolved or any entry failed.
pub fn run(global: &GlobalOpts, opts: &EntryOpts, log: &Logger) -> Result<()> {
    super::run_with(global, opts, log, build)
}

/// Build the link tree for a `(home, store)` pair.
///
/// The home entry is copied into the store, directories get the ignore
/// marker, the copy is given to the owner, and the home entry is replaced by
/// a link without asking. An entry that already resolves to its store copy
/// only goes through the (idempotent) symlink step.
#[must_use]
pub fn build(pair: &PathPair, settings: &Settings, fs: &dyn FileSystem) -> Operation {
    let (home, store) = (pair.source(), pair.destination());
    let already_linked = fs.exists(home) && fs.resolve(home) == fs.resolve(store);

    Operation::exists(
        home,
        vec![
            Operation::condition(
                !already_linked,
                vec![
                    Operation::copy(home, store),
                    Operation::is_dir(
                        home,
                        vec![Operation::write_file(
                            store.join(&settings.ignore_marker),
                            "",
                        )],
                    ),
                    Operation::change_owner(store, &settings.user),
                ],
            ),
            Operation::force_yes(vec![Operation::symlink(store, home)]),
        ],
    ) | Operation::error(format!("'{}' not exists", alert(home)))
}
