//! `unlink`: put a linked entry's content back in place of its link.
use anyhow::Result;

use crate::cli::{EntryOpts, GlobalOpts};
use crate::config::Settings;
use crate::fs::FileSystem;
use crate::logging::{Logger, alert};
use crate::operation::Operation;
use crate::paths::PathPair;

/// Run the unlink command.
///
/// # Errors
///
/// Returns an error if settings cannot be resolved or any entry failed.
pub fn run(global: &GlobalOpts, opts: &EntryOpts, log: &Logger) -> Result<()> {
    super::run_with(global, opts, log, build)
}

/// Build the unlink tree for a `(home, store)` pair.
///
/// The link is deleted before the store copy is copied back; the store copy
/// is removed last unless `no_remove` is set. Restored directories lose the
/// ignore marker `link` wrote into them.
#[must_use]
pub fn build(pair: &PathPair, settings: &Settings, _fs: &dyn FileSystem) -> Operation {
    let (home, store) = (pair.source(), pair.destination());

    let restore = Operation::exists(
        store,
        vec![
            Operation::delete(home),
            Operation::copy(store, home),
            Operation::is_dir(
                store,
                vec![Operation::delete(home.join(&settings.ignore_marker))],
            ),
            Operation::condition(!settings.flags.no_remove, vec![Operation::delete(store)]),
        ],
    ) | Operation::error(format!("'{}' not already linked", alert(store)));

    Operation::exists(home, vec![restore])
        | Operation::error(format!("'{}' not exists", alert(home)))
}
