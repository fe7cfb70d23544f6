//! Logging infrastructure for structured console and file output.

mod buffered;
mod logger;
mod subscriber;
mod types;
mod utils;

pub use buffered::{BufferedLog, Line, LineKind};
pub use logger::Logger;
pub use subscriber::{Verbosity, init_subscriber};
pub use types::{EntryRecord, EntryStatus, Log, Severity};
pub use utils::{alert, highlight, strip_ansi};

/// Tracing target for stage headers.
pub(crate) const STAGE_TARGET: &str = "dotfiles::stage";
/// Tracing target for dry-run lines.
pub(crate) const DRY_RUN_TARGET: &str = "dotfiles::dry_run";
/// Tracing target for messages printed at every verbosity.
pub(crate) const SHOW_TARGET: &str = "dotfiles::show";

/// Create a Logger backed by an isolated per-thread tracing subscriber
/// with a [`FileLayer`](subscriber::FileLayer) writing into a temp dir.
///
/// Returns a [`tracing::dispatcher::DefaultGuard`] that must be kept alive
/// for the duration of the test; dropping it restores the previous
/// thread-local dispatcher.
#[cfg(test)]
#[allow(clippy::expect_used)]
pub(crate) fn isolated_logger() -> (Logger, tempfile::TempDir, tracing::dispatcher::DefaultGuard) {
    use tracing_subscriber::{Layer as _, filter::LevelFilter, layer::SubscriberExt as _};
    let tmp = tempfile::tempdir().expect("failed to create temp dir");
    let path = tmp.path().join("test.log");
    let file_layer = subscriber::FileLayer::at(&path).expect("failed to create file layer");
    let log = Logger::with_log_file(Some(path));
    let subscriber =
        tracing_subscriber::registry().with(file_layer.with_filter(LevelFilter::DEBUG));
    let guard = tracing::dispatcher::set_default(&tracing::Dispatch::new(subscriber));
    (log, tmp, guard)
}
