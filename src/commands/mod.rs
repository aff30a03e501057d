//! Command dispatch and handlers.

pub mod changelog;
pub mod show;
pub mod snapshot;
pub mod sync;

use crate::cli::{Cli, Command};
use crate::config::Settings;
use crate::context::ServiceContext;
use crate::state::store::{RunId, SnapshotStore};
use crate::state::Snapshot;

/// Dispatch a parsed command line to its handler.
///
/// When `MANIFOLD_RECORD` is set to a directory path, all port interactions
/// are recorded to per-port cassette files under it.
///
/// # Errors
///
/// Returns an error string if configuration is invalid or the selected
/// command handler fails.
pub fn dispatch(cli: &Cli) -> Result<(), String> {
    let cwd = std::env::current_dir().map_err(|e| format!("Cannot read current directory: {e}"))?;
    let settings = Settings::from_env()
        .map_err(|e| e.to_string())?
        .with_overrides(&cli.global.overrides(), &cwd);

    let mut ctx = match &settings.record_dir {
        Some(dir) => ServiceContext::recording(dir, &settings.workspace)?,
        None => ServiceContext::live(),
    };

    let result = dispatch_with_context(&cli.command, &ctx, &settings);

    // Finish recording after the command completes, even on error.
    if let Some(dir) = ctx.finish_recording()? {
        eprintln!("Recording saved to: {}", dir.display());
    }

    result
}

/// Dispatch a command with the given service context.
///
/// # Errors
///
/// Returns an error string if the command handler fails.
pub fn dispatch_with_context(
    command: &Command,
    ctx: &ServiceContext,
    settings: &Settings,
) -> Result<(), String> {
    match command {
        Command::Snapshot { no_revisions, save } => {
            snapshot::run(ctx, settings, !*no_revisions, *save)
        }
        Command::Sync { repository, branch } => {
            sync::run(ctx, settings, repository.as_deref(), branch.as_deref())
        }
        Command::Changelog { first_parent } => changelog::run(ctx, settings, *first_parent),
        Command::Show { run } => show::run(ctx, settings, *run),
    }
}

/// Records `snapshot` as a new run with the project root tracked as a module,
/// so later diffs see root revision changes.
fn record_run(
    ctx: &ServiceContext,
    settings: &Settings,
    snapshot: &Snapshot,
) -> Result<RunId, String> {
    let mut tracked = snapshot.clone();
    tracked.track_project();
    SnapshotStore::new(ctx.fs.as_ref(), &settings.store_dir())
        .record(&tracked)
        .map_err(|e| e.to_string())
}
