//! `manifold show` command.

use crate::changelog::{codec, format_entries};
use crate::config::Settings;
use crate::context::ServiceContext;
use crate::state::store::{RunId, SnapshotStore};

/// Execute the `show` command.
///
/// # Errors
///
/// Returns an error string if the store cannot be read or the requested run
/// does not exist.
pub fn run(ctx: &ServiceContext, settings: &Settings, run: Option<u64>) -> Result<(), String> {
    print!("{}", render(ctx, settings, run.map(RunId))?);
    Ok(())
}

/// Renders the change log of `run`, or of the latest run.
///
/// # Errors
///
/// Returns an error string if the store cannot be read or the requested run
/// does not exist.
pub fn render(
    ctx: &ServiceContext,
    settings: &Settings,
    run: Option<RunId>,
) -> Result<String, String> {
    let store = SnapshotStore::new(ctx.fs.as_ref(), &settings.store_dir());
    let runs = store.runs().map_err(|e| e.to_string())?;

    let run = match run {
        Some(run) if runs.contains(&run) => run,
        Some(run) => return Err(format!("Run {run} not found")),
        None => match runs.last() {
            Some(run) => *run,
            None => return Ok("No runs recorded.\n".to_string()),
        },
    };

    let path = store.changelog_path(run);
    let body = if ctx.fs.exists(&path) {
        let entries = codec::load(ctx.fs.as_ref(), &path).map_err(|e| e.to_string())?;
        format_entries(&entries)
    } else {
        format_entries(&[])
    };
    Ok(format!("Run {run}\n{body}\n"))
}
