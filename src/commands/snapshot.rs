//! `manifold snapshot` command.

use crate::config::Settings;
use crate::context::ServiceContext;
use crate::manifest::Resolver;
use crate::state::store::RunId;
use crate::state::{ModuleCache, Snapshot};

/// Execute the `snapshot` command.
///
/// # Errors
///
/// Returns an error string if resolution or recording fails.
pub fn run(
    ctx: &ServiceContext,
    settings: &Settings,
    include_revisions: bool,
    save: bool,
) -> Result<(), String> {
    let (snapshot, run) = resolve(ctx, settings, include_revisions, save)?;
    let yaml = serde_yaml::to_string(&snapshot.to_document())
        .map_err(|e| format!("Failed to render snapshot: {e}"))?;
    print!("{yaml}");
    if let Some(run) = run {
        println!("Recorded run {run}");
    }
    Ok(())
}

/// Resolves the workspace manifest and optionally records the result.
///
/// # Errors
///
/// Returns an error string if resolution or recording fails.
pub fn resolve(
    ctx: &ServiceContext,
    settings: &Settings,
    include_revisions: bool,
    save: bool,
) -> Result<(Snapshot, Option<RunId>), String> {
    let cache = ModuleCache::new();
    let vcs = ctx.vcs(&settings.git);
    let snapshot = Resolver::new(&vcs, &cache)
        .resolve_file(
            ctx.fs.as_ref(),
            &settings.workspace,
            &settings.manifest_file,
            include_revisions,
        )
        .map_err(|e| e.to_string())?;

    let run = if save { Some(super::record_run(ctx, settings, &snapshot)?) } else { None };
    Ok((snapshot, run))
}
