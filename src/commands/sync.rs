//! `manifold sync` command.

use crate::config::Settings;
use crate::context::ServiceContext;
use crate::state::store::RunId;
use crate::state::{ModuleCache, Snapshot};
use crate::sync::{sync_workspace, SyncRequest};

/// Execute the `sync` command.
///
/// Flags take precedence over `MANIFOLD_REPOSITORY` and `MANIFOLD_BRANCH`.
///
/// # Errors
///
/// Returns an error string if a checkout step, resolution, or recording fails.
pub fn run(
    ctx: &ServiceContext,
    settings: &Settings,
    repository: Option<&str>,
    branch: Option<&str>,
) -> Result<(), String> {
    let (snapshot, run) = sync(ctx, settings, repository, branch)?;
    println!(
        "Synced {} module(s) on branch {}",
        snapshot.len(),
        snapshot.branch().unwrap_or("-")
    );
    for module in snapshot.modules() {
        println!("  {} {}", module.path, module.revision.as_deref().unwrap_or("-"));
    }
    println!("Recorded run {run}");
    Ok(())
}

/// Checks out the workspace and records the resulting snapshot.
///
/// # Errors
///
/// Returns an error string if a checkout step, resolution, or recording fails.
pub fn sync(
    ctx: &ServiceContext,
    settings: &Settings,
    repository: Option<&str>,
    branch: Option<&str>,
) -> Result<(Snapshot, RunId), String> {
    let cache = ModuleCache::new();
    let vcs = ctx.vcs(&settings.git);
    let request = SyncRequest {
        workspace: &settings.workspace,
        manifest_file: &settings.manifest_file,
        repository: repository.or(settings.repository.as_deref()),
        branch: branch.or(settings.branch.as_deref()),
    };
    let snapshot =
        sync_workspace(ctx.fs.as_ref(), &vcs, &cache, &request).map_err(|e| e.to_string())?;
    let run = super::record_run(ctx, settings, &snapshot)?;
    Ok((snapshot, run))
}
