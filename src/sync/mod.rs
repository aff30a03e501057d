//! Workspace checkout: brings the project and every module up to date.
//!
//! The root repository is cloned into an empty workspace or moved to the
//! requested branch and pulled. The manifest is then resolved without
//! revisions to learn the modules, each module is cloned or updated the same
//! way, and the manifest is resolved again with revisions.

use std::path::Path;

use tracing::{debug, info};

use crate::error::{Error, VcsCommandError};
use crate::manifest::Resolver;
use crate::ports::{CheckoutMode, FileSystem, VersionControl};
use crate::state::{ModuleCache, Snapshot};

/// What to check out and where.
#[derive(Debug, Clone, Copy)]
pub struct SyncRequest<'a> {
    /// Workspace root; the project repository lives here.
    pub workspace: &'a Path,
    /// Manifest file name relative to the workspace.
    pub manifest_file: &'a str,
    /// Root repository URL, required when the workspace is empty.
    pub repository: Option<&'a str>,
    /// Root branch; `None` keeps whatever is checked out.
    pub branch: Option<&'a str>,
}

/// Checks out the workspace and returns its resolved snapshot.
///
/// # Errors
///
/// Returns [`Error::Config`] if the workspace is empty and no repository URL
/// was given, and propagates the first failing git command or manifest error.
#[tracing::instrument(skip_all, fields(workspace = %request.workspace.display()))]
pub fn sync_workspace(
    fs: &dyn FileSystem,
    vcs: &dyn VersionControl,
    cache: &ModuleCache,
    request: &SyncRequest<'_>,
) -> Result<Snapshot, Error> {
    let workspace = request.workspace;
    if is_empty_dir(fs, workspace) {
        let repository = request.repository.ok_or_else(|| {
            Error::Config(format!(
                "workspace {} is empty and no repository URL is configured",
                workspace.display()
            ))
        })?;
        info!(repository, branch = ?request.branch, "cloning project");
        vcs.clone_repository(workspace, repository, request.branch)?;
    } else {
        let branch = match request.branch {
            Some(branch) => {
                checkout_branch_if_changed(vcs, workspace, branch)?;
                branch.to_string()
            }
            None => vcs.current_branch(workspace)?,
        };
        info!(%branch, "updating project");
        vcs.pull(workspace, &branch)?;
    }

    let resolver = Resolver::new(vcs, cache);
    let layout = resolver.resolve_file(fs, workspace, request.manifest_file, false)?;

    for module in layout.modules() {
        let dir = module.working_dir(workspace);
        if is_empty_dir(fs, &dir) {
            info!(
                path = %module.path,
                origin = %module.origin,
                branch = %module.branch,
                "cloning module"
            );
            vcs.clone_repository(&dir, &module.origin, Some(&module.branch))?;
        } else {
            info!(path = %module.path, branch = %module.branch, "updating module");
            checkout_branch_if_changed(vcs, &dir, &module.branch)?;
            vcs.pull(&dir, &module.branch)?;
        }
    }

    resolver.resolve_file(fs, workspace, request.manifest_file, true)
}

/// Switches `path` to `branch` unless it is already checked out.
///
/// Prefers an existing local branch, then a branch tracking
/// `origin/<branch>`, and creates a new branch otherwise. Returns the mode
/// used, or `None` if nothing changed.
///
/// # Errors
///
/// Returns the first failing git command.
pub fn checkout_branch_if_changed(
    vcs: &dyn VersionControl,
    path: &Path,
    branch: &str,
) -> Result<Option<CheckoutMode>, VcsCommandError> {
    if vcs.current_branch(path)? == branch {
        debug!(path = %path.display(), branch, "already on branch");
        return Ok(None);
    }
    let mode = if vcs.has_local_branch(path, branch)? {
        CheckoutMode::Existing
    } else if vcs.has_remote_branch(path, branch)? {
        CheckoutMode::TrackRemote
    } else {
        CheckoutMode::Create
    };
    vcs.checkout(path, branch, mode)?;
    Ok(Some(mode))
}

fn is_empty_dir(fs: &dyn FileSystem, path: &Path) -> bool {
    !fs.exists(path) || fs.list_dir(path).map_or(true, |entries| entries.is_empty())
}
