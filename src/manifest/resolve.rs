//! Resolution of a manifest into a [`Snapshot`].

use std::path::Path;

use tracing::{debug, info};

use super::{origin, Manifest};
use crate::error::{Error, ManifestError};
use crate::ports::{FileSystem, VersionControl};
use crate::state::{ModuleCache, Snapshot, PROJECT_PATH};

/// Turns manifests into snapshots, interning every record in one cache.
pub struct Resolver<'a> {
    vcs: &'a dyn VersionControl,
    cache: &'a ModuleCache,
}

impl<'a> Resolver<'a> {
    /// Creates a resolver querying revisions through `vcs`.
    #[must_use]
    pub fn new(vcs: &'a dyn VersionControl, cache: &'a ModuleCache) -> Self {
        Self { vcs, cache }
    }

    /// Reads `<workspace>/<manifest_file>` and resolves it.
    ///
    /// # Errors
    ///
    /// Returns an error if the manifest cannot be read, parsed, or resolved.
    pub fn resolve_file(
        &self,
        fs: &dyn FileSystem,
        workspace: &Path,
        manifest_file: &str,
        include_revisions: bool,
    ) -> Result<Snapshot, Error> {
        let path = workspace.join(manifest_file);
        let text = fs.read_to_string(&path).map_err(|e| ManifestError::Read {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let manifest = Manifest::parse(&text)?;
        self.resolve(&manifest, workspace, include_revisions)
    }

    /// Resolves every origin, branch, and path of `manifest`.
    ///
    /// With `include_revisions`, each working copy that exists and is a
    /// repository is asked for its checked-out revision; other records keep
    /// an absent revision.
    ///
    /// # Errors
    ///
    /// Returns a [`ManifestError`] for invalid or unresolvable origins and
    /// duplicate module paths, and a [`crate::error::VcsCommandError`] if a
    /// revision query fails.
    #[tracing::instrument(skip_all, fields(workspace = %workspace.display(), include_revisions))]
    pub fn resolve(
        &self,
        manifest: &Manifest,
        workspace: &Path,
        include_revisions: bool,
    ) -> Result<Snapshot, Error> {
        let project_origin =
            origin::resolve(&manifest.project.origin, manifest.defaults.fetch.as_deref())?;
        let branch = manifest.project_branch();
        let revision = if include_revisions { self.revision_at(workspace)? } else { None };
        debug!(origin = %project_origin, branch, ?revision, "resolved project");

        let project = self.cache.record(PROJECT_PATH, project_origin.as_str(), branch, revision);
        let mut snapshot = Snapshot::new(branch, project);

        for module in &manifest.modules {
            if manifest.is_excluded(&module.name) {
                debug!(name = %module.name, "skipping excluded module");
                continue;
            }

            let path = module.path();
            if snapshot.get(&path).is_some() {
                return Err(ManifestError::DuplicatePath { path }.into());
            }

            let module_origin = origin::resolve(&module.origin, Some(&project_origin))?;
            let module_branch = manifest.module_branch(module);
            let revision = if include_revisions {
                let relative = path.trim_start_matches("./");
                self.revision_at(&workspace.join(relative))?
            } else {
                None
            };
            debug!(
                %path,
                origin = %module_origin,
                branch = module_branch,
                ?revision,
                "resolved module"
            );

            snapshot.insert(self.cache.record(path, module_origin, module_branch, revision));
        }

        info!(modules = snapshot.len(), branch, "resolved manifest");
        Ok(snapshot)
    }

    fn revision_at(&self, dir: &Path) -> Result<Option<String>, Error> {
        if self.vcs.exists(dir) && self.vcs.is_repository(dir) {
            Ok(Some(self.vcs.current_revision(dir)?))
        } else {
            Ok(None)
        }
    }
}
