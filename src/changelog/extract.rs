//! Turns changed modules into commit entries by querying their histories.

use std::path::Path;

use tracing::{debug, info};

use super::parse::{parse_history, HISTORY_FORMAT};
use super::CommitEntry;
use crate::error::VcsCommandError;
use crate::ports::VersionControl;
use crate::state::{ModuleRecord, Snapshot};

/// Mines version-control history for the modules reported by a diff.
pub struct Extractor<'a> {
    vcs: &'a dyn VersionControl,
    workspace: &'a Path,
    include_merge_commits: bool,
}

impl<'a> Extractor<'a> {
    /// Creates an extractor for working copies under `workspace`.
    ///
    /// Merge commits are included by default.
    #[must_use]
    pub fn new(vcs: &'a dyn VersionControl, workspace: &'a Path) -> Self {
        Self {
            vcs,
            workspace,
            include_merge_commits: true,
        }
    }

    /// When `false`, history is restricted to first parents.
    #[must_use]
    pub fn include_merge_commits(mut self, include: bool) -> Self {
        self.include_merge_commits = include;
        self
    }

    /// Appends entries for every change to `entries`, in `changes` order.
    ///
    /// A change without a baseline revision becomes an "added" entry; one
    /// whose path has no revision in `current` becomes a "removed" entry.
    /// Everything else is a history query over `old..new`.
    ///
    /// # Errors
    ///
    /// Stops at the first failing history query. Entries appended for
    /// earlier modules stay in `entries`.
    #[tracing::instrument(skip_all, fields(changes = changes.len()))]
    pub fn extract_into(
        &self,
        changes: &[ModuleRecord],
        current: &Snapshot,
        entries: &mut Vec<CommitEntry>,
    ) -> Result<(), VcsCommandError> {
        for change in changes {
            let Some(old) = change.revision.as_deref() else {
                debug!(path = %change.path, "module added to manifest");
                entries.push(CommitEntry::added(change.path.clone()));
                continue;
            };
            let Some(new) = current.revision(&change.path) else {
                debug!(path = %change.path, "module removed from manifest");
                entries.push(CommitEntry::removed(change.path.clone()));
                continue;
            };

            let range = format!("{old}..{new}");
            let output = self.vcs.history_raw(
                &change.working_dir(self.workspace),
                &range,
                !self.include_merge_commits,
                HISTORY_FORMAT,
            )?;
            let commits = parse_history(&change.path, &output);
            info!(path = %change.path, %range, commits = commits.len(), "extracted history");
            entries.extend(commits);
        }
        Ok(())
    }

    /// Collects entries for every change.
    ///
    /// # Errors
    ///
    /// Returns the first failing history query; use
    /// [`Extractor::extract_into`] to keep partial results.
    pub fn extract(
        &self,
        changes: &[ModuleRecord],
        current: &Snapshot,
    ) -> Result<Vec<CommitEntry>, VcsCommandError> {
        let mut entries = Vec::new();
        self.extract_into(changes, current, &mut entries)?;
        Ok(entries)
    }
}
