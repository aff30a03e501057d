//! Version-control facade consumed by the resolver, sync, and extraction.

use std::path::Path;

use crate::error::VcsCommandError;

/// How `checkout` should obtain the target branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutMode {
    /// Switch to a branch that already exists locally.
    Existing,
    /// Create a local branch tracking `origin/<branch>`.
    TrackRemote,
    /// Create a new local branch at the current commit.
    Create,
}

/// Executes version-control queries and mutations against working directories.
///
/// Every mutating call fails with a [`VcsCommandError`] on a non-zero exit
/// status; the error carries the invoked command line.
pub trait VersionControl {
    /// Returns `true` if `path` exists.
    fn exists(&self, path: &Path) -> bool;

    /// Returns `true` if `path` is the root of a working copy.
    fn is_repository(&self, path: &Path) -> bool;

    /// Returns the full revision hash checked out at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query command fails.
    fn current_revision(&self, path: &Path) -> Result<String, VcsCommandError>;

    /// Clones `origin` into `destination`, optionally on `branch`.
    ///
    /// # Errors
    ///
    /// Returns an error if the clone command fails.
    fn clone_repository(
        &self,
        destination: &Path,
        origin: &str,
        branch: Option<&str>,
    ) -> Result<(), VcsCommandError>;

    /// Pulls `branch` from `origin` into the working copy at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the pull command fails.
    fn pull(&self, path: &Path, branch: &str) -> Result<(), VcsCommandError>;

    /// Returns the short name of the branch checked out at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query command fails.
    fn current_branch(&self, path: &Path) -> Result<String, VcsCommandError>;

    /// Returns `true` if a local branch called `name` exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the query command fails for a reason other than
    /// the branch being absent.
    fn has_local_branch(&self, path: &Path, name: &str) -> Result<bool, VcsCommandError>;

    /// Fetches `origin` and returns `true` if `origin/<name>` exists.
    ///
    /// # Errors
    ///
    /// Returns an error if fetching or querying fails.
    fn has_remote_branch(&self, path: &Path, name: &str) -> Result<bool, VcsCommandError>;

    /// Checks out `branch` at `path` using the given mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the checkout command fails.
    fn checkout(&self, path: &Path, branch: &str, mode: CheckoutMode)
        -> Result<(), VcsCommandError>;

    /// Returns the raw history of `range` rendered with `format`, including
    /// raw file-status lines for every commit.
    ///
    /// # Errors
    ///
    /// Returns an error if the history command fails.
    fn history_raw(
        &self,
        path: &Path,
        range: &str,
        first_parent_only: bool,
        format: &str,
    ) -> Result<String, VcsCommandError>;
}
