//! Snapshot store: persistence of resolved snapshots and their change logs.
//!
//! The store uses the `FileSystem` port for all I/O. Directory layout:
//!
//! ```text
//! <root>/
//!   ├── snapshots/<run>.yaml
//!   └── changelogs/<run>.yaml
//! ```
//!
//! Run ids are sequential and zero-padded so that names sort by age.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::debug;

use super::history::last_matching;
use super::{ModuleCache, Snapshot, SnapshotDocument};
use crate::error::StoreError;
use crate::ports::FileSystem;

/// Sequential identifier of one recorded run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RunId(pub u64);

impl RunId {
    /// The run after this one.
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:06}", self.0)
    }
}

impl FromStr for RunId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

/// Lazily loaded snapshots, newest first.
pub type History<'s> = Box<dyn Iterator<Item = Result<(RunId, Snapshot), StoreError>> + 's>;

/// Persistence layer for snapshots and change logs.
pub struct SnapshotStore<'a> {
    fs: &'a dyn FileSystem,
    root: PathBuf,
}

impl<'a> SnapshotStore<'a> {
    /// Creates a store rooted at `root`.
    #[must_use]
    pub fn new(fs: &'a dyn FileSystem, root: &Path) -> Self {
        Self {
            fs,
            root: root.to_path_buf(),
        }
    }

    /// Path of the snapshot document for `run`.
    #[must_use]
    pub fn snapshot_path(&self, run: RunId) -> PathBuf {
        self.root.join("snapshots").join(format!("{run}.yaml"))
    }

    /// Path of the change log written for `run`.
    #[must_use]
    pub fn changelog_path(&self, run: RunId) -> PathBuf {
        self.root.join("changelogs").join(format!("{run}.yaml"))
    }

    /// Recorded runs, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot directory cannot be listed.
    pub fn runs(&self) -> Result<Vec<RunId>, StoreError> {
        let dir = self.root.join("snapshots");
        if !self.fs.exists(&dir) {
            return Ok(Vec::new());
        }
        let entries = self.fs.list_dir(&dir).map_err(|e| StoreError::Io {
            path: dir.display().to_string(),
            message: e.to_string(),
        })?;
        let mut runs: Vec<RunId> = entries
            .iter()
            .filter_map(|name| name.strip_suffix(".yaml"))
            .filter_map(|stem| stem.parse().ok())
            .collect();
        runs.sort_unstable();
        Ok(runs)
    }

    /// The most recently recorded run.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot directory cannot be listed.
    pub fn latest_run(&self) -> Result<Option<RunId>, StoreError> {
        Ok(self.runs()?.last().copied())
    }

    /// Id the next call to [`SnapshotStore::record`] will assign.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot directory cannot be listed.
    pub fn next_run(&self) -> Result<RunId, StoreError> {
        Ok(self.latest_run()?.map_or(RunId(1), RunId::next))
    }

    /// Persists `snapshot` as a new run and returns its id.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be encoded or written.
    pub fn record(&self, snapshot: &Snapshot) -> Result<RunId, StoreError> {
        let run = self.next_run()?;
        let yaml = serde_yaml::to_string(&snapshot.to_document())?;
        let path = self.snapshot_path(run);
        self.fs.write(&path, &yaml).map_err(|e| StoreError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        debug!(%run, path = %path.display(), "recorded snapshot");
        Ok(run)
    }

    /// Loads the snapshot of `run`, interning its records through `cache`.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be read or decoded.
    pub fn load(&self, run: RunId, cache: &ModuleCache) -> Result<Snapshot, StoreError> {
        let path = self.snapshot_path(run);
        let text = self.fs.read_to_string(&path).map_err(|e| StoreError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let document: SnapshotDocument =
            serde_yaml::from_str(&text).map_err(|source| StoreError::Malformed {
                path: path.display().to_string(),
                source,
            })?;
        Ok(Snapshot::from_document(document, cache))
    }

    /// Recorded snapshots, newest first.
    ///
    /// Each snapshot is read only when the iterator reaches it, so a search
    /// that stops early never decodes older runs.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot directory cannot be listed. Each item
    /// carries its own read or decode error.
    pub fn history<'s>(&'s self, cache: &'s ModuleCache) -> Result<History<'s>, StoreError> {
        let runs = self.runs()?;
        Ok(Box::new(runs.into_iter().rev().map(move |run| {
            self.load(run, cache).map(|snapshot| (run, snapshot))
        })))
    }

    /// The newest recorded snapshot on `branch`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be listed or if a run newer than
    /// the match cannot be read or decoded.
    pub fn last_on_branch(
        &self,
        branch: Option<&str>,
        cache: &ModuleCache,
    ) -> Result<Option<(RunId, Snapshot)>, StoreError> {
        last_matching(self.history(cache)?, branch)
    }
}
