//! Point-in-time module state: records, snapshots, diffing, and history.
//!
//! A [`ModuleRecord`] is an interned, immutable `(path, origin, branch,
//! revision)` value. Records are only created through a [`ModuleCache`], so
//! two structurally equal records handed out by the same cache share one
//! allocation. A [`Snapshot`] is the resolved state of a whole workspace.

pub mod cache;
pub mod diff;
pub mod history;
pub mod store;

use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

pub use cache::ModuleCache;

/// Workspace-relative path reserved for the project root.
pub const PROJECT_PATH: &str = "./";

/// Plain value describing one module at one point in time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModuleState {
    /// Workspace-relative path of the working copy.
    pub path: String,
    /// Absolute, normalized origin URL.
    pub origin: String,
    /// Effective branch.
    pub branch: String,
    /// Checked-out revision hash; `None` when not determined.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision: Option<String>,
}

impl ModuleState {
    /// Directory of this module's working copy inside `workspace`.
    #[must_use]
    pub fn working_dir(&self, workspace: &Path) -> PathBuf {
        let relative = self.path.trim_start_matches("./");
        if relative.is_empty() {
            workspace.to_path_buf()
        } else {
            workspace.join(relative)
        }
    }
}

/// Shared handle to an interned [`ModuleState`].
///
/// Equality is value equality with a pointer fast path; use
/// [`ModuleRecord::same_instance`] to test identity.
#[derive(Debug, Clone)]
pub struct ModuleRecord(Arc<ModuleState>);

impl ModuleRecord {
    pub(crate) fn from_shared(state: Arc<ModuleState>) -> Self {
        Self(state)
    }

    /// Returns `true` if both handles point at the same cached instance.
    #[must_use]
    pub fn same_instance(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// The plain value behind this record.
    #[must_use]
    pub fn state(&self) -> &ModuleState {
        &self.0
    }
}

impl Deref for ModuleRecord {
    type Target = ModuleState;

    fn deref(&self) -> &ModuleState {
        &self.0
    }
}

impl PartialEq for ModuleRecord {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || *self.0 == *other.0
    }
}

impl Eq for ModuleRecord {}

impl Hash for ModuleRecord {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl Serialize for ModuleRecord {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

/// Serialized form of a [`Snapshot`]: plain values, not yet interned.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotDocument {
    /// Branch of the project root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    /// Project root state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<ModuleState>,
    /// Module states in manifest order.
    #[serde(default)]
    pub modules: Vec<ModuleState>,
}

/// Resolved state of the project root and every module, in manifest order.
///
/// Module paths are unique. Two snapshots are equal when their branches and
/// module lists are equal; the project record does not take part.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    branch: Option<String>,
    project: Option<ModuleRecord>,
    modules: Vec<ModuleRecord>,
}

impl Snapshot {
    /// Creates a snapshot for `project` on `branch` with no modules yet.
    pub fn new(branch: impl Into<String>, project: ModuleRecord) -> Self {
        Self {
            branch: Some(branch.into()),
            project: Some(project),
            modules: Vec::new(),
        }
    }

    /// The "no revision information" baseline.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Returns `true` for the baseline produced by [`Snapshot::none`].
    #[must_use]
    pub fn is_none(&self) -> bool {
        self.project.is_none() && self.modules.is_empty()
    }

    /// Branch of the project root.
    #[must_use]
    pub fn branch(&self) -> Option<&str> {
        self.branch.as_deref()
    }

    /// Project root record.
    #[must_use]
    pub fn project(&self) -> Option<&ModuleRecord> {
        self.project.as_ref()
    }

    /// Module records in manifest order.
    #[must_use]
    pub fn modules(&self) -> &[ModuleRecord] {
        &self.modules
    }

    /// Number of modules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Returns `true` if the snapshot has no modules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Looks up the module at `path`.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&ModuleRecord> {
        self.modules.iter().find(|m| m.path == path)
    }

    /// Revision of the module at `path`, if both exist.
    #[must_use]
    pub fn revision(&self, path: &str) -> Option<&str> {
        self.get(path).and_then(|m| m.revision.as_deref())
    }

    /// Inserts a module, replacing any module already at its path in place.
    ///
    /// Returns the replaced record.
    pub fn insert(&mut self, record: ModuleRecord) -> Option<ModuleRecord> {
        match self.modules.iter_mut().find(|m| m.path == record.path) {
            Some(slot) => Some(std::mem::replace(slot, record)),
            None => {
                self.modules.push(record);
                None
            }
        }
    }

    /// Makes the project root take part in module diffing by placing it at
    /// the front of the module list under [`PROJECT_PATH`].
    pub fn track_project(&mut self) {
        let Some(project) = self.project.clone() else {
            return;
        };
        self.modules.retain(|m| m.path != project.path);
        self.modules.insert(0, project);
    }

    /// Converts to the plain serialized form.
    #[must_use]
    pub fn to_document(&self) -> SnapshotDocument {
        SnapshotDocument {
            branch: self.branch.clone(),
            project: self.project.as_ref().map(|p| p.state().clone()),
            modules: self.modules.iter().map(|m| m.state().clone()).collect(),
        }
    }

    /// Rebuilds a snapshot from its document, interning every state.
    #[must_use]
    pub fn from_document(document: SnapshotDocument, cache: &ModuleCache) -> Self {
        let mut snapshot = Self {
            branch: document.branch,
            project: document.project.map(|p| cache.intern(p)),
            modules: Vec::with_capacity(document.modules.len()),
        };
        for state in document.modules {
            snapshot.insert(cache.intern(state));
        }
        snapshot
    }
}

impl PartialEq for Snapshot {
    fn eq(&self, other: &Self) -> bool {
        self.branch == other.branch && self.modules == other.modules
    }
}

impl Eq for Snapshot {}
