//! Runtime configuration.
//!
//! Sources, lowest precedence first: built-in defaults, a `.env` file,
//! process environment, command-line flags.

use std::path::{Path, PathBuf};

use crate::error::Error;

/// Name of the state directory created inside the workspace by default.
pub const DEFAULT_STORE_DIR: &str = ".manifold";
/// Manifest file name used when none is configured.
pub const DEFAULT_MANIFEST: &str = "repo.xml";

/// Resolved runtime settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Workspace root holding the project checkout.
    pub workspace: PathBuf,
    store: Option<PathBuf>,
    /// Manifest file name relative to the workspace.
    pub manifest_file: String,
    /// Git executable.
    pub git: String,
    /// Whether change logs follow merged branches.
    pub include_merge_commits: bool,
    /// Root repository URL for `sync`.
    pub repository: Option<String>,
    /// Root branch for `sync`.
    pub branch: Option<String>,
    /// Directory to record cassettes into.
    pub record_dir: Option<PathBuf>,
}

/// Values supplied on the command line.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    /// `--workspace`.
    pub workspace: Option<PathBuf>,
    /// `--store`.
    pub store: Option<PathBuf>,
    /// `--manifest`.
    pub manifest_file: Option<String>,
}

impl Settings {
    /// Loads `.env` (if present) and reads the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for unparsable values or an unreadable
    /// current directory.
    pub fn from_env() -> Result<Self, Error> {
        dotenvy::dotenv().ok();
        let cwd = std::env::current_dir()
            .map_err(|e| Error::Config(format!("cannot read current directory: {e}")))?;
        Self::from_lookup(|key| std::env::var(key).ok(), &cwd)
    }

    /// Builds settings from an arbitrary variable source. Relative paths
    /// are taken relative to `cwd`; blank values count as unset.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `MANIFOLD_MERGE_COMMITS` is not a boolean.
    pub fn from_lookup<F>(lookup: F, cwd: &Path) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let include_merge_commits = match get("MANIFOLD_MERGE_COMMITS") {
            Some(raw) => parse_bool(&raw).ok_or_else(|| {
                Error::Config(format!("MANIFOLD_MERGE_COMMITS must be true or false, got {raw:?}"))
            })?,
            None => true,
        };

        Ok(Self {
            workspace: get("MANIFOLD_WORKSPACE").map_or_else(|| cwd.to_path_buf(), |p| cwd.join(p)),
            store: get("MANIFOLD_STORE").map(|p| cwd.join(p)),
            manifest_file: get("MANIFOLD_MANIFEST").unwrap_or_else(|| DEFAULT_MANIFEST.to_string()),
            git: get("MANIFOLD_GIT").unwrap_or_else(|| "git".to_string()),
            include_merge_commits,
            repository: get("MANIFOLD_REPOSITORY"),
            branch: get("MANIFOLD_BRANCH"),
            record_dir: get("MANIFOLD_RECORD").map(|p| cwd.join(p)),
        })
    }

    /// Applies command-line values on top.
    #[must_use]
    pub fn with_overrides(mut self, overrides: &Overrides, cwd: &Path) -> Self {
        if let Some(workspace) = &overrides.workspace {
            self.workspace = cwd.join(workspace);
        }
        if let Some(store) = &overrides.store {
            self.store = Some(cwd.join(store));
        }
        if let Some(manifest) = &overrides.manifest_file {
            self.manifest_file.clone_from(manifest);
        }
        self
    }

    /// State store directory, `<workspace>/.manifold` unless configured.
    #[must_use]
    pub fn store_dir(&self) -> PathBuf {
        self.store.clone().unwrap_or_else(|| self.workspace.join(DEFAULT_STORE_DIR))
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
