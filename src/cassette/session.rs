//! Recording session: one cassette recorder per port.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::Utc;

use super::format::Port;
use super::recorder::CassetteRecorder;

/// Recorder shared between a session and its recording adapter.
pub type SharedRecorder = Arc<Mutex<CassetteRecorder>>;

/// Owns the recorders of one `MANIFOLD_RECORD` run.
///
/// Cassettes land in `<root>/cassettes/<timestamp>/<port>.cassette.yaml`.
pub struct RecordingSession {
    /// Recorder for filesystem interactions.
    pub fs: SharedRecorder,
    /// Recorder for process interactions.
    pub runner: SharedRecorder,
    output_dir: PathBuf,
}

impl RecordingSession {
    /// Creates the session directory under `root`.
    ///
    /// Cassettes are stamped with the revision checked out in `workspace`.
    ///
    /// # Errors
    ///
    /// Returns an error if a session with the same timestamp exists or the
    /// directory cannot be created.
    pub fn new(root: &Path, workspace: &Path) -> Result<Self, String> {
        let timestamp = Utc::now().format("%Y-%m-%dT%H-%M-%S").to_string();
        let output_dir = root.join("cassettes").join(&timestamp);
        if output_dir.exists() {
            return Err(format!("Cassette directory already exists: {}", output_dir.display()));
        }
        std::fs::create_dir_all(&output_dir)
            .map_err(|e| format!("Failed to create cassette directory: {e}"))?;

        let commit = workspace_revision(workspace);
        let recorder = |port: Port| -> SharedRecorder {
            Arc::new(Mutex::new(CassetteRecorder::new(
                port,
                output_dir.join(port.cassette_file()),
                format!("{timestamp}-{port}"),
                commit.as_str(),
            )))
        };

        Ok(Self {
            fs: recorder(Port::Fs),
            runner: recorder(Port::Runner),
            output_dir,
        })
    }

    /// Directory the cassette files are written to.
    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Writes every cassette and returns the session directory.
    ///
    /// # Errors
    ///
    /// Returns an error if a cassette cannot be written or a recording
    /// adapter still holds its recorder.
    pub fn finish(self) -> Result<PathBuf, String> {
        for shared in [self.fs, self.runner] {
            let recorder = Arc::try_unwrap(shared)
                .map_err(|_| "A recording adapter is still alive".to_string())?
                .into_inner()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            let port = recorder.port();
            recorder.finish().map_err(|e| format!("Failed to write {port} cassette: {e}"))?;
        }
        Ok(self.output_dir)
    }
}

/// `git rev-parse HEAD` in `workspace`, or "unknown".
fn workspace_revision(workspace: &Path) -> String {
    let revision = std::process::Command::new("git")
        .args(["rev-parse", "HEAD"])
        .current_dir(workspace)
        .output()
        .ok()
        .filter(|o| o.status.success())
        .and_then(|o| String::from_utf8(o.stdout).ok())
        .map(|s| s.trim().to_string());

    revision.unwrap_or_else(|| {
        tracing::warn!(workspace = %workspace.display(), "could not read revision for cassette");
        "unknown".to_string()
    })
}
