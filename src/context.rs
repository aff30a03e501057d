//! Service context bundling all port trait objects.

use std::path::{Path, PathBuf};

use crate::adapters::git::GitCli;
use crate::adapters::live::filesystem::LiveFileSystem;
use crate::adapters::live::runner::LiveCommandRunner;
use crate::adapters::recording::{RecordingCommandRunner, RecordingFileSystem};
use crate::adapters::replaying::{ReplayingCommandRunner, ReplayingFileSystem};
use crate::cassette::config::CassetteConfig;
use crate::cassette::format::Port;
use crate::cassette::session::RecordingSession;
use crate::ports::{CommandOutput, CommandRunner, FileSystem, PortError};

/// Bundles all port trait objects into a single context.
///
/// Each field provides access to one external boundary. Constructors
/// wire up different adapter implementations (live, replaying, recording).
pub struct ServiceContext {
    /// Filesystem for file I/O.
    pub fs: Box<dyn FileSystem>,
    /// Process runner used by the git facade.
    pub runner: Box<dyn CommandRunner>,
    /// Optional recording session; cassettes are written on drop.
    session: Option<RecordingSession>,
}

impl ServiceContext {
    /// Creates a live context backed by the real disk and real processes.
    #[must_use]
    pub fn live() -> Self {
        Self {
            fs: Box::new(LiveFileSystem),
            runner: Box::new(LiveCommandRunner),
            session: None,
        }
    }

    /// Creates a recording context that writes per-port cassettes on drop.
    ///
    /// Uses live adapters for actual work. Cassettes land in
    /// `<root>/cassettes/<timestamp>/`. This is the developer-only mechanism
    /// for capturing cassettes via the `MANIFOLD_RECORD` env var.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette directory cannot be created.
    pub fn recording(root: &Path, workspace: &Path) -> Result<Self, String> {
        let session = RecordingSession::new(root, workspace)?;
        tracing::info!(dir = %session.output_dir().display(), "recording cassettes");
        Ok(Self {
            fs: Box::new(RecordingFileSystem::new(
                Box::new(LiveFileSystem),
                std::sync::Arc::clone(&session.fs),
            )),
            runner: Box::new(RecordingCommandRunner::new(
                Box::new(LiveCommandRunner),
                std::sync::Arc::clone(&session.runner),
            )),
            session: Some(session),
        })
    }

    /// Creates a replaying context from per-port cassette files.
    ///
    /// Ports without a configured cassette file use a panicking adapter that
    /// fails with a clear message when called.
    ///
    /// # Errors
    ///
    /// Returns an error if any configured cassette file cannot be read or parsed.
    pub fn replaying_from(config: &CassetteConfig) -> Result<Self, String> {
        let replayers = config.load_all()?;

        Ok(Self {
            fs: match replayers.fs {
                Some(r) => Box::new(ReplayingFileSystem::new(r)),
                None => Box::new(Unconfigured(Port::Fs)),
            },
            runner: match replayers.runner {
                Some(r) => Box::new(ReplayingCommandRunner::new(r)),
                None => Box::new(Unconfigured(Port::Runner)),
            },
            session: None,
        })
    }

    /// Git facade wired to this context's runner and filesystem.
    #[must_use]
    pub fn vcs(&self, program: &str) -> GitCli<'_> {
        GitCli::new(self.runner.as_ref(), self.fs.as_ref()).with_program(program)
    }

    /// Writes the recorded cassettes now instead of on drop.
    ///
    /// Returns the cassette directory, or `None` when not recording.
    ///
    /// # Errors
    ///
    /// Returns an error if a cassette file cannot be written.
    pub fn finish_recording(&mut self) -> Result<Option<PathBuf>, String> {
        let Some(session) = self.session.take() else {
            return Ok(None);
        };
        // The recording adapters hold the other end of each recorder.
        self.fs = Box::new(Unconfigured(Port::Fs));
        self.runner = Box::new(Unconfigured(Port::Runner));
        session.finish().map(Some)
    }
}

impl Drop for ServiceContext {
    fn drop(&mut self) {
        if let Err(e) = self.finish_recording() {
            tracing::warn!(error = %e, "failed to write cassettes");
        }
    }
}

/// Stand-in for a port that has no cassette during replay.
struct Unconfigured(Port);

impl Unconfigured {
    fn fail(&self) -> ! {
        panic!(
            "{} port not configured in CassetteConfig: no cassette loaded for {}",
            match self.0 {
                Port::Fs => "FileSystem",
                Port::Runner => "CommandRunner",
            },
            self.0
        );
    }
}

impl FileSystem for Unconfigured {
    fn read_to_string(&self, _path: &Path) -> Result<String, PortError> {
        self.fail()
    }
    fn write(&self, _path: &Path, _contents: &str) -> Result<(), PortError> {
        self.fail()
    }
    fn exists(&self, _path: &Path) -> bool {
        self.fail()
    }
    fn list_dir(&self, _path: &Path) -> Result<Vec<String>, PortError> {
        self.fail()
    }
    fn create_dir_all(&self, _path: &Path) -> Result<(), PortError> {
        self.fail()
    }
}

impl CommandRunner for Unconfigured {
    fn run(
        &self,
        _program: &str,
        _args: &[String],
        _cwd: &Path,
    ) -> Result<CommandOutput, PortError> {
        self.fail()
    }
}
