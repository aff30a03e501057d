//! Which cassette each port replays from.

use std::path::{Path, PathBuf};

use super::format::{Cassette, Port};
use super::replayer::CassetteReplayer;

/// Per-port cassette paths. A port without a path panics when called
/// during replay.
#[derive(Debug, Clone, Default)]
pub struct CassetteConfig {
    /// Cassette for the filesystem port.
    pub fs: Option<PathBuf>,
    /// Cassette for the command runner port.
    pub runner: Option<PathBuf>,
}

/// Loaded replayers, one per configured port.
pub struct PortReplayers {
    /// Replayer for the filesystem port.
    pub fs: Option<CassetteReplayer>,
    /// Replayer for the command runner port.
    pub runner: Option<CassetteReplayer>,
}

impl CassetteConfig {
    /// A config with no cassettes at all.
    #[must_use]
    pub fn panic_on_unspecified() -> Self {
        Self::default()
    }

    /// Points each port at its file in a recording session directory,
    /// skipping files that do not exist.
    #[must_use]
    pub fn from_session_dir(dir: &Path) -> Self {
        let mut config = Self::default();
        for port in Port::ALL {
            let path = dir.join(port.cassette_file());
            if path.exists() {
                *config.slot(port) = Some(path);
            }
        }
        config
    }

    fn slot(&mut self, port: Port) -> &mut Option<PathBuf> {
        match port {
            Port::Fs => &mut self.fs,
            Port::Runner => &mut self.runner,
        }
    }

    /// Reads one cassette file into a replayer.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_port_cassette(path: &Path) -> Result<CassetteReplayer, String> {
        Ok(CassetteReplayer::new(&Cassette::read(path)?))
    }

    /// Loads every configured cassette.
    ///
    /// # Errors
    ///
    /// Returns an error if any configured cassette file cannot be read or parsed.
    pub fn load_all(&self) -> Result<PortReplayers, String> {
        Ok(PortReplayers {
            fs: self.fs.as_deref().map(Self::load_port_cassette).transpose()?,
            runner: self.runner.as_deref().map(Self::load_port_cassette).transpose()?,
        })
    }
}
