//! On-disk cassette documents.
//!
//! A cassette is a YAML file holding the ordered interactions one or more
//! ports had with the outside world. Recording sessions write one cassette
//! per port (`fs.cassette.yaml`, `runner.cassette.yaml`); a single file may
//! also mix ports.

use std::fmt;
use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

/// External boundary an interaction crossed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Port {
    /// The [`crate::ports::FileSystem`] port.
    Fs,
    /// The [`crate::ports::CommandRunner`] port.
    Runner,
}

impl Port {
    /// Every port, in the order sessions write them.
    pub const ALL: [Port; 2] = [Port::Fs, Port::Runner];

    /// Name used in cassettes and file names.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Port::Fs => "fs",
            Port::Runner => "runner",
        }
    }

    /// Conventional cassette file name for this port.
    #[must_use]
    pub fn cassette_file(self) -> String {
        format!("{}.cassette.yaml", self.as_str())
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One call made on a port, with what went in and what came back.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Interaction {
    /// Position in the cassette, starting at zero.
    pub seq: u64,
    /// Port the call was made on.
    pub port: Port,
    /// Port method, e.g. `run` or `read_to_string`.
    pub method: String,
    /// Arguments of the call.
    pub input: serde_json::Value,
    /// Result: `{"ok": ...}`, `{"err": "..."}`, or a bare value.
    pub output: serde_json::Value,
}

/// A recorded session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Cassette {
    /// Session name, `<timestamp>-<port>` for recorded sessions.
    pub name: String,
    /// When recording finished.
    pub recorded_at: DateTime<Utc>,
    /// Revision of the workspace root at recording time.
    pub commit: String,
    /// Interactions in call order.
    pub interactions: Vec<Interaction>,
}

impl Cassette {
    /// Parses a cassette from YAML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid cassette document.
    pub fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(text)
    }

    /// Reads and parses the cassette at `path`.
    ///
    /// # Errors
    ///
    /// Returns a message naming the file if it cannot be read or parsed.
    pub fn read(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read cassette file {}: {e}", path.display()))?;
        Self::from_yaml(&content)
            .map_err(|e| format!("Failed to parse cassette file {}: {e}", path.display()))
    }

    /// Writes the cassette to `path`, replacing any previous file in one step.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be written.
    pub fn write(&self, path: &Path) -> std::io::Result<()> {
        let yaml = serde_yaml::to_string(self).map_err(std::io::Error::other)?;
        let parent = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(parent)?;
        let mut tmp = NamedTempFile::new_in(parent)?;
        tmp.write_all(yaml.as_bytes())?;
        tmp.persist(path).map_err(|e| e.error)?;
        Ok(())
    }

    /// Number of interactions recorded for one port.
    #[must_use]
    pub fn count_for(&self, port: Port) -> usize {
        self.interactions.iter().filter(|i| i.port == port).count()
    }
}
