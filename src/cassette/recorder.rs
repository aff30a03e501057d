//! Accumulates the interactions of one port during a recording session.

use std::path::{Path, PathBuf};

use chrono::Utc;

use super::format::{Cassette, Interaction, Port};

/// Collects calls made on a single port and writes them as a cassette.
#[derive(Debug)]
pub struct CassetteRecorder {
    port: Port,
    path: PathBuf,
    name: String,
    commit: String,
    interactions: Vec<Interaction>,
}

impl CassetteRecorder {
    /// Creates a recorder for `port` that will write to `path`.
    pub fn new(
        port: Port,
        path: impl Into<PathBuf>,
        name: impl Into<String>,
        commit: impl Into<String>,
    ) -> Self {
        Self {
            port,
            path: path.into(),
            name: name.into(),
            commit: commit.into(),
            interactions: Vec::new(),
        }
    }

    /// Port this recorder captures.
    #[must_use]
    pub fn port(&self) -> Port {
        self.port
    }

    /// Destination of the cassette.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends a call; sequence numbers follow call order.
    pub fn record(
        &mut self,
        method: impl Into<String>,
        input: serde_json::Value,
        output: serde_json::Value,
    ) {
        self.interactions.push(Interaction {
            seq: self.interactions.len() as u64,
            port: self.port,
            method: method.into(),
            input,
            output,
        });
    }

    /// Number of interactions captured so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.interactions.len()
    }

    /// Returns `true` if nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.interactions.is_empty()
    }

    /// Writes the cassette and returns its path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn finish(self) -> Result<PathBuf, std::io::Error> {
        let cassette = Cassette {
            name: self.name,
            recorded_at: Utc::now(),
            commit: self.commit,
            interactions: self.interactions,
        };
        cassette.write(&self.path)?;
        tracing::debug!(port = %self.port, path = %self.path.display(), "wrote cassette");
        Ok(self.path)
    }
}
