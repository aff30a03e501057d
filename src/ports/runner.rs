//! Command runner port for spawning external programs.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::PortError;

/// The captured result of one finished process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandOutput {
    /// The exit code of the process (`-1` when killed by a signal).
    pub exit_code: i32,
    /// The captured standard output.
    pub stdout: String,
    /// The captured standard error.
    pub stderr: String,
}

impl CommandOutput {
    /// Returns `true` when the process exited with status zero.
    #[must_use]
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Runs a program with arguments inside a working directory.
///
/// The call blocks until the process exits; there is no internal timeout.
pub trait CommandRunner: Send + Sync {
    /// Runs `program` with `args` in `cwd` and captures its output.
    ///
    /// A non-zero exit status is not an error at this layer.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned.
    fn run(&self, program: &str, args: &[String], cwd: &Path) -> Result<CommandOutput, PortError>;
}
