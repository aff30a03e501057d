//! Recording adapter for the `CommandRunner` port.

use std::path::Path;

use serde::Serialize;

use super::record_result;
use crate::cassette::session::SharedRecorder;
use crate::ports::{CommandOutput, CommandRunner, PortError};

/// Runner that records every process it starts through an inner runner.
pub struct RecordingCommandRunner {
    inner: Box<dyn CommandRunner>,
    recorder: SharedRecorder,
}

impl RecordingCommandRunner {
    /// Wraps `inner`, logging to `recorder`.
    pub fn new(inner: Box<dyn CommandRunner>, recorder: SharedRecorder) -> Self {
        Self { inner, recorder }
    }
}

/// Arguments of one invocation as stored in the cassette.
#[derive(Serialize)]
pub(crate) struct RunInput<'a> {
    pub program: &'a str,
    pub args: &'a [String],
    pub cwd: String,
}

impl CommandRunner for RecordingCommandRunner {
    fn run(&self, program: &str, args: &[String], cwd: &Path) -> Result<CommandOutput, PortError> {
        let result = self.inner.run(program, args, cwd);
        let input = RunInput {
            program,
            args,
            cwd: cwd.display().to_string(),
        };
        record_result(&self.recorder, "run", &input, &result);
        result
    }
}
