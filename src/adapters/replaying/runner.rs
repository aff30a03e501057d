//! Replaying adapter for the `CommandRunner` port.

use std::path::Path;
use std::sync::Mutex;

use super::{next_matching, replay_result};
use crate::adapters::recording::runner::RunInput;
use crate::cassette::format::Port;
use crate::cassette::replayer::CassetteReplayer;
use crate::ports::{CommandOutput, CommandRunner, PortError};

/// Answers process invocations from a cassette, in recorded order.
pub struct ReplayingCommandRunner {
    replayer: Mutex<CassetteReplayer>,
}

impl ReplayingCommandRunner {
    /// Creates a replaying runner over `replayer`.
    #[must_use]
    pub fn new(replayer: CassetteReplayer) -> Self {
        Self {
            replayer: Mutex::new(replayer),
        }
    }
}

impl CommandRunner for ReplayingCommandRunner {
    fn run(&self, program: &str, args: &[String], cwd: &Path) -> Result<CommandOutput, PortError> {
        let input = RunInput {
            program,
            args,
            cwd: cwd.display().to_string(),
        };
        let output = next_matching(&self.replayer, Port::Runner, "run", &input);
        replay_result(&output, "runner::run")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cassette::format::{Cassette, Interaction};
    use chrono::Utc;
    use serde_json::json;

    fn replaying(input: serde_json::Value, output: serde_json::Value) -> ReplayingCommandRunner {
        let cassette = Cassette {
            name: "test".into(),
            recorded_at: Utc::now(),
            commit: "abc".into(),
            interactions: vec![Interaction {
                seq: 0,
                port: Port::Runner,
                method: "run".into(),
                input,
                output,
            }],
        };
        ReplayingCommandRunner::new(CassetteReplayer::new(&cassette))
    }

    fn args(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|p| (*p).to_string()).collect()
    }

    #[test]
    fn recorded_output_is_returned() {
        let runner = replaying(
            json!({"program": "git", "args": ["rev-parse", "HEAD"], "cwd": "/w"}),
            json!({"ok": {"exit_code": 0, "stdout": "abc123\n", "stderr": ""}}),
        );
        let output = runner.run("git", &args(&["rev-parse", "HEAD"]), Path::new("/w")).unwrap();
        assert!(output.success());
        assert_eq!(output.stdout, "abc123\n");
    }

    #[test]
    fn spawn_failure_is_replayed_as_error() {
        let runner = replaying(
            json!({"program": "git"}),
            json!({"err": "No such file or directory"}),
        );
        let err = runner.run("git", &[], Path::new("/w")).unwrap_err();
        assert!(err.to_string().contains("No such file"));
    }

    #[test]
    #[should_panic(expected = "recorded with args")]
    fn different_command_is_detected() {
        let runner = replaying(
            json!({"program": "git", "args": ["pull", "origin", "main"], "cwd": "/w"}),
            json!({"ok": {"exit_code": 0, "stdout": "", "stderr": ""}}),
        );
        let _ = runner.run("git", &args(&["pull", "origin", "dev"]), Path::new("/w"));
    }
}
