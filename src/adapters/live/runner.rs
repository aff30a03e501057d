//! Live command runner using `std::process::Command`.

use std::path::Path;
use std::process::Command;

use crate::ports::{CommandOutput, CommandRunner, PortError};

/// Live runner that spawns real processes.
pub struct LiveCommandRunner;

impl CommandRunner for LiveCommandRunner {
    fn run(&self, program: &str, args: &[String], cwd: &Path) -> Result<CommandOutput, PortError> {
        let output = Command::new(program).args(args).current_dir(cwd).output()?;
        Ok(CommandOutput {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(script: &str) -> Vec<String> {
        vec!["-c".to_string(), script.to_string()]
    }

    #[test]
    fn runs_in_working_directory() {
        let dir = tempfile::TempDir::new().unwrap();
        let result = LiveCommandRunner.run("sh", &sh("pwd"), dir.path()).unwrap();

        assert_eq!(result.exit_code, 0);
        let reported = std::fs::canonicalize(result.stdout.trim()).unwrap();
        assert_eq!(reported, std::fs::canonicalize(dir.path()).unwrap());
    }

    #[test]
    fn captures_exit_code_and_stderr() {
        let result =
            LiveCommandRunner.run("sh", &sh("echo oops >&2; exit 42"), Path::new(".")).unwrap();

        assert_eq!(result.exit_code, 42);
        assert!(!result.success());
        assert_eq!(result.stderr.trim(), "oops");
    }

    #[test]
    fn missing_program_is_a_spawn_error() {
        let result = LiveCommandRunner.run("manifold-no-such-program", &[], Path::new("."));
        assert!(result.is_err());
    }
}
