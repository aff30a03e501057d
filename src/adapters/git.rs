//! `VersionControl` facade that shells out to the `git` CLI.

use std::path::Path;

use tracing::debug;

use crate::error::VcsCommandError;
use crate::ports::{CheckoutMode, CommandOutput, CommandRunner, FileSystem, VersionControl};

/// Git facade built on top of the runner and filesystem ports.
///
/// Every command runs through the injected [`CommandRunner`], so the same
/// facade works live, while recording, and against a replayed cassette.
pub struct GitCli<'a> {
    runner: &'a dyn CommandRunner,
    fs: &'a dyn FileSystem,
    program: String,
}

impl<'a> GitCli<'a> {
    /// Creates a facade invoking `git` from `PATH`.
    #[must_use]
    pub fn new(runner: &'a dyn CommandRunner, fs: &'a dyn FileSystem) -> Self {
        Self {
            runner,
            fs,
            program: "git".to_string(),
        }
    }

    /// Uses a different git executable.
    #[must_use]
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    fn render(&self, args: &[String]) -> String {
        std::iter::once(self.program.as_str())
            .chain(args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Runs a command and returns its output whatever the exit status.
    fn probe(&self, cwd: &Path, args: &[String]) -> Result<CommandOutput, VcsCommandError> {
        debug!(cwd = %cwd.display(), command = %self.render(args), "running git");
        self.runner.run(&self.program, args, cwd).map_err(|e| VcsCommandError::Spawn {
            command: self.render(args),
            message: e.to_string(),
        })
    }

    /// Runs a command and fails on a non-zero exit status.
    fn exec(&self, cwd: &Path, args: &[String]) -> Result<CommandOutput, VcsCommandError> {
        let output = self.probe(cwd, args)?;
        if output.success() {
            Ok(output)
        } else {
            Err(VcsCommandError::Failed {
                command: self.render(args),
                exit_code: output.exit_code,
                stderr: output.stderr,
            })
        }
    }

    /// `rev-parse --verify --quiet <reference>`: exit 0 means present, 1 absent.
    fn ref_exists(&self, cwd: &Path, reference: &str) -> Result<bool, VcsCommandError> {
        let args = to_args(&["rev-parse", "--verify", "--quiet", reference]);
        let output = self.probe(cwd, &args)?;
        match output.exit_code {
            0 => Ok(true),
            1 => Ok(false),
            code => Err(VcsCommandError::Failed {
                command: self.render(&args),
                exit_code: code,
                stderr: output.stderr,
            }),
        }
    }
}

fn to_args(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|p| (*p).to_string()).collect()
}

impl VersionControl for GitCli<'_> {
    fn exists(&self, path: &Path) -> bool {
        self.fs.exists(path)
    }

    fn is_repository(&self, path: &Path) -> bool {
        self.fs.exists(&path.join(".git"))
    }

    fn current_revision(&self, path: &Path) -> Result<String, VcsCommandError> {
        let output = self.exec(path, &to_args(&["rev-parse", "HEAD"]))?;
        Ok(output.stdout.trim().to_string())
    }

    fn clone_repository(
        &self,
        destination: &Path,
        origin: &str,
        branch: Option<&str>,
    ) -> Result<(), VcsCommandError> {
        let parent = match destination.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let name = destination.file_name().map_or_else(
            || destination.display().to_string(),
            |n| n.to_string_lossy().into_owned(),
        );

        let mut args = to_args(&["clone"]);
        if let Some(branch) = branch {
            args.push("--branch".to_string());
            args.push(branch.to_string());
        }
        args.push(origin.to_string());
        args.push(name);

        self.fs.create_dir_all(parent).map_err(|e| VcsCommandError::Spawn {
            command: self.render(&args),
            message: format!("failed to create {}: {e}", parent.display()),
        })?;
        self.exec(parent, &args)?;
        Ok(())
    }

    fn pull(&self, path: &Path, branch: &str) -> Result<(), VcsCommandError> {
        self.exec(path, &to_args(&["pull", "origin", branch]))?;
        Ok(())
    }

    fn current_branch(&self, path: &Path) -> Result<String, VcsCommandError> {
        let output = self.exec(path, &to_args(&["symbolic-ref", "--short", "-q", "HEAD"]))?;
        Ok(output.stdout.trim().to_string())
    }

    fn has_local_branch(&self, path: &Path, name: &str) -> Result<bool, VcsCommandError> {
        self.ref_exists(path, &format!("refs/heads/{name}"))
    }

    fn has_remote_branch(&self, path: &Path, name: &str) -> Result<bool, VcsCommandError> {
        self.exec(path, &to_args(&["fetch", "origin"]))?;
        self.ref_exists(path, &format!("refs/remotes/origin/{name}"))
    }

    fn checkout(
        &self,
        path: &Path,
        branch: &str,
        mode: CheckoutMode,
    ) -> Result<(), VcsCommandError> {
        let remote = format!("origin/{branch}");
        let args = match mode {
            CheckoutMode::Existing => to_args(&["checkout", branch]),
            CheckoutMode::TrackRemote => to_args(&["checkout", "-b", branch, remote.as_str()]),
            CheckoutMode::Create => to_args(&["checkout", "-b", branch]),
        };
        self.exec(path, &args)?;
        Ok(())
    }

    fn history_raw(
        &self,
        path: &Path,
        range: &str,
        first_parent_only: bool,
        format: &str,
    ) -> Result<String, VcsCommandError> {
        let mut args = to_args(&["log", "--raw"]);
        if first_parent_only {
            args.push("--first-parent".to_string());
        }
        args.push(format!("--format={format}"));
        args.push(range.to_string());
        Ok(self.exec(path, &args)?.stdout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::PortError;
    use std::collections::HashSet;
    use std::path::PathBuf;
    use std::sync::Mutex;

    /// Runner that returns scripted outputs and remembers what it was asked.
    struct ScriptedRunner {
        outputs: Mutex<Vec<CommandOutput>>,
        calls: Mutex<Vec<(String, Vec<String>, PathBuf)>>,
    }

    impl ScriptedRunner {
        fn new(outputs: Vec<CommandOutput>) -> Self {
            Self {
                outputs: Mutex::new(outputs),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<(String, Vec<String>, PathBuf)> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl CommandRunner for ScriptedRunner {
        fn run(
            &self,
            program: &str,
            args: &[String],
            cwd: &Path,
        ) -> Result<CommandOutput, PortError> {
            self.calls
                .lock()
                .unwrap()
                .push((program.to_string(), args.to_vec(), cwd.into()));
            let mut outputs = self.outputs.lock().unwrap();
            if outputs.is_empty() {
                return Err("no scripted output left".into());
            }
            Ok(outputs.remove(0))
        }
    }

    struct SetFs {
        paths: HashSet<PathBuf>,
        created: Mutex<Vec<PathBuf>>,
    }

    impl SetFs {
        fn with(paths: &[&str]) -> Self {
            Self {
                paths: paths.iter().map(PathBuf::from).collect(),
                created: Mutex::new(Vec::new()),
            }
        }
    }

    impl FileSystem for SetFs {
        fn read_to_string(&self, path: &Path) -> Result<String, PortError> {
            Err(format!("unexpected read of {}", path.display()).into())
        }
        fn write(&self, _path: &Path, _contents: &str) -> Result<(), PortError> {
            Ok(())
        }
        fn exists(&self, path: &Path) -> bool {
            self.paths.contains(path)
        }
        fn list_dir(&self, _path: &Path) -> Result<Vec<String>, PortError> {
            Ok(Vec::new())
        }
        fn create_dir_all(&self, path: &Path) -> Result<(), PortError> {
            self.created.lock().unwrap().push(path.to_path_buf());
            Ok(())
        }
    }

    fn ok(stdout: &str) -> CommandOutput {
        CommandOutput {
            exit_code: 0,
            stdout: stdout.to_string(),
            stderr: String::new(),
        }
    }

    fn exit(code: i32, stderr: &str) -> CommandOutput {
        CommandOutput {
            exit_code: code,
            stdout: String::new(),
            stderr: stderr.to_string(),
        }
    }

    #[test]
    fn current_revision_trims_output() {
        let runner = ScriptedRunner::new(vec![ok("0123abcd\n")]);
        let fs = SetFs::with(&[]);
        let git = GitCli::new(&runner, &fs);

        assert_eq!(git.current_revision(Path::new("/w/libs/lib")).unwrap(), "0123abcd");
        let calls = runner.calls();
        assert_eq!(calls[0].0, "git");
        assert_eq!(calls[0].1, vec!["rev-parse", "HEAD"]);
        assert_eq!(calls[0].2, PathBuf::from("/w/libs/lib"));
    }

    #[test]
    fn is_repository_checks_for_git_dir() {
        let runner = ScriptedRunner::new(vec![]);
        let fs = SetFs::with(&["/w/lib", "/w/lib/.git", "/w/plain"]);
        let git = GitCli::new(&runner, &fs);

        assert!(git.is_repository(Path::new("/w/lib")));
        assert!(!git.is_repository(Path::new("/w/plain")));
        assert!(git.exists(Path::new("/w/plain")));
    }

    #[test]
    fn non_zero_exit_carries_command_line() {
        let runner = ScriptedRunner::new(vec![exit(1, "fatal: couldn't find remote ref dev")]);
        let fs = SetFs::with(&[]);
        let git = GitCli::new(&runner, &fs).with_program("/usr/bin/git");

        let err = git.pull(Path::new("/w"), "dev").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("[/usr/bin/git pull origin dev]"), "{msg}");
        assert!(msg.contains("couldn't find remote ref"));
    }

    #[test]
    fn spawn_failure_maps_to_spawn_error() {
        let runner = ScriptedRunner::new(vec![]);
        let fs = SetFs::with(&[]);
        let git = GitCli::new(&runner, &fs);

        let err = git.current_branch(Path::new("/w")).unwrap_err();
        assert!(matches!(err, VcsCommandError::Spawn { .. }));
    }

    #[test]
    fn clone_runs_in_parent_directory() {
        let runner = ScriptedRunner::new(vec![ok("")]);
        let fs = SetFs::with(&[]);
        let git = GitCli::new(&runner, &fs);

        git.clone_repository(Path::new("/w/libs/lib"), "https://host/grp/lib.git", Some("main"))
            .unwrap();

        let calls = runner.calls();
        assert_eq!(calls[0].2, PathBuf::from("/w/libs"));
        assert_eq!(
            calls[0].1,
            vec!["clone", "--branch", "main", "https://host/grp/lib.git", "lib"]
        );
        assert_eq!(*fs.created.lock().unwrap(), vec![PathBuf::from("/w/libs")]);
    }

    #[test]
    fn local_branch_probe_distinguishes_absent_from_failure() {
        let runner = ScriptedRunner::new(vec![ok("abc\n"), exit(1, ""), exit(128, "fatal")]);
        let fs = SetFs::with(&[]);
        let git = GitCli::new(&runner, &fs);

        assert!(git.has_local_branch(Path::new("/w"), "main").unwrap());
        assert!(!git.has_local_branch(Path::new("/w"), "dev").unwrap());
        assert!(git.has_local_branch(Path::new("/w"), "x").is_err());
        assert_eq!(runner.calls()[1].1, vec!["rev-parse", "--verify", "--quiet", "refs/heads/dev"]);
    }

    #[test]
    fn remote_branch_probe_fetches_first() {
        let runner = ScriptedRunner::new(vec![ok(""), ok("abc\n")]);
        let fs = SetFs::with(&[]);
        let git = GitCli::new(&runner, &fs);

        assert!(git.has_remote_branch(Path::new("/w"), "release").unwrap());
        let calls = runner.calls();
        assert_eq!(calls[0].1, vec!["fetch", "origin"]);
        assert_eq!(calls[1].1[3], "refs/remotes/origin/release");
    }

    #[test]
    fn checkout_modes_build_expected_commands() {
        let runner = ScriptedRunner::new(vec![ok(""), ok(""), ok("")]);
        let fs = SetFs::with(&[]);
        let git = GitCli::new(&runner, &fs);
        let path = Path::new("/w");

        git.checkout(path, "dev", CheckoutMode::Existing).unwrap();
        git.checkout(path, "dev", CheckoutMode::TrackRemote).unwrap();
        git.checkout(path, "dev", CheckoutMode::Create).unwrap();

        let calls = runner.calls();
        assert_eq!(calls[0].1, vec!["checkout", "dev"]);
        assert_eq!(calls[1].1, vec!["checkout", "-b", "dev", "origin/dev"]);
        assert_eq!(calls[2].1, vec!["checkout", "-b", "dev"]);
    }

    #[test]
    fn history_raw_honours_first_parent_flag() {
        let runner = ScriptedRunner::new(vec![ok("out-1"), ok("out-2")]);
        let fs = SetFs::with(&[]);
        let git = GitCli::new(&runner, &fs);

        assert_eq!(git.history_raw(Path::new("/w"), "a..b", false, "%H").unwrap(), "out-1");
        assert_eq!(git.history_raw(Path::new("/w"), "a..b", true, "%H").unwrap(), "out-2");

        let calls = runner.calls();
        assert_eq!(calls[0].1, vec!["log", "--raw", "--format=%H", "a..b"]);
        assert_eq!(calls[1].1, vec!["log", "--raw", "--first-parent", "--format=%H", "a..b"]);
    }
}
