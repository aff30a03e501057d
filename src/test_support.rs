//! In-memory port fakes shared by unit tests.

use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::context::ServiceContext;
use crate::cassette::config::CassetteConfig;
use crate::error::VcsCommandError;
use crate::ports::{
    CheckoutMode, CommandOutput, CommandRunner, FileSystem, PortError, VersionControl,
};

/// In-memory filesystem for testing without touching disk.
#[derive(Default)]
pub struct MemFs {
    files: Mutex<BTreeMap<PathBuf, String>>,
    dirs: Mutex<BTreeSet<PathBuf>>,
}

impl MemFs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(self, path: impl Into<PathBuf>, contents: &str) -> Self {
        self.files.lock().unwrap().insert(path.into(), contents.to_string());
        self
    }

    pub fn with_dir(self, path: impl Into<PathBuf>) -> Self {
        self.dirs.lock().unwrap().insert(path.into());
        self
    }

    pub fn contents(&self, path: &str) -> Option<String> {
        self.files.lock().unwrap().get(Path::new(path)).cloned()
    }
}

impl FileSystem for MemFs {
    fn read_to_string(&self, path: &Path) -> Result<String, PortError> {
        self.files
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| format!("File not found: {}", path.display()).into())
    }

    fn write(&self, path: &Path, contents: &str) -> Result<(), PortError> {
        self.files.lock().unwrap().insert(path.to_path_buf(), contents.to_string());
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        let files = self.files.lock().unwrap();
        let dirs = self.dirs.lock().unwrap();
        files.contains_key(path)
            || dirs.contains(path)
            || files.keys().chain(dirs.iter()).any(|k| k.starts_with(path) && k != path)
    }

    fn list_dir(&self, path: &Path) -> Result<Vec<String>, PortError> {
        let files = self.files.lock().unwrap();
        let dirs = self.dirs.lock().unwrap();
        let names: BTreeSet<String> = files
            .keys()
            .chain(dirs.iter())
            .filter_map(|k| k.strip_prefix(path).ok())
            .filter_map(|rest| rest.components().next())
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .filter(|n| !n.is_empty())
            .collect();
        Ok(names.into_iter().collect())
    }

    fn create_dir_all(&self, path: &Path) -> Result<(), PortError> {
        self.dirs.lock().unwrap().insert(path.to_path_buf());
        Ok(())
    }
}

/// Scripted version-control facade that records every mutating call.
#[derive(Default)]
pub struct FakeVcs {
    pub repositories: BTreeSet<PathBuf>,
    pub revisions: HashMap<PathBuf, String>,
    pub branches: HashMap<PathBuf, String>,
    pub local_branches: BTreeSet<(PathBuf, String)>,
    pub remote_branches: BTreeSet<(PathBuf, String)>,
    pub histories: Mutex<VecDeque<Result<String, VcsCommandError>>>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeVcs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_repository(mut self, path: &str, revision: &str) -> Self {
        self.repositories.insert(PathBuf::from(path));
        self.revisions.insert(PathBuf::from(path), revision.to_string());
        self
    }

    pub fn with_branch(mut self, path: &str, branch: &str) -> Self {
        self.branches.insert(PathBuf::from(path), branch.to_string());
        self
    }

    pub fn push_history(&self, result: Result<String, VcsCommandError>) {
        self.histories.lock().unwrap().push_back(result);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn log(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

impl VersionControl for FakeVcs {
    fn exists(&self, path: &Path) -> bool {
        self.repositories.iter().any(|r| r.starts_with(path))
    }

    fn is_repository(&self, path: &Path) -> bool {
        self.repositories.contains(path)
    }

    fn current_revision(&self, path: &Path) -> Result<String, VcsCommandError> {
        self.revisions.get(path).cloned().ok_or_else(|| VcsCommandError::Failed {
            command: format!("git rev-parse HEAD ({})", path.display()),
            exit_code: 128,
            stderr: "not a repository".into(),
        })
    }

    fn clone_repository(
        &self,
        destination: &Path,
        origin: &str,
        branch: Option<&str>,
    ) -> Result<(), VcsCommandError> {
        self.log(format!("clone {} {origin} {}", destination.display(), branch.unwrap_or("-")));
        Ok(())
    }

    fn pull(&self, path: &Path, branch: &str) -> Result<(), VcsCommandError> {
        self.log(format!("pull {} {branch}", path.display()));
        Ok(())
    }

    fn current_branch(&self, path: &Path) -> Result<String, VcsCommandError> {
        Ok(self.branches.get(path).cloned().unwrap_or_else(|| "master".into()))
    }

    fn has_local_branch(&self, path: &Path, name: &str) -> Result<bool, VcsCommandError> {
        Ok(self.local_branches.contains(&(path.to_path_buf(), name.to_string())))
    }

    fn has_remote_branch(&self, path: &Path, name: &str) -> Result<bool, VcsCommandError> {
        Ok(self.remote_branches.contains(&(path.to_path_buf(), name.to_string())))
    }

    fn checkout(
        &self,
        path: &Path,
        branch: &str,
        mode: CheckoutMode,
    ) -> Result<(), VcsCommandError> {
        self.log(format!("checkout {} {branch} {mode:?}", path.display()));
        Ok(())
    }

    fn history_raw(
        &self,
        path: &Path,
        range: &str,
        first_parent_only: bool,
        _format: &str,
    ) -> Result<String, VcsCommandError> {
        self.log(format!("log {} {range} first_parent={first_parent_only}", path.display()));
        self.histories.lock().unwrap().pop_front().unwrap_or_else(|| Ok(String::new()))
    }
}

/// Command runner answering from rules of `(cwd, argument prefix, output)`.
///
/// The most recently added matching rule wins; unmatched commands exit 1.
#[derive(Default)]
pub struct ScriptedRunner {
    rules: Mutex<Vec<(PathBuf, String, CommandOutput)>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(&self, cwd: &str, prefix: &str, exit_code: i32, stdout: &str) {
        self.rules.lock().unwrap().push((
            PathBuf::from(cwd),
            prefix.to_string(),
            CommandOutput {
                exit_code,
                stdout: stdout.to_string(),
                stderr: String::new(),
            },
        ));
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(&self, program: &str, args: &[String], cwd: &Path) -> Result<CommandOutput, PortError> {
        let line = args.join(" ");
        self.calls.lock().unwrap().push(format!("{} {program} {line}", cwd.display()));
        let rules = self.rules.lock().unwrap();
        Ok(rules
            .iter()
            .rev()
            .find(|(dir, prefix, _)| dir == cwd && line.starts_with(prefix.as_str()))
            .map_or_else(
                || CommandOutput {
                    exit_code: 1,
                    stdout: String::new(),
                    stderr: "unscripted".into(),
                },
                |(_, _, output)| output.clone(),
            ))
    }
}

/// Context whose ports are the given fakes.
pub fn context(
    fs: impl FileSystem + 'static,
    runner: impl CommandRunner + 'static,
) -> ServiceContext {
    let mut ctx = ServiceContext::replaying_from(&CassetteConfig::panic_on_unspecified())
        .expect("panic config should always succeed");
    ctx.fs = Box::new(fs);
    ctx.runner = Box::new(runner);
    ctx
}

impl<T: FileSystem> FileSystem for std::sync::Arc<T> {
    fn read_to_string(&self, path: &Path) -> Result<String, PortError> {
        (**self).read_to_string(path)
    }

    fn write(&self, path: &Path, contents: &str) -> Result<(), PortError> {
        (**self).write(path, contents)
    }

    fn exists(&self, path: &Path) -> bool {
        (**self).exists(path)
    }

    fn list_dir(&self, path: &Path) -> Result<Vec<String>, PortError> {
        (**self).list_dir(path)
    }

    fn create_dir_all(&self, path: &Path) -> Result<(), PortError> {
        (**self).create_dir_all(path)
    }
}

impl<T: CommandRunner> CommandRunner for std::sync::Arc<T> {
    fn run(&self, program: &str, args: &[String], cwd: &Path) -> Result<CommandOutput, PortError> {
        (**self).run(program, args, cwd)
    }
}
