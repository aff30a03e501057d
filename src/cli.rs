//! CLI argument definitions.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

use crate::config::Overrides;

/// Top-level CLI parser for `manifold`.
#[derive(Debug, Parser)]
#[command(
    name = "manifold",
    version,
    about = "Resolve multi-repository manifests and derive change logs between runs"
)]
pub struct Cli {
    /// Options shared by every command.
    #[command(flatten)]
    pub global: GlobalArgs,
    /// The command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Options shared by every command.
#[derive(Debug, Args)]
pub struct GlobalArgs {
    /// Workspace root (overrides `MANIFOLD_WORKSPACE`).
    #[arg(long, global = true, value_name = "DIR")]
    pub workspace: Option<PathBuf>,
    /// State store directory (overrides `MANIFOLD_STORE`).
    #[arg(long, global = true, value_name = "DIR")]
    pub store: Option<PathBuf>,
    /// Manifest file name inside the workspace (overrides `MANIFOLD_MANIFEST`).
    #[arg(long, global = true, value_name = "FILE")]
    pub manifest: Option<String>,
    /// Increase log verbosity (`-v` debug, `-vv` trace).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

impl GlobalArgs {
    /// Settings overrides carried by these flags.
    #[must_use]
    pub fn overrides(&self) -> Overrides {
        Overrides {
            workspace: self.workspace.clone(),
            store: self.store.clone(),
            manifest_file: self.manifest.clone(),
        }
    }
}

/// Supported top-level subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Resolve the manifest and print the snapshot.
    Snapshot {
        /// Skip querying checked-out revisions.
        #[arg(long)]
        no_revisions: bool,
        /// Record the snapshot as a new run.
        #[arg(long)]
        save: bool,
    },
    /// Clone or update the project and every module, then record a run.
    Sync {
        /// Root repository URL, used when the workspace is empty.
        #[arg(long)]
        repository: Option<String>,
        /// Root branch to check out.
        #[arg(long)]
        branch: Option<String>,
    },
    /// Derive the change log since the last run on this branch.
    Changelog {
        /// Follow only the first parent of merge commits.
        #[arg(long)]
        first_parent: bool,
    },
    /// Print the change log of a run.
    Show {
        /// Run number; defaults to the latest run.
        run: Option<u64>,
    },
}

#[cfg(test)]
mod tests {
    use super::{Cli, Command};
    use clap::Parser;

    #[test]
    fn parses_snapshot_flags() {
        let cli = Cli::parse_from(["manifold", "snapshot", "--no-revisions", "--save"]);
        assert!(matches!(cli.command, Command::Snapshot { no_revisions: true, save: true }));
    }

    #[test]
    fn global_flags_work_after_subcommand() {
        let cli = Cli::parse_from(["manifold", "changelog", "--workspace", "/w", "-vv"]);
        assert!(matches!(cli.command, Command::Changelog { first_parent: false }));
        assert_eq!(cli.global.workspace.as_deref(), Some(std::path::Path::new("/w")));
        assert_eq!(cli.global.verbose, 2);
    }

    #[test]
    fn parses_show_with_optional_run() {
        let cli = Cli::parse_from(["manifold", "show", "7"]);
        assert!(matches!(cli.command, Command::Show { run: Some(7) }));
        let cli = Cli::parse_from(["manifold", "show"]);
        assert!(matches!(cli.command, Command::Show { run: None }));
    }

    #[test]
    fn parses_sync_options() {
        let cli = Cli::parse_from(["manifold", "sync", "--repository", "https://h/g/r.git"]);
        match cli.command {
            Command::Sync { repository, branch } => {
                assert_eq!(repository.as_deref(), Some("https://h/g/r.git"));
                assert!(branch.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
