//! `manifold changelog` command.

use tracing::{info, warn};

use crate::changelog::extract::Extractor;
use crate::changelog::{codec, format_entries, CommitEntry};
use crate::config::Settings;
use crate::context::ServiceContext;
use crate::manifest::Resolver;
use crate::state::diff::what_changed;
use crate::state::store::{RunId, SnapshotStore};
use crate::state::ModuleCache;

/// Result of one change-log run.
#[derive(Debug)]
pub struct Outcome {
    /// The run the current snapshot was recorded as.
    pub run: RunId,
    /// Entries since the previous run on the same branch; `None` on the first
    /// run of a branch.
    pub entries: Option<Vec<CommitEntry>>,
}

/// Execute the `changelog` command.
///
/// # Errors
///
/// Returns an error string if resolution, extraction, or persistence fails.
pub fn run(ctx: &ServiceContext, settings: &Settings, first_parent: bool) -> Result<(), String> {
    let outcome = generate(ctx, settings, first_parent)?;
    match &outcome.entries {
        None => println!("No previous run on this branch; recorded baseline run {}", outcome.run),
        Some(entries) => {
            println!("{}", format_entries(entries));
            println!("Recorded run {}", outcome.run);
        }
    }
    Ok(())
}

/// Resolves the workspace, diffs it against the last run on the same branch,
/// and mines the history of every changed module.
///
/// The change log is stored next to the run it belongs to. If a history
/// query fails, the entries gathered so far are still saved but the snapshot
/// is not recorded, so the next attempt diffs against the same baseline.
///
/// # Errors
///
/// Returns an error string if resolution, extraction, or persistence fails.
pub fn generate(
    ctx: &ServiceContext,
    settings: &Settings,
    first_parent: bool,
) -> Result<Outcome, String> {
    let cache = ModuleCache::new();
    let vcs = ctx.vcs(&settings.git);
    let fs = ctx.fs.as_ref();

    let mut current = Resolver::new(&vcs, &cache)
        .resolve_file(fs, &settings.workspace, &settings.manifest_file, true)
        .map_err(|e| e.to_string())?;
    current.track_project();

    let store = SnapshotStore::new(fs, &settings.store_dir());
    let previous = store
        .last_on_branch(current.branch(), &cache)
        .map_err(|e| e.to_string())?
        .map(|(_, snapshot)| snapshot);

    let Some(changes) = what_changed(&current, previous.as_ref(), &cache) else {
        let run = store.record(&current).map_err(|e| e.to_string())?;
        info!(%run, "recorded baseline");
        return Ok(Outcome { run, entries: None });
    };

    let include_merges = settings.include_merge_commits && !first_parent;
    let mut entries = Vec::new();
    let extracted = Extractor::new(&vcs, &settings.workspace)
        .include_merge_commits(include_merges)
        .extract_into(&changes, &current, &mut entries);

    let run = store.next_run().map_err(|e| e.to_string())?;
    if !entries.is_empty() {
        codec::save(fs, &store.changelog_path(run), &entries).map_err(|e| e.to_string())?;
    }
    if let Err(e) = extracted {
        warn!(%run, saved = entries.len(), "history extraction failed, snapshot not recorded");
        return Err(e.to_string());
    }

    let run = store.record(&current).map_err(|e| e.to_string())?;
    info!(%run, entries = entries.len(), "recorded change log");
    Ok(Outcome {
        run,
        entries: Some(entries),
    })
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::sync::Arc;

    use super::*;
    use crate::changelog::parse::{FIELD_MARKER, RECORD_MARKER};
    use crate::changelog::ADDED_NOTE;
    use crate::commands::fixtures::{settings, MANIFEST};
    use crate::ports::FileSystem;
    use crate::test_support::{context, MemFs, ScriptedRunner};

    const SECOND_LOG: &str = "/w/.manifold/changelogs/000002.yaml";

    fn commit(hash: &str, subject: &str) -> String {
        let fields = [
            hash,
            "Ann",
            "ann@example.com",
            "Tue, 6 Oct 2026 10:00:00 +0000",
            "Ann",
            "ann@example.com",
            "Tue, 6 Oct 2026 10:00:00 +0000",
            subject,
        ];
        format!(
            "{RECORD_MARKER}{}{FIELD_MARKER}\n:100644 100644 abc def M\tsrc/lib.rs\n",
            fields.join(FIELD_MARKER)
        )
    }

    fn workspace() -> Arc<MemFs> {
        Arc::new(
            MemFs::new()
                .with_file("/w/repo.xml", MANIFEST)
                .with_dir("/w/.git")
                .with_dir("/w/libs/lib/.git"),
        )
    }

    fn revisions(runner: &ScriptedRunner, root: &str, lib: &str) {
        runner.on("/w", "rev-parse HEAD", 0, &format!("{root}\n"));
        runner.on("/w/libs/lib", "rev-parse HEAD", 0, &format!("{lib}\n"));
    }

    #[test]
    fn first_run_records_a_baseline() {
        let runner = ScriptedRunner::new();
        revisions(&runner, "r1", "l1");
        let ctx = context(workspace(), runner);

        let outcome = generate(&ctx, &settings(), false).unwrap();

        assert_eq!(outcome.run, RunId(1));
        assert!(outcome.entries.is_none());
    }

    #[test]
    fn second_run_mines_changed_modules_only() {
        let fs = workspace();
        let runner = Arc::new(ScriptedRunner::new());
        revisions(&runner, "r1", "l1");
        let ctx = context(Arc::clone(&fs), Arc::clone(&runner));
        generate(&ctx, &settings(), false).unwrap();

        revisions(&runner, "r1", "l2");
        runner.on("/w/libs/lib", "log --raw", 0, &commit("l2", "Fix parser"));
        let outcome = generate(&ctx, &settings(), true).unwrap();

        assert_eq!(outcome.run, RunId(2));
        let entries = outcome.entries.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].module_path, "libs/lib");
        assert_eq!(entries[0].subject(), Some("Fix parser"));
        assert!(runner
            .calls()
            .iter()
            .any(|c| c.starts_with("/w/libs/lib git log --raw --first-parent")
                && c.ends_with("l1..l2")));
        let saved = codec::load(fs.as_ref(), Path::new(SECOND_LOG)).unwrap();
        assert_eq!(saved, entries);
    }

    #[test]
    fn module_added_to_manifest_gets_a_note() {
        let fs = workspace();
        let runner = Arc::new(ScriptedRunner::new());
        revisions(&runner, "r1", "l1");
        let ctx = context(Arc::clone(&fs), Arc::clone(&runner));
        generate(&ctx, &settings(), false).unwrap();

        fs.write(
            Path::new("/w/repo.xml"),
            &MANIFEST.replace(
                "</manifest>",
                r#"<module name="docs" origin="../docs.git" /></manifest>"#,
            ),
        )
        .unwrap();
        let outcome = generate(&ctx, &settings(), false).unwrap();

        let entries = outcome.entries.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].module_path, "./docs");
        assert_eq!(entries[0].note.as_deref(), Some(ADDED_NOTE));
    }

    #[test]
    fn failed_query_keeps_partial_log_and_baseline() {
        let fs = workspace();
        let runner = Arc::new(ScriptedRunner::new());
        revisions(&runner, "r1", "l1");
        let ctx = context(Arc::clone(&fs), Arc::clone(&runner));
        generate(&ctx, &settings(), false).unwrap();

        revisions(&runner, "r2", "l2");
        runner.on("/w", "log --raw", 0, &commit("r2", "Bump modules"));
        runner.on("/w/libs/lib", "log --raw", 128, "");
        let err = generate(&ctx, &settings(), false).unwrap_err();

        assert!(err.contains("git log --raw"));
        let partial = codec::load(fs.as_ref(), Path::new(SECOND_LOG)).unwrap();
        assert_eq!(partial.len(), 1);
        assert_eq!(partial[0].module_path, "./");
        assert!(fs.contents("/w/.manifold/snapshots/000002.yaml").is_none());
    }
}
