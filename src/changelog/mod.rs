//! Change logs: commit entries mined from module histories.

pub mod codec;
pub mod extract;
pub mod parse;

use serde::{Deserialize, Serialize};

pub use extract::Extractor;

/// Note attached to the entry of a module that entered the manifest.
pub const ADDED_NOTE: &str = "This module was added to the manifest.";
/// Note attached to the entry of a module that left the manifest.
pub const REMOVED_NOTE: &str = "This module was removed from the manifest.";

/// One file touched by a commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifiedFile {
    /// Path relative to the module root.
    pub path: String,
    /// Raw status letter (`A`, `M`, `D`, `R`, ...).
    pub action: char,
}

/// One commit of one module, or a structural add/remove marker.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitEntry {
    /// Workspace-relative path of the module.
    pub module_path: String,
    /// Commit hash; `None` for structural entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision: Option<String>,
    /// Author name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_name: Option<String>,
    /// Author email.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_email: Option<String>,
    /// Author date as printed by the tool (RFC 2822).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_date: Option<String>,
    /// Committer name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub committer_name: Option<String>,
    /// Committer email.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub committer_email: Option<String>,
    /// Committer date (RFC 2822).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub committer_date: Option<String>,
    /// Subject and body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Files touched, in the order reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_files: Option<Vec<ModifiedFile>>,
    /// Explanation for structural entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl CommitEntry {
    /// Structural entry for a module that entered the manifest.
    pub fn added(module_path: impl Into<String>) -> Self {
        Self {
            module_path: module_path.into(),
            note: Some(ADDED_NOTE.into()),
            ..Self::default()
        }
    }

    /// Structural entry for a module that left the manifest.
    pub fn removed(module_path: impl Into<String>) -> Self {
        Self {
            module_path: module_path.into(),
            note: Some(REMOVED_NOTE.into()),
            ..Self::default()
        }
    }

    /// Returns `true` for add/remove markers that are not real commits.
    #[must_use]
    pub fn is_structural(&self) -> bool {
        self.revision.is_none() && self.note.is_some()
    }

    /// First line of the message.
    #[must_use]
    pub fn subject(&self) -> Option<&str> {
        self.message.as_deref().and_then(|m| m.lines().next())
    }
}

/// Renders entries for the terminal, grouped by module.
#[must_use]
pub fn format_entries(entries: &[CommitEntry]) -> String {
    if entries.is_empty() {
        return "No changes recorded.".to_string();
    }

    let mut lines = Vec::new();
    let mut current_module: Option<&str> = None;
    for entry in entries {
        if current_module != Some(entry.module_path.as_str()) {
            if current_module.is_some() {
                lines.push(String::new());
            }
            lines.push(format!("{}:", entry.module_path));
            current_module = Some(&entry.module_path);
        }

        if entry.is_structural() {
            lines.push(format!("  * {}", entry.note.as_deref().unwrap_or_default()));
            continue;
        }

        let revision = entry.revision.as_deref().unwrap_or("?");
        let short = revision.get(..10).unwrap_or(revision);
        let author = match (&entry.author_name, &entry.author_email) {
            (Some(name), Some(email)) => format!("{name} <{email}>"),
            (Some(name), None) => name.clone(),
            (None, Some(email)) => format!("<{email}>"),
            (None, None) => "unknown".to_string(),
        };
        lines.push(format!("  {short} {author}"));
        if let Some(date) = &entry.author_date {
            lines.push(format!("    {date}"));
        }
        if let Some(subject) = entry.subject() {
            lines.push(format!("    {subject}"));
        }
        for file in entry.modified_files.iter().flatten() {
            lines.push(format!("      {} {}", file.action, file.path));
        }
    }

    lines.join("\n")
}
