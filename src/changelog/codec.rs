//! Persisted change-log documents.
//!
//! A change log is a versioned YAML document:
//!
//! ```yaml
//! version: 1
//! entries:
//!   - module_path: libs/lib
//!     revision: 0123abcd...
//!     ...
//! ```
//!
//! Saves go through [`FileSystem::write`], which replaces the file
//! atomically.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::CommitEntry;
use crate::error::CodecError;
use crate::ports::FileSystem;

/// Document version written by this build.
pub const FORMAT_VERSION: u32 = 1;

#[derive(Serialize)]
struct DocumentOut<'a> {
    version: u32,
    entries: &'a [CommitEntry],
}

#[derive(Deserialize)]
struct VersionProbe {
    version: u32,
}

#[derive(Deserialize)]
struct DocumentIn {
    #[serde(default)]
    entries: Vec<CommitEntry>,
}

/// Encodes entries as a change-log document.
///
/// # Errors
///
/// Returns [`CodecError::Malformed`] if serialization fails.
pub fn encode(entries: &[CommitEntry]) -> Result<String, CodecError> {
    Ok(serde_yaml::to_string(&DocumentOut {
        version: FORMAT_VERSION,
        entries,
    })?)
}

/// Decodes a change-log document.
///
/// # Errors
///
/// Returns [`CodecError::Malformed`] for invalid YAML or structure and
/// [`CodecError::UnsupportedVersion`] for documents of another version.
pub fn decode(text: &str) -> Result<Vec<CommitEntry>, CodecError> {
    let probe: VersionProbe = serde_yaml::from_str(text)?;
    if probe.version != FORMAT_VERSION {
        return Err(CodecError::UnsupportedVersion {
            found: probe.version,
            expected: FORMAT_VERSION,
        });
    }
    let document: DocumentIn = serde_yaml::from_str(text)?;
    Ok(document.entries)
}

/// Writes `entries` to `path`.
///
/// # Errors
///
/// Returns an error if encoding or writing fails.
pub fn save(fs: &dyn FileSystem, path: &Path, entries: &[CommitEntry]) -> Result<(), CodecError> {
    let text = encode(entries)?;
    fs.write(path, &text).map_err(|e| CodecError::Write {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    tracing::debug!(path = %path.display(), entries = entries.len(), "saved change log");
    Ok(())
}

/// Reads the change log at `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or decoded.
pub fn load(fs: &dyn FileSystem, path: &Path) -> Result<Vec<CommitEntry>, CodecError> {
    let text = fs.read_to_string(path).map_err(|e| CodecError::Read {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    decode(&text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::live::filesystem::LiveFileSystem;
    use crate::changelog::ModifiedFile;

    fn entries() -> Vec<CommitEntry> {
        vec![
            CommitEntry::added("tools"),
            CommitEntry {
                module_path: "libs/lib".into(),
                revision: Some("0123abcd".into()),
                author_name: Some("Ada".into()),
                author_email: Some("ada@example.com".into()),
                author_date: Some("Mon, 3 Jun 2024 10:00:00 +0000".into()),
                committer_name: Some("Bob".into()),
                committer_email: Some("bob@example.com".into()),
                committer_date: Some("Tue, 4 Jun 2024 11:00:00 +0000".into()),
                message: Some("Fix: colon\n\n- yes: no".into()),
                modified_files: Some(vec![
                    ModifiedFile {
                        path: "src/lib.rs".into(),
                        action: 'M',
                    },
                    ModifiedFile {
                        path: "Y".into(),
                        action: 'D',
                    },
                ]),
                note: None,
            },
        ]
    }

    #[test]
    fn save_then_load_through_disk() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("changelogs").join("000001.yaml");
        let fs = LiveFileSystem;

        save(&fs, &path, &entries()).unwrap();
        assert_eq!(load(&fs, &path).unwrap(), entries());
    }

    #[test]
    fn structural_entries_omit_absent_fields() {
        let text = encode(&[CommitEntry::removed("gone")]).unwrap();
        assert!(text.starts_with("version: 1\n"));
        assert!(!text.contains("revision"));
        assert!(!text.contains("modified_files"));
    }

    #[test]
    fn other_versions_are_rejected() {
        let err = decode("version: 2\nentries: []\n").unwrap_err();
        assert!(matches!(err, CodecError::UnsupportedVersion { found: 2, expected: 1 }));
    }

    #[test]
    fn corrupt_documents_are_reported() {
        assert!(matches!(decode("entries: [").unwrap_err(), CodecError::Malformed(_)));
        assert!(matches!(decode("entries: []\n").unwrap_err(), CodecError::Malformed(_)));
        assert!(matches!(
            decode("version: 1\nentries:\n  - revision: abc\n").unwrap_err(),
            CodecError::Malformed(_)
        ));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = load(&LiveFileSystem, &dir.path().join("absent.yaml")).unwrap_err();
        assert!(matches!(err, CodecError::Read { .. }));
    }
}
