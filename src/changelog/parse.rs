//! Parser for raw history output produced with [`HISTORY_FORMAT`].
//!
//! Each commit is introduced by [`RECORD_MARKER`]; inside a record, fields
//! are terminated by [`FIELD_MARKER`]. The tokens only need to be unlikely
//! to occur in commit content. The last field holds the `--raw` file status
//! lines the tool appends after the formatted header.

use tracing::warn;

use super::{CommitEntry, ModifiedFile};

macro_rules! record_marker {
    () => {
        "[[<mfd:record:7c1f9a2e>]]"
    };
}

macro_rules! field_marker {
    () => {
        "[[<mfd:field:7c1f9a2e>]]"
    };
}

/// Token that starts every record.
pub const RECORD_MARKER: &str = record_marker!();

/// Token that ends every field.
pub const FIELD_MARKER: &str = field_marker!();

/// `--format` argument matching [`parse_history`].
pub const HISTORY_FORMAT: &str = concat!(
    record_marker!(),
    "%H",
    field_marker!(),
    "%an",
    field_marker!(),
    "%ae",
    field_marker!(),
    "%aD",
    field_marker!(),
    "%cn",
    field_marker!(),
    "%ce",
    field_marker!(),
    "%cD",
    field_marker!(),
    "%s%n%b",
    field_marker!(),
);

/// Hash, seven identity fields, message, file status block.
const MIN_FIELDS: usize = 9;

/// Parses history output into entries for the module at `module_path`.
///
/// Records with fewer than the required fields are dropped; parsing carries
/// on with the next record.
#[must_use]
pub fn parse_history(module_path: &str, output: &str) -> Vec<CommitEntry> {
    let mut entries = Vec::new();
    for record in output.split(RECORD_MARKER) {
        let fields: Vec<&str> = record.split(FIELD_MARKER).collect();
        if fields.len() < MIN_FIELDS {
            if !record.trim().is_empty() {
                warn!(
                    module = module_path,
                    fields = fields.len(),
                    "dropping malformed history record"
                );
            }
            continue;
        }

        entries.push(CommitEntry {
            module_path: module_path.to_string(),
            revision: non_empty(fields[0].trim()),
            author_name: non_empty(fields[1]),
            author_email: non_empty(fields[2]),
            author_date: non_empty(fields[3]),
            committer_name: non_empty(fields[4]),
            committer_email: non_empty(fields[5]),
            committer_date: non_empty(fields[6]),
            message: non_empty(fields[7].trim_end()),
            modified_files: Some(parse_file_lines(fields[8])),
            note: None,
        });
    }
    entries
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

/// Parses `--raw` status lines such as
/// `:100644 100644 1a2b3c4 5d6e7f8 M<TAB>src/lib.rs`.
///
/// Lines not starting with `:` are ignored. For renames and copies the
/// destination path is kept.
#[must_use]
pub fn parse_file_lines(block: &str) -> Vec<ModifiedFile> {
    block
        .lines()
        .filter(|line| line.starts_with(':'))
        .filter_map(|line| {
            let (meta, paths) = line.split_once('\t')?;
            let action = meta.split_whitespace().last()?.chars().next()?;
            let path = paths.rsplit('\t').next()?.trim_end();
            (!path.is_empty()).then(|| ModifiedFile {
                path: path.to_string(),
                action,
            })
        })
        .collect()
}
