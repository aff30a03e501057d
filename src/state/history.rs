//! Search over previously recorded snapshots.

use super::store::RunId;
use super::Snapshot;

/// Returns the newest snapshot recorded on `branch`.
///
/// `history` must be ordered newest first. Items are pulled one at a time
/// and the walk stops at the first match, so nothing older is touched.
///
/// # Errors
///
/// Returns the first error met before a match is found.
pub fn last_matching<I, E>(history: I, branch: Option<&str>) -> Result<Option<(RunId, Snapshot)>, E>
where
    I: IntoIterator<Item = Result<(RunId, Snapshot), E>>,
{
    for item in history {
        let (run, snapshot) = item?;
        if snapshot.branch() == branch {
            return Ok(Some((run, snapshot)));
        }
    }
    Ok(None)
}
