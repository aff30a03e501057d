//! Change detection between two snapshots.

use tracing::debug;

use super::{ModuleCache, ModuleRecord, Snapshot};

/// Computes which modules changed between `previous` and `current`.
///
/// Returns `None` when there is no previous snapshot; enumerating every
/// module of a first run would produce an unbounded log. Otherwise, in
/// `current` order:
///
/// - a path unknown to `previous` yields a placeholder with no revision;
/// - a path whose record differs yields the *previous* record, which is the
///   baseline of the history range;
/// - an unchanged path yields nothing.
///
/// Paths only present in `previous` are not reported.
#[must_use]
#[tracing::instrument(level = "debug", skip_all, fields(modules = current.len()))]
pub fn what_changed(
    current: &Snapshot,
    previous: Option<&Snapshot>,
    cache: &ModuleCache,
) -> Option<Vec<ModuleRecord>> {
    let Some(previous) = previous else {
        debug!("no previous snapshot, treating everything as new");
        return None;
    };

    let mut changes = Vec::new();
    for module in current.modules() {
        match previous.get(&module.path) {
            None => {
                debug!(path = %module.path, "module added");
                changes.push(cache.record(
                    module.path.clone(),
                    module.origin.clone(),
                    module.branch.clone(),
                    None,
                ));
            }
            Some(old) if old != module => {
                debug!(path = %module.path, "module changed");
                changes.push(old.clone());
            }
            Some(_) => {}
        }
    }
    Some(changes)
}
