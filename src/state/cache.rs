//! Interning cache for module records.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use super::{ModuleRecord, ModuleState};

/// Hands out one shared [`ModuleRecord`] per distinct [`ModuleState`].
///
/// Lookup-or-insert happens under a single lock, so threads interning equal
/// states converge on the same instance. The cache lives as long as its
/// owner; create one per session and pass it by reference.
#[derive(Debug, Default)]
pub struct ModuleCache {
    entries: Mutex<HashSet<Arc<ModuleState>>>,
}

impl ModuleCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached record equal to `state`, inserting it if unseen.
    pub fn intern(&self, state: ModuleState) -> ModuleRecord {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = entries.get(&state) {
            return ModuleRecord::from_shared(Arc::clone(existing));
        }
        let shared = Arc::new(state);
        entries.insert(Arc::clone(&shared));
        ModuleRecord::from_shared(shared)
    }

    /// Builds and interns a record from its fields.
    pub fn record(
        &self,
        path: impl Into<String>,
        origin: impl Into<String>,
        branch: impl Into<String>,
        revision: Option<String>,
    ) -> ModuleRecord {
        self.intern(ModuleState {
            path: path.into(),
            origin: origin.into(),
            branch: branch.into(),
            revision,
        })
    }

    /// Number of distinct states held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Returns `true` if nothing has been interned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every cached state. Outstanding records stay valid.
    pub fn clear(&self) {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_states_share_one_instance() {
        let cache = ModuleCache::new();
        let a = cache.record("lib", "https://h/g/lib.git", "main", Some("abc".into()));
        let b = cache.record("lib", "https://h/g/lib.git", "main", Some("abc".into()));
        assert!(a.same_instance(&b));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn absent_revisions_compare_equal() {
        let cache = ModuleCache::new();
        let a = cache.record("lib", "https://h/g/lib.git", "main", None);
        let b = cache.record("lib", "https://h/g/lib.git", "main", None);
        assert!(a.same_instance(&b));
    }

    #[test]
    fn any_differing_field_is_a_new_instance() {
        let cache = ModuleCache::new();
        let base = cache.record("lib", "https://h/g/lib.git", "main", Some("abc".into()));
        let others = [
            cache.record("lib2", "https://h/g/lib.git", "main", Some("abc".into())),
            cache.record("lib", "https://h/g/other.git", "main", Some("abc".into())),
            cache.record("lib", "https://h/g/lib.git", "dev", Some("abc".into())),
            cache.record("lib", "https://h/g/lib.git", "main", None),
        ];
        for other in &others {
            assert!(!base.same_instance(other));
            assert_ne!(&base, other);
        }
        assert_eq!(cache.len(), 5);
    }

    #[test]
    fn separate_caches_give_equal_but_distinct_records() {
        let first = ModuleCache::new();
        let second = ModuleCache::new();
        let a = first.record("lib", "https://h/g/lib.git", "main", None);
        let b = second.record("lib", "https://h/g/lib.git", "main", None);
        assert_eq!(a, b);
        assert!(!a.same_instance(&b));
    }

    #[test]
    fn clear_forgets_states_but_not_records() {
        let cache = ModuleCache::new();
        let a = cache.record("lib", "https://h/g/lib.git", "main", None);
        cache.clear();
        assert!(cache.is_empty());
        let b = cache.record("lib", "https://h/g/lib.git", "main", None);
        assert_eq!(a, b);
        assert!(!a.same_instance(&b));
    }

    #[test]
    fn concurrent_interning_converges() {
        let cache = ModuleCache::new();
        let records: Vec<ModuleRecord> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| scope.spawn(|| cache.record("lib", "https://h/g/lib.git", "main", None)))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        assert!(records.windows(2).all(|w| w[0].same_instance(&w[1])));
    }
}
