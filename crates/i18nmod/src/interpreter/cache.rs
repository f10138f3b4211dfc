//! Selective memoization of resolutions.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, PoisonError, RwLock};

use crate::interpreter::Resolution;
use crate::types::TranslationKey;

/// Memoizes resolutions of allow-listed keys, per locale scope.
///
/// A key is allow-listed when it was requested with the cache sigil (`^`)
/// or registered through [`Cache::allow`]. Entries are scoped by the
/// requested locale list, so the same key reached through different
/// fallback chains is cached separately. Within a scope the entry name
/// carries the request's count and template data, so `items` counted 1
/// and `items` counted 5 never share an entry.
#[derive(Debug, Default)]
pub struct Cache {
    entries: RwLock<HashMap<String, HashMap<String, Arc<Resolution>>>>,
    allowed: RwLock<HashSet<String>>,
}

impl Cache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allow-list a key (without sigil or modifier).
    pub fn allow(&self, key: &str) -> &Self {
        self.allowed
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string());
        self
    }

    pub fn is_allowed(&self, key: &TranslationKey) -> bool {
        key.is_cacheable()
            || self
                .allowed
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .contains(key.key())
    }

    /// Cached resolution stored under `entry` within `scope`.
    pub fn get(&self, scope: &str, entry: &str) -> Option<Arc<Resolution>> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(scope)
            .and_then(|entries| entries.get(entry))
            .cloned()
    }

    /// Store `resolution` under `entry` within `scope`. Callers check
    /// [`Cache::is_allowed`] first.
    pub fn insert(&self, scope: &str, entry: &str, resolution: &Arc<Resolution>) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(scope.to_string())
            .or_default()
            .insert(entry.to_string(), Arc::clone(resolution));
    }

    /// Number of cached resolutions across all scopes.
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .map(HashMap::len)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}
