use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, PoisonError, RwLock};

use crate::backend::{Backend, BackendError};
use crate::tree::Tree;
use crate::types::TranslationRecord;

/// group -> locale -> key -> record
type Store = BTreeMap<String, BTreeMap<String, BTreeMap<String, TranslationRecord>>>;

/// Writable in-process backend keyed by (group, locale, key).
///
/// Clones share storage, so a handle kept after registering the backend
/// with a translator can still save and delete records. A translator loads
/// each group once, so changes only show after [`Translator::reset`] and a
/// fresh preload.
///
/// [`Translator::reset`]: crate::Translator::reset
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    store: Arc<RwLock<Store>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a record under its own group, locale and key.
    pub fn insert(&self, record: TranslationRecord) {
        self.store
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(record.group().to_string())
            .or_default()
            .entry(record.locale().to_string())
            .or_default()
            .insert(record.key().to_string(), record);
    }

    pub fn get(&self, group: &str, locale: &str, key: &str) -> Option<TranslationRecord> {
        self.store
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(group)
            .and_then(|locales| locales.get(locale))
            .and_then(|keys| keys.get(key))
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.store
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .flat_map(BTreeMap::values)
            .map(BTreeMap::len)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn check_complete(record: &TranslationRecord) -> Result<(), BackendError> {
    if record.group().is_empty() || record.locale().is_empty() {
        return Err(BackendError::IncompleteRecord {
            key: record.key().to_string(),
        });
    }
    Ok(())
}

impl Backend for MemoryBackend {
    fn name(&self) -> &str {
        "memory"
    }

    fn list_groups(&self) -> Vec<String> {
        self.store
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }

    fn list_languages(&self) -> Vec<String> {
        let store = self.store.read().unwrap_or_else(PoisonError::into_inner);
        let locales: BTreeSet<&String> = store.values().flat_map(BTreeMap::keys).collect();
        locales.into_iter().cloned().collect()
    }

    fn load_translations(&self, locale: &str, group: &str) -> Result<Tree, BackendError> {
        let store = self.store.read().unwrap_or_else(PoisonError::into_inner);
        let mut tree = Tree::new();
        let Some(records) = store.get(group).and_then(|locales| locales.get(locale)) else {
            return Ok(tree);
        };
        for record in records.values() {
            tree.add(record.clone())
                .map_err(|source| BackendError::Tree {
                    name: format!("{}:{group}:{locale}", self.name()),
                    source,
                })?;
        }
        Ok(tree)
    }

    fn save_translation(&self, record: &TranslationRecord) -> Result<(), BackendError> {
        check_complete(record)?;
        tracing::debug!(
            group = record.group(),
            locale = record.locale(),
            key = record.key(),
            "saving translation"
        );
        self.insert(record.clone());
        Ok(())
    }

    fn delete_translation(&self, record: &TranslationRecord) -> Result<(), BackendError> {
        check_complete(record)?;
        let mut store = self.store.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(keys) = store
            .get_mut(record.group())
            .and_then(|locales| locales.get_mut(record.locale()))
        {
            keys.remove(record.key());
        }
        Ok(())
    }
}
