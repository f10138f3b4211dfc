//! The resolution engine.
//!
//! The Translator owns the registered backends and the per-group locale
//! lookup tables built from them, and resolves requests against those tables
//! in the caller's locale priority order.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, PoisonError, RwLock};

use bon::Builder;
use serde::Serialize;

use crate::backend::Backend;
use crate::interpreter::cache::Cache;
use crate::interpreter::error::{LoadError, TranslateError, compute_suggestions};
use crate::interpreter::evaluator::render;
use crate::interpreter::plural::CaseValue;
use crate::interpreter::registry::{Registry, canonical_locale};
use crate::interpreter::{Context, Request, Resolution};
use crate::parser::TemplateError;
use crate::tree::Tree;
use crate::types::{RecordContent, RecordView, TranslationRecord};

/// Locale matching any requested locale; consulted last.
pub const ANY_LOCALE: &str = "_";

/// Alias redirections followed before a request fails.
pub const DEFAULT_MAX_ALIAS_HOPS: usize = 5;

/// Observer fired after a group finished preloading.
pub type GroupObserver = Arc<dyn Fn(&Translator, &str) + Send + Sync>;

/// Transformation applied to every freshly created context.
pub type ContextCallback = Arc<dyn Fn(Context) -> Context + Send + Sync>;

type KeyTable = BTreeMap<String, Arc<TranslationRecord>>;

#[derive(Debug, Default)]
struct LocaleTable {
    /// group -> locale -> key -> record
    groups: BTreeMap<String, BTreeMap<String, KeyTable>>,
    preloaded: BTreeSet<String>,
}

/// Resolves translation keys against preloaded backend data.
///
/// A Translator is shared behind an [`Arc`]; contexts created from it keep it
/// alive. Preloading takes the table's write lock, resolution takes the read
/// lock, so steady-state requests never block each other.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use i18nmod::{MemoryBackend, Registry, RecordContent, TranslationRecord, Translator};
///
/// let backend = MemoryBackend::new();
/// backend.insert(
///     TranslationRecord::builder()
///         .group("menu")
///         .locale("en")
///         .key("open")
///         .content(RecordContent::Text("Open".to_string()))
///         .build(),
/// );
///
/// let translator = Arc::new(
///     Translator::builder()
///         .registry(Registry::builder().default_locale("en").build())
///         .build(),
/// );
/// translator.add_backend(backend);
/// translator.preload(&["en"], &["menu"]).unwrap();
///
/// assert_eq!(translator.context("de").t("menu.open").get(), "Open");
/// ```
#[derive(Builder)]
pub struct Translator {
    #[builder(default)]
    registry: Registry,

    /// Upper bound on alias redirections per request.
    #[builder(default = DEFAULT_MAX_ALIAS_HOPS)]
    max_alias_hops: usize,

    #[builder(skip)]
    backends: RwLock<Vec<Arc<dyn Backend>>>,

    #[builder(skip)]
    table: RwLock<LocaleTable>,

    #[builder(skip)]
    cache: Cache,

    #[builder(skip)]
    group_observers: RwLock<BTreeMap<String, Vec<GroupObserver>>>,

    #[builder(skip)]
    context_callbacks: RwLock<Vec<ContextCallback>>,
}

impl Default for Translator {
    fn default() -> Self {
        Translator::builder().build()
    }
}

impl Translator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn max_alias_hops(&self) -> usize {
        self.max_alias_hops
    }

    pub fn cache(&self) -> &Cache {
        &self.cache
    }

    // =========================================================================
    // Backends and Preloading
    // =========================================================================

    /// Register a backend. Earlier backends win conflicts on merge.
    pub fn add_backend(&self, backend: impl Backend + 'static) {
        self.add_shared_backend(Arc::new(backend));
    }

    pub fn add_shared_backend(&self, backend: Arc<dyn Backend>) {
        tracing::debug!(backend = backend.name(), "backend registered");
        self.backends
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(backend);
    }

    /// Fire `observer` every time `group` finishes preloading.
    pub fn on_group_loaded(
        &self,
        group: &str,
        observer: impl Fn(&Translator, &str) + Send + Sync + 'static,
    ) {
        self.group_observers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(group.to_string())
            .or_default()
            .push(Arc::new(observer));
    }

    /// Transform every context created by [`Translator::context`].
    pub fn on_context_create(&self, callback: impl Fn(Context) -> Context + Send + Sync + 'static) {
        self.context_callbacks
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::new(callback));
    }

    /// Preload every group advertised by any backend in every advertised
    /// locale.
    pub fn preload_all(&self) -> Result<(), LoadError> {
        self.preload::<&str>(&[], &[])
    }

    /// Load `groups` in `locales` from every backend.
    ///
    /// Empty slices mean "everything any backend advertises". A group is
    /// loaded at most once; preloading it again is a no-op. On failure the
    /// tables committed so far are kept.
    ///
    /// Backends may perform blocking I/O here.
    pub fn preload<S: AsRef<str>>(&self, locales: &[S], groups: &[S]) -> Result<(), LoadError> {
        let backends = self
            .backends
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        let locales: BTreeSet<String> = if locales.is_empty() {
            backends.iter().flat_map(|b| b.list_languages()).collect()
        } else {
            locales.iter().map(|l| l.as_ref().to_string()).collect()
        };
        let groups: BTreeSet<String> = if groups.is_empty() {
            backends.iter().flat_map(|b| b.list_groups()).collect()
        } else {
            groups.iter().map(|g| g.as_ref().to_string()).collect()
        };

        for group in &groups {
            if self.is_preloaded(group) {
                tracing::trace!(group = %group, "group already preloaded");
                continue;
            }

            for locale in &locales {
                let records = load_group(&backends, locale, group)?;
                self.commit(group, locale, records);
            }

            self.table
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .preloaded
                .insert(group.clone());
            self.notify_group_loaded(group);
        }
        Ok(())
    }

    pub fn is_preloaded(&self, group: &str) -> bool {
        self.table
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .preloaded
            .contains(group)
    }

    /// Drop every lookup table, preload mark and cached resolution, so the
    /// next preload reads the backends again.
    pub fn reset(&self) {
        let mut table = self.table.write().unwrap_or_else(PoisonError::into_inner);
        table.groups.clear();
        table.preloaded.clear();
        drop(table);
        self.cache.clear();
    }

    fn commit(&self, group: &str, locale: &str, records: KeyTable) {
        if records.is_empty() {
            return;
        }
        tracing::debug!(group, locale, keys = records.len(), "committing translations");
        let mut table = self.table.write().unwrap_or_else(PoisonError::into_inner);
        let keys = table
            .groups
            .entry(group.to_string())
            .or_default()
            .entry(locale.to_string())
            .or_default();
        for (key, record) in records {
            keys.entry(key).or_insert(record);
        }
    }

    fn notify_group_loaded(&self, group: &str) {
        let observers = self
            .group_observers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(group)
            .cloned()
            .unwrap_or_default();
        for observer in observers {
            observer(self, group);
        }
    }

    // =========================================================================
    // Contexts
    // =========================================================================

    /// Context for `lang`, falling back to the registry's default locale and
    /// then to [`ANY_LOCALE`].
    pub fn context(self: &Arc<Self>, lang: &str) -> Context {
        let default = self.registry.default_locale().to_string();
        self.context_with_default(lang, &default)
    }

    pub fn context_with_default(self: &Arc<Self>, lang: &str, default: &str) -> Context {
        let lang = canonical_locale(lang);
        let default = canonical_locale(default);

        let mut locales = vec![lang.clone()];
        if !default.is_empty() && default != lang && default != ANY_LOCALE {
            locales.push(default);
        }
        if lang != ANY_LOCALE {
            locales.push(ANY_LOCALE.to_string());
        }

        let callbacks = self
            .context_callbacks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        callbacks
            .iter()
            .fold(Context::new(Arc::clone(self), locales), |context, callback| {
                callback(context)
            })
    }

    // =========================================================================
    // Resolution
    // =========================================================================

    /// Resolve one hop of `request` against the lookup tables.
    ///
    /// Alias records are reported through [`Resolution::alias`] without
    /// being followed.
    pub fn translate(&self, request: &Request<'_>) -> Resolution {
        let key = request.key();
        let Some((locale, record)) = self.find(key.group(), key.name(), request.context().locales())
        else {
            let mut resolution = Resolution::default();
            if request.is_template() {
                match request.evaluate_default(true) {
                    Ok(value) => resolution.value = Some(value),
                    Err(error) => resolution.error = Some(error),
                }
            }
            return resolution;
        };

        let mut resolution = Resolution {
            locale: Some(locale),
            ..Resolution::default()
        };
        let outcome = match record.content() {
            RecordContent::Alias(target) => {
                resolution.alias = Some(if target.starts_with('.') {
                    format!("{}{target}", key.group())
                } else {
                    target.clone()
                });
                Ok(None)
            }
            RecordContent::Plural(plural) => {
                let case = if let Some(count) = request.count_value() {
                    Ok(plural.find(count))
                } else if key.is_singular() {
                    Ok(plural.singular_value())
                } else if key.is_plural() {
                    Ok(plural.plural_value())
                } else {
                    Err(TranslateError::AmbiguousPlural {
                        key: key.key().to_string(),
                    })
                };
                case.and_then(|case| match case {
                    Some(CaseValue::Text(text)) => Ok(Some(text.clone())),
                    Some(CaseValue::Template(template)) => render(template, &request.scope())
                        .map(Some)
                        .map_err(|source| template_error(request, source)),
                    None => Ok(None),
                })
            }
            RecordContent::Template(template) => render(template, &request.scope())
                .map(Some)
                .map_err(|source| template_error(request, source)),
            RecordContent::Text(text) if !request.is_template() => Ok(Some(text.clone())),
            RecordContent::Text(_) => match record.as_template() {
                Some(Ok(template)) => render(template, &request.scope())
                    .map(Some)
                    .map_err(|source| template_error(request, source)),
                Some(Err(source)) => Err(template_error(request, source)),
                None => Ok(None),
            },
        };

        match outcome {
            Ok(value) => resolution.value = value,
            Err(error) => resolution.error = Some(error),
        }
        resolution.record = Some(record);
        resolution
    }

    fn find(
        &self,
        group: &str,
        name: &str,
        locales: &[String],
    ) -> Option<(String, Arc<TranslationRecord>)> {
        let table = self.table.read().unwrap_or_else(PoisonError::into_inner);
        let by_locale = table.groups.get(group)?;
        locales.iter().find_map(|locale| {
            by_locale
                .get(locale)
                .and_then(|keys| keys.get(name))
                .map(|record| (locale.clone(), Arc::clone(record)))
        })
    }

    // =========================================================================
    // Inspection
    // =========================================================================

    /// Names of every group with at least one loaded locale.
    pub fn groups(&self) -> Vec<String> {
        let table = self.table.read().unwrap_or_else(PoisonError::into_inner);
        table.groups.keys().cloned().collect()
    }

    /// Locales loaded for `group`.
    pub fn locales(&self, group: &str) -> Vec<String> {
        let table = self.table.read().unwrap_or_else(PoisonError::into_inner);
        table
            .groups
            .get(group)
            .map(|locales| locales.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Keys (inside the group) loaded for `group` in `locale`.
    pub fn keys(&self, group: &str, locale: &str) -> Vec<String> {
        let table = self.table.read().unwrap_or_else(PoisonError::into_inner);
        table
            .groups
            .get(group)
            .and_then(|locales| locales.get(locale))
            .map(|keys| keys.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// The record stored for `name` in one (group, locale) table, without
    /// fallback.
    pub fn lookup(&self, group: &str, locale: &str, name: &str) -> Option<Arc<TranslationRecord>> {
        self.find(group, name, &[locale.to_string()])
            .map(|(_, record)| record)
    }

    /// Keys of `group` in `locale` close to `name`, for "did you mean" hints.
    pub fn suggest(&self, group: &str, locale: &str, name: &str) -> Vec<String> {
        compute_suggestions(name, &self.keys(group, locale))
    }

    /// Serializable copy of every lookup table.
    pub fn snapshot(&self) -> Snapshot {
        let table = self.table.read().unwrap_or_else(PoisonError::into_inner);
        let groups = table
            .groups
            .iter()
            .map(|(group, locales)| {
                let locales = locales
                    .iter()
                    .map(|(locale, keys)| {
                        let keys = keys
                            .iter()
                            .map(|(key, record)| (key.clone(), record.view()))
                            .collect();
                        (locale.clone(), keys)
                    })
                    .collect();
                (group.clone(), locales)
            })
            .collect();
        Snapshot { groups }
    }
}

/// Serializable dump of the lookup tables: group -> locale -> key -> record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Snapshot {
    pub groups: BTreeMap<String, BTreeMap<String, BTreeMap<String, RecordView>>>,
}

/// Merge every backend's tree for one (group, locale) and flatten it.
fn load_group(
    backends: &[Arc<dyn Backend>],
    locale: &str,
    group: &str,
) -> Result<KeyTable, LoadError> {
    let mut tree = Tree::new();
    for backend in backends {
        let loaded =
            backend
                .load_translations(locale, group)
                .map_err(|source| LoadError::Backend {
                    group: group.to_string(),
                    locale: locale.to_string(),
                    backend: backend.name().to_string(),
                    source,
                })?;
        tree.merge(&loaded);
    }
    Ok(tree.flatten())
}

fn template_error(request: &Request<'_>, source: TemplateError) -> TranslateError {
    TranslateError::Template {
        key: request.key().key().to_string(),
        source,
    }
}
