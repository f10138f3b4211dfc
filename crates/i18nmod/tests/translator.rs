//! Integration tests for preloading and inspecting translators

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use i18nmod::{
    Backend, BackendError, DEFAULT_MAX_ALIAS_HOPS, LoadError, MemoryBackend, RecordContent,
    Registry, TranslationRecord, Translator, Value, YamlBackend, compute_suggestions,
    parse_template,
};

fn text(group: &str, locale: &str, key: &str, value: &str) -> TranslationRecord {
    TranslationRecord::builder()
        .group(group)
        .locale(locale)
        .key(key)
        .content(RecordContent::Text(value.to_string()))
        .build()
}

fn menu_backend() -> MemoryBackend {
    let backend = MemoryBackend::new();
    backend.insert(text("menu", "en", "open", "Open"));
    backend.insert(text("menu", "en", "close", "Close"));
    backend.insert(text("menu", "de", "open", "Öffnen"));
    backend.insert(text("help", "en", "about", "About"));
    backend
}

fn translator_with(backend: impl Backend + 'static) -> Arc<Translator> {
    let translator = Arc::new(Translator::new());
    translator.add_backend(backend);
    translator
}

// =============================================================================
// Preloading
// =============================================================================

#[test]
fn test_preload_all() {
    let translator = translator_with(menu_backend());
    translator.preload_all().unwrap();

    assert!(translator.is_preloaded("menu"));
    assert!(translator.is_preloaded("help"));
    assert_eq!(translator.groups(), vec!["help", "menu"]);
    assert_eq!(translator.locales("menu"), vec!["de", "en"]);
}

#[test]
fn test_preload_selected_locales_and_groups() {
    let translator = translator_with(menu_backend());
    translator.preload(&["en"], &["menu"]).unwrap();

    assert!(translator.is_preloaded("menu"));
    assert!(!translator.is_preloaded("help"));
    assert_eq!(translator.locales("menu"), vec!["en"]);
    assert_eq!(translator.context("de").t("menu.open").get(), "Open");
}

#[test]
fn test_preload_is_idempotent() {
    let backend = menu_backend();
    let handle = backend.clone();
    let translator = translator_with(backend);
    translator.preload_all().unwrap();

    handle.insert(text("menu", "en", "save", "Save"));
    translator.preload_all().unwrap();
    assert_eq!(translator.context("en").t("menu.save").get(), "menu.save");

    translator.reset();
    assert!(!translator.is_preloaded("menu"));
    translator.preload_all().unwrap();
    assert_eq!(translator.context("en").t("menu.save").get(), "Save");
}

#[test]
fn test_saved_and_deleted_records_show_after_reset() {
    let backend = menu_backend();
    let handle = backend.clone();
    let translator = translator_with(backend);
    translator.preload_all().unwrap();
    let context = translator.context("en");

    handle.save_translation(&text("menu", "en", "open", "Open file")).unwrap();
    handle.delete_translation(&text("menu", "en", "close", "Close")).unwrap();
    translator.preload(&["en"], &["menu"]).unwrap();
    assert_eq!(context.t("menu.open").get(), "Open");
    assert_eq!(context.t("menu.close").get(), "Close");

    translator.reset();
    translator.preload(&["en"], &["menu"]).unwrap();
    assert_eq!(context.t("menu.open").get(), "Open file");
    assert_eq!(context.t("menu.close").get(), "menu.close");
}

#[test]
fn test_reset_clears_cache() {
    let translator = translator_with(menu_backend());
    translator.preload_all().unwrap();
    translator.context("en").t("^menu.open").get();
    assert_eq!(translator.cache().len(), 1);

    translator.reset();
    assert!(translator.cache().is_empty());
    assert!(translator.groups().is_empty());
}

#[test]
fn test_first_backend_wins() {
    let first = MemoryBackend::new();
    first.insert(text("menu", "en", "open", "First"));
    let second = MemoryBackend::new();
    second.insert(text("menu", "en", "open", "Second"));
    second.insert(text("menu", "en", "quit", "Quit"));

    let translator = Arc::new(Translator::new());
    translator.add_backend(first);
    translator.add_shared_backend(Arc::new(second));
    translator.preload_all().unwrap();

    let context = translator.context("en");
    assert_eq!(context.t("menu.open").get(), "First");
    assert_eq!(context.t("menu.quit").get(), "Quit");
}

#[test]
fn test_load_error_keeps_committed_tables() {
    let mut backend = YamlBackend::new();
    backend
        .add_input("a", "en", "a.en", "x: A\n")
        .add_input("b", "en", "b.en", "x: B\n")
        .add_input("b", "fr", "b.fr", "x:\n  - broken\n");
    let translator = translator_with(backend);

    let err = translator.preload_all().unwrap_err();
    let LoadError::Backend {
        group,
        locale,
        backend,
        source,
    } = &err;
    assert_eq!(group, "b");
    assert_eq!(locale, "fr");
    assert_eq!(backend, "yaml");
    assert!(matches!(source, BackendError::InvalidValue { .. }), "{source:?}");

    assert!(translator.is_preloaded("a"));
    assert!(!translator.is_preloaded("b"));
    assert_eq!(translator.context("en").t("b.x").get(), "B");
}

#[test]
fn test_group_observer_fires_once() {
    let translator = translator_with(menu_backend());
    let loaded = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&loaded);
    translator.on_group_loaded("menu", move |translator, group| {
        assert_eq!(group, "menu");
        assert!(translator.is_preloaded(group));
        counter.fetch_add(1, Ordering::SeqCst);
    });

    translator.preload_all().unwrap();
    translator.preload_all().unwrap();
    assert_eq!(loaded.load(Ordering::SeqCst), 1);
}

// =============================================================================
// Contexts
// =============================================================================

#[test]
fn test_context_locale_lists() {
    let translator = translator_with(MemoryBackend::new());
    assert_eq!(translator.context("pt_br").locales(), ["pt-BR", "en", "_"]);
    assert_eq!(translator.context("en").locales(), ["en", "_"]);
    assert_eq!(translator.context("_").locales(), ["_"]);
    assert_eq!(
        translator.context_with_default("fr", "de").locales(),
        ["fr", "de", "_"]
    );
}

#[test]
fn test_registry_default_locale() {
    let translator = Arc::new(
        Translator::builder()
            .registry(Registry::builder().default_locale("de").build())
            .build(),
    );
    translator.add_backend(menu_backend());
    translator.preload_all().unwrap();

    assert_eq!(translator.context("fr").locales(), ["fr", "de", "_"]);
    assert_eq!(translator.context("fr").t("menu.open").get(), "Öffnen");
}

#[test]
fn test_context_callbacks() {
    let backend = MemoryBackend::new();
    backend.insert(
        TranslationRecord::builder()
            .group("site")
            .locale("en")
            .key("footer")
            .content(RecordContent::Template(
                parse_template("© {{ company }}").unwrap(),
            ))
            .build(),
    );
    let translator = translator_with(backend);
    translator.preload_all().unwrap();
    translator.on_context_create(|context| context.with_func("company", || Value::from("ACME")));

    assert_eq!(translator.context("en").t("site.footer").get(), "© ACME");
}

#[test]
fn test_builder_hop_bound() {
    let translator = Translator::builder().max_alias_hops(2).build();
    assert_eq!(translator.max_alias_hops(), 2);
    assert_eq!(Translator::new().max_alias_hops(), DEFAULT_MAX_ALIAS_HOPS);
}

// =============================================================================
// Inspection
// =============================================================================

#[test]
fn test_keys_and_lookup() {
    let translator = translator_with(menu_backend());
    translator.preload_all().unwrap();

    assert_eq!(translator.keys("menu", "en"), vec!["close", "open"]);
    assert!(translator.keys("menu", "fr").is_empty());
    assert_eq!(
        translator.lookup("menu", "de", "open").unwrap().text(),
        Some("Öffnen")
    );
    assert!(translator.lookup("menu", "de", "close").is_none());
}

#[test]
fn test_suggest() {
    let translator = translator_with(menu_backend());
    translator.preload_all().unwrap();
    assert_eq!(translator.suggest("menu", "en", "opne"), vec!["open"]);
    assert!(translator.suggest("menu", "en", "zzzzzz").is_empty());
}

#[test]
fn test_compute_suggestions() {
    let available = vec![
        "card".to_string(),
        "cart".to_string(),
        "chart".to_string(),
        "checkout".to_string(),
    ];
    assert_eq!(compute_suggestions("cart", &available), vec!["card", "chart"]);
    assert_eq!(compute_suggestions("car", &available), vec!["card", "cart"]);
    assert!(compute_suggestions("xyz", &available).is_empty());
}

#[test]
fn test_snapshot_serializes_tables() {
    let backend = MemoryBackend::new();
    backend.insert(text("menu", "en", "open", "Open"));
    backend.insert(
        TranslationRecord::builder()
            .group("menu")
            .locale("en")
            .key("start")
            .content(RecordContent::Alias(".open".to_string()))
            .build(),
    );
    let translator = translator_with(backend);
    translator.preload_all().unwrap();

    let json = serde_json::to_value(translator.snapshot()).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "menu": {
                "en": {
                    "open": { "kind": "text", "value": "Open" },
                    "start": { "kind": "alias", "target": ".open" },
                }
            }
        })
    );
}

// =============================================================================
// Memory backend
// =============================================================================

#[test]
fn test_memory_save_and_delete() {
    let backend = MemoryBackend::new();
    let record = text("menu", "en", "open", "Open");

    backend.save_translation(&record).unwrap();
    assert_eq!(backend.len(), 1);
    assert_eq!(backend.get("menu", "en", "open"), Some(record.clone()));
    assert_eq!(backend.list_groups(), vec!["menu"]);
    assert_eq!(backend.list_languages(), vec!["en"]);

    backend.delete_translation(&record).unwrap();
    assert!(backend.is_empty());
    assert!(backend.load_translations("en", "menu").unwrap().is_empty());
}

#[test]
fn test_memory_rejects_incomplete_records() {
    let backend = MemoryBackend::new();
    let record = TranslationRecord::builder()
        .key("orphan")
        .content(RecordContent::Text("x".to_string()))
        .build();

    assert!(matches!(
        backend.save_translation(&record),
        Err(BackendError::IncompleteRecord { key }) if key == "orphan"
    ));
}

#[test]
fn test_memory_load_builds_tree() {
    let backend = MemoryBackend::new();
    backend.insert(text("g", "en", "a.b", "ab"));
    backend.insert(text("g", "en", "a.c", "ac"));
    let tree = backend.load_translations("en", "g").unwrap();
    assert_eq!(tree.get("a.b").unwrap().text(), Some("ab"));
    assert_eq!(tree.flatten().len(), 2);
}

// =============================================================================
// Registry
// =============================================================================

#[test]
fn test_registry_locales() {
    let mut registry = Registry::new();
    assert_eq!(registry.default_locale(), "en");
    registry.set_default_locale("PT_br");
    assert_eq!(registry.default_locale(), "pt-BR");

    registry.register_locale("de", None);
    registry.register_locale("DE", Some("Deutsch"));
    assert_eq!(registry.locales().len(), 1);
    assert_eq!(
        registry.locale_info("de").and_then(|info| info.name.as_deref()),
        Some("Deutsch")
    );

    registry.register_path("/tmp/a");
    registry.register_path("/tmp/a");
    assert_eq!(registry.asset_paths().len(), 1);
}

#[test]
fn test_canonical_locales() {
    let registry = Registry::new();
    assert_eq!(registry.canonicalize("en"), "en");
    assert_eq!(registry.canonicalize("EN_us"), "en-US");
    assert_eq!(registry.canonicalize("zh_hant_tw"), "zh-Hant-TW");
    assert_eq!(registry.canonicalize("_"), "_");
    assert_eq!(registry.canonicalize("not a locale"), "not a locale");
}

#[test]
fn test_canonical_locales_with_extensions() {
    let registry = Registry::new();
    assert_eq!(
        registry.canonicalize("en-us-u-ca-buddhist"),
        "en-US-u-ca-buddhist"
    );
    assert_eq!(registry.canonicalize("DE_at_u_co_phonebk"), "de-AT-u-co-phonebk");
    assert_eq!(registry.canonicalize("sr_latn"), "sr-Latn");
    assert_eq!(registry.canonicalize("en-x-pirate"), "en-x-pirate");
    assert_eq!(registry.canonicalize("messages"), "messages");
}
