//! Integration tests for request resolution

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use i18nmod::{
    Context, DefaultValue, Resolution, TranslateError, Translator, Value, YamlBackend, cached,
    data, parse_template,
};

const SHOP_EN: &str = r#"
title: Shop
welcome~: "Welcome, {{ name }}"
broken~: "Hi {{ missing }}"
cart:
  items*:
    s: one item
    p: many items
    0: no items
    ">4~": "{{ count }} items, a lot"
  label: Cart
  short@: .cart.label
  absolute@: other.thing
raw: "{{ name }} literally"
"#;

const OTHER_EN: &str = "thing: Other thing\n";
const SHOP_FR: &str = "title: Boutique\n";

fn translator() -> Arc<Translator> {
    let mut backend = YamlBackend::new();
    backend
        .add_input("shop", "en", "shop.en", SHOP_EN)
        .add_input("shop", "fr-FR", "shop.fr", SHOP_FR)
        .add_input("other", "en", "other.en", OTHER_EN);

    let translator = Arc::new(Translator::new());
    translator.add_backend(backend);
    translator.preload_all().unwrap();
    translator
}

fn context(locales: &[&str]) -> Context {
    Context::new(
        translator(),
        locales.iter().map(ToString::to_string).collect(),
    )
}

// =============================================================================
// Locale fallback
// =============================================================================

#[test]
fn test_locale_fallback_order() {
    let context = context(&["fr-FR", "en"]);
    assert_eq!(context.t("shop.title").get(), "Boutique");
    assert_eq!(context.t("shop.cart.label").get(), "Cart");

    let resolution = context.t("shop.cart.label").resolve();
    assert_eq!(resolution.locale(), Some("en"));
    assert!(resolution.is_found());
}

#[test]
fn test_first_locale_wins() {
    let context = context(&["en", "fr-FR"]);
    assert_eq!(context.t("shop.title").get(), "Shop");
}

#[test]
fn test_unknown_locale_and_group() {
    let context = context(&["de"]);
    assert_eq!(context.t("shop.title").get(), "shop.title");
    assert_eq!(context.t("nope.title").get(), "nope.title");
}

// =============================================================================
// Defaults
// =============================================================================

#[test]
fn test_missing_key_defaults_to_raw_key() {
    let context = context(&["en"]);
    assert_eq!(context.t("shop.missing+").get(), "shop.missing+");
    let resolution = context.t("shop.missing").resolve();
    assert!(!resolution.is_found());
    assert!(resolution.value().is_none());
    assert!(resolution.error().is_none());
}

#[test]
fn test_literal_default() {
    let context = context(&["en"]);
    assert_eq!(context.t("shop.missing").default("Fallback").get(), "Fallback");
    assert_eq!(context.t("shop.title").default("Fallback").get(), "Shop");
}

#[test]
fn test_lazy_default_only_called_on_miss() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let lazy = DefaultValue::lazy(move || {
        counter.fetch_add(1, Ordering::SeqCst);
        "lazy".to_string()
    });

    let context = context(&["en"]);
    assert_eq!(context.t("shop.title").default(lazy.clone()).get(), "Shop");
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(context.t("shop.missing").default(lazy).get(), "lazy");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_context_default() {
    let context = context(&["fr-FR", "en"]);
    let default = DefaultValue::with_context(|context: &Context| context.locales().join("|"));
    assert_eq!(context.t("shop.missing").default(default).get(), "fr-FR|en");
}

#[test]
fn test_template_default() {
    let context = context(&["en"]);
    let text = context
        .tt("shop.missing")
        .default("Hello, {{ name }}")
        .param("name", "Ana")
        .get();
    assert_eq!(text, "Hello, Ana");
}

#[test]
fn test_pre_parsed_template_default() {
    let context = context(&["en"]);
    let template = parse_template("{{ n }} left").unwrap();
    let text = context
        .t("shop.missing")
        .default(template)
        .param("n", 3)
        .get();
    assert_eq!(text, "3 left");
}

#[test]
fn test_lazy_default_as_template() {
    let context = context(&["en"]);
    let text = context
        .tt("shop.missing")
        .default(DefaultValue::lazy(|| "{{ who }}!".to_string()))
        .param("who", "you")
        .get();
    assert_eq!(text, "you!");
}

#[test]
fn test_broken_template_default_is_error() {
    let context = context(&["en"]);
    let resolution = context.tt("shop.missing").default("{{ nobody }}").resolve();
    assert!(matches!(
        resolution.error(),
        Some(TranslateError::Template { key, .. }) if key == "shop.missing"
    ));
    assert!(!resolution.is_found());
}

#[test]
fn test_non_template_default_is_verbatim() {
    let context = context(&["en"]);
    assert_eq!(
        context.t("shop.missing").default("{{ name }}").get(),
        "{{ name }}"
    );
}

// =============================================================================
// Templates
// =============================================================================

#[test]
fn test_template_record() {
    let context = context(&["en"]);
    let text = context
        .t("shop.welcome")
        .data(data! { "name" => "Bruno" })
        .get();
    assert_eq!(text, "Welcome, Bruno");
}

#[test]
fn test_template_record_error() {
    let context = context(&["en"]);
    let resolution = context.t("shop.broken").resolve();
    assert!(resolution.is_found());
    assert!(matches!(
        resolution.error(),
        Some(TranslateError::Template { key, .. }) if key == "shop.broken"
    ));
    insta::assert_snapshot!(
        context.t("shop.broken").get(),
        @r#"ERROR: template error in 'shop.broken': unknown reference 'missing' in template "Hi {{ missing }}""#
    );
}

#[test]
fn test_plain_text_rendered_only_as_template() {
    let context = context(&["en"]);
    assert_eq!(context.t("shop.raw").get(), "{{ name }} literally");
    assert_eq!(
        context.tt("shop.raw").param("name", "Ana").get(),
        "Ana literally"
    );
}

#[test]
fn test_context_funcs_in_templates() {
    let context = context(&["en"]).with_func("name", || Value::from("Context"));
    assert_eq!(context.t("shop.welcome").get(), "Welcome, Context");

    let text = context
        .t("shop.welcome")
        .func("name", || Value::from("Request"))
        .get();
    assert_eq!(text, "Welcome, Request");
}

// =============================================================================
// Plurals
// =============================================================================

#[test]
fn test_plural_by_count() {
    let context = context(&["en"]);
    assert_eq!(context.t("shop.cart.items").count(0).get(), "no items");
    assert_eq!(context.t("shop.cart.items").count(1).get(), "one item");
    assert_eq!(context.t("shop.cart.items").count(3).get(), "many items");
    assert_eq!(
        context.t("shop.cart.items").count(42).get(),
        "42 items, a lot"
    );
}

#[test]
fn test_plural_by_modifier() {
    let context = context(&["en"]);
    assert_eq!(context.t("shop.cart.items+").get(), "many items");
    assert_eq!(context.t("shop.cart.items~p").get(), "many items");
    assert_eq!(context.t("shop.cart.items-").get(), "one item");
    assert_eq!(context.t("shop.cart.items").singular().get(), "one item");
    assert_eq!(context.t("shop.cart.items").plural(1).get(), "one item");
}

#[test]
fn test_ambiguous_plural() {
    let context = context(&["en"]);
    let resolution = context.t("shop.cart.items").resolve();
    assert_eq!(
        resolution.error(),
        Some(&TranslateError::AmbiguousPlural {
            key: "shop.cart.items".to_string()
        })
    );
    assert!(context.t("shop.cart.items").get().starts_with("ERROR: "));
}

// =============================================================================
// Aliases
// =============================================================================

#[test]
fn test_relative_alias() {
    let context = context(&["en"]);
    assert_eq!(context.t("shop.cart.short").get(), "Cart");
}

#[test]
fn test_cross_group_alias() {
    let context = context(&["en"]);
    assert_eq!(context.t("shop.cart.absolute").get(), "Other thing");
}

#[test]
fn test_handle_reports_alias_without_following() {
    let context = context(&["en"]);
    let request = context.t("shop.cart.short");
    let resolution = context.handle(&request);
    assert_eq!(resolution.alias(), Some("shop.cart.label"));
    assert!(resolution.value().is_none());
}

fn alias_chain(length: usize) -> Arc<Translator> {
    let mut yaml = String::new();
    for i in 0..length {
        yaml.push_str(&format!("k{i}@: .k{}\n", i + 1));
    }
    yaml.push_str(&format!("k{length}: end\n"));

    let mut backend = YamlBackend::new();
    backend.add_input("chain", "en", "chain", &yaml);
    let translator = Arc::new(Translator::new());
    translator.add_backend(backend);
    translator.preload_all().unwrap();
    translator
}

#[test]
fn test_alias_chain_within_bound() {
    for length in [1, 4, 5] {
        let context = alias_chain(length).context("en");
        assert_eq!(context.t("chain.k0").get(), "end", "chain of {length}");
    }
}

#[test]
fn test_alias_chain_beyond_bound() {
    let context = alias_chain(6).context("en");
    let resolution = context.t("chain.k0").resolve();
    match resolution.error() {
        Some(TranslateError::TooManyHops { max, chain }) => {
            assert_eq!(*max, 5);
            assert_eq!(chain.first().map(String::as_str), Some("chain.k0"));
            assert_eq!(chain.len(), 7);
        }
        other => panic!("expected too many hops, got {other:?}"),
    }
    assert!(context.t("chain.k0").get().starts_with("ERROR: too many alias hops"));
}

#[test]
fn test_alias_cycle_terminates() {
    let mut backend = YamlBackend::new();
    backend.add_input("loop", "en", "loop", "a@: .b\nb@: .a\n");
    let translator = Arc::new(Translator::new());
    translator.add_backend(backend);
    translator.preload_all().unwrap();

    let resolution = translator.context("en").t("loop.a").resolve();
    assert!(matches!(
        resolution.error(),
        Some(TranslateError::TooManyHops { .. })
    ));
}

#[test]
fn test_custom_hop_bound() {
    let mut backend = YamlBackend::new();
    backend.add_input("c", "en", "c", "a@: .b\nb@: .c\nc: end\n");
    let translator = Arc::new(Translator::builder().max_alias_hops(1).build());
    translator.add_backend(backend);
    translator.preload_all().unwrap();

    let context = translator.context("en");
    assert_eq!(context.t("c.b").get(), "end");
    assert!(context.t("c.a").get().starts_with("ERROR: "));
}

#[test]
fn test_alias_to_plural_keeps_modifier() {
    let mut backend = YamlBackend::new();
    backend.add_input(
        "p",
        "en",
        "p",
        "items*:\n  s: item\n  p: items\nthings@: .items\n",
    );
    let translator = Arc::new(Translator::new());
    translator.add_backend(backend);
    translator.preload_all().unwrap();

    let context = translator.context("en");
    assert_eq!(context.t("p.things+").get(), "items");
    assert_eq!(context.t("p.things-").get(), "item");
    assert_eq!(context.t("p.things").count(5).get(), "items");
}

#[test]
fn test_alias_to_missing_key_defaults_to_target() {
    let mut backend = YamlBackend::new();
    backend.add_input("a", "en", "a", "dangling@: .nowhere\n");
    let translator = Arc::new(Translator::new());
    translator.add_backend(backend);
    translator.preload_all().unwrap();

    let context = translator.context("en");
    assert_eq!(context.t("a.dangling").get(), "a.nowhere");
    assert_eq!(context.t("a.dangling").default("fixed").get(), "fixed");
}

#[test]
fn test_with_redirects_request() {
    let context = context(&["en"]);
    assert_eq!(context.t("shop.missing").with("shop.title").get(), "Shop");
    assert_eq!(
        context.t("shop.missing").with("shop.gone").get(),
        "shop.gone"
    );
    assert_eq!(
        context
            .t("shop.missing")
            .default("kept")
            .with("shop.gone")
            .get(),
        "kept"
    );
}

#[test]
fn test_with_does_not_consume_alias_hops() {
    let context = alias_chain(5).context("en");
    assert_eq!(context.t("chain.start").with("chain.k0").get(), "end");

    let resolution = context
        .t("chain.a")
        .with("chain.b")
        .with("chain.k0")
        .resolve();
    assert_eq!(resolution.value(), Some("end"));
}

#[test]
fn test_resolve_and_get_resolves_once() {
    let (context, lookups) = counting(context(&["en"]));
    let (resolution, text) = context.t("shop.cart.short").resolve_and_get();

    assert_eq!(text, "Cart");
    assert_eq!(resolution.value(), Some("Cart"));
    assert_eq!(lookups.load(Ordering::SeqCst), 2);

    let (resolution, text) = context.t("shop.gone").default("fallback").resolve_and_get();
    assert_eq!(text, "fallback");
    assert!(!resolution.is_found());
}

// =============================================================================
// Cache
// =============================================================================

fn counting(context: Context) -> (Context, Arc<AtomicUsize>) {
    let lookups = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&lookups);
    let context = context.with_found_hook(move |_, _| {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    (context, lookups)
}

#[test]
fn test_non_cacheable_key_resolves_every_time() {
    let (context, lookups) = counting(context(&["en"]));
    let first = context.t("shop.title").resolve();
    let second = context.t("shop.title").resolve();

    assert_eq!(lookups.load(Ordering::SeqCst), 2);
    assert!(!Arc::ptr_eq(&first, &second));
    assert!(context.translator().cache().is_empty());
}

#[test]
fn test_cacheable_key_resolves_once() {
    let (context, lookups) = counting(context(&["en"]));
    let key = cached("shop.title");
    let first = context.t(&key).resolve();
    let second = context.t(&key).resolve();

    assert_eq!(lookups.load(Ordering::SeqCst), 1);
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(second.value(), Some("Shop"));
    assert_eq!(context.translator().cache().len(), 1);
}

#[test]
fn test_cache_is_scoped_by_locales() {
    let translator = translator();
    let en = Context::new(Arc::clone(&translator), vec!["en".to_string()]);
    let fr = Context::new(Arc::clone(&translator), vec!["fr-FR".to_string()]);

    assert_eq!(en.t("^shop.title").get(), "Shop");
    assert_eq!(fr.t("^shop.title").get(), "Boutique");
    assert_eq!(translator.cache().len(), 2);
}

#[test]
fn test_allow_listed_key_is_cached() {
    let (context, lookups) = counting(context(&["en"]));
    context.translator().cache().allow("shop.title");

    context.t("shop.title").get();
    context.t("shop.title").get();
    assert_eq!(lookups.load(Ordering::SeqCst), 1);

    context.translator().cache().clear();
    context.t("shop.title").get();
    assert_eq!(lookups.load(Ordering::SeqCst), 2);
}

#[test]
fn test_cached_plural_varies_by_count() {
    let (context, lookups) = counting(context(&["en"]));
    assert_eq!(context.t("^shop.cart.items").count(1).get(), "one item");
    assert_eq!(context.t("^shop.cart.items").count(5).get(), "5 items, a lot");
    assert_eq!(context.t("^shop.cart.items").count(1).get(), "one item");

    assert_eq!(lookups.load(Ordering::SeqCst), 2);
    assert_eq!(context.translator().cache().len(), 2);
}

#[test]
fn test_cached_template_varies_by_data() {
    let (context, lookups) = counting(context(&["en"]));
    let greet = |name: &str| context.t("^shop.welcome").param("name", name).get();
    assert_eq!(greet("Ana"), "Welcome, Ana");
    assert_eq!(greet("Bob"), "Welcome, Bob");
    assert_eq!(greet("Ana"), "Welcome, Ana");

    assert_eq!(lookups.load(Ordering::SeqCst), 2);
}

#[test]
fn test_request_funcs_bypass_cache() {
    let context = context(&["en"]);
    let text = context
        .t("^shop.welcome")
        .func("name", || Value::from("Fn"))
        .get();
    assert_eq!(text, "Welcome, Fn");
    assert!(context.translator().cache().is_empty());
}

#[test]
fn test_misses_are_not_cached() {
    let context = context(&["en"]);
    context.t("^shop.missing").get();
    assert!(context.translator().cache().is_empty());
}

// =============================================================================
// Handlers and hooks
// =============================================================================

#[test]
fn test_handler_short_circuits() {
    let context = context(&["en"]).with_handler(|next, request| {
        if request.key().key() == "shop.title" {
            return Arc::new(Resolution::from_value("Intercepted"));
        }
        next.run(request)
    });

    assert_eq!(context.t("shop.title").get(), "Intercepted");
    assert_eq!(context.t("shop.cart.label").get(), "Cart");
}

#[test]
fn test_handler_post_processes() {
    let context = context(&["en"]).with_handler(|next, request| {
        let resolution = next.run(request);
        let Some(value) = resolution.value().map(str::to_uppercase) else {
            return resolution;
        };
        Arc::new(Resolution::from_value(value))
    });
    assert_eq!(context.t("shop.title").get(), "SHOP");
}

#[test]
fn test_outermost_handler_runs_first() {
    let context = context(&["en"])
        .with_handler(|next, request| {
            let resolution = next.run(request);
            let value = format!("{}-inner", resolution.value().unwrap_or_default());
            Arc::new(Resolution::from_value(value))
        })
        .with_handler(|next, request| {
            let resolution = next.run(request);
            let value = format!("{}-outer", resolution.value().unwrap_or_default());
            Arc::new(Resolution::from_value(value))
        });
    assert_eq!(context.t("shop.title").get(), "Shop-inner-outer");
}

#[test]
fn test_handlers_see_alias_hops() {
    let seen = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&seen);
    let context = context(&["en"]).with_handler(move |next, request| {
        counter.fetch_add(1, Ordering::SeqCst);
        next.run(request)
    });

    assert_eq!(context.t("shop.cart.short").get(), "Cart");
    assert_eq!(seen.load(Ordering::SeqCst), 2);
}

#[test]
fn test_found_and_not_found_hooks() {
    let found = Arc::new(AtomicUsize::new(0));
    let missed = Arc::new(AtomicUsize::new(0));
    let (f, m) = (Arc::clone(&found), Arc::clone(&missed));
    let context = context(&["en"])
        .with_found_hook(move |_, resolution| {
            assert!(resolution.record().is_some());
            f.fetch_add(1, Ordering::SeqCst);
        })
        .with_not_found_hook(move |request| {
            assert_eq!(request.key().key(), "shop.missing");
            m.fetch_add(1, Ordering::SeqCst);
        });

    context.t("shop.title").get();
    context.t("shop.missing").get();
    context.t("shop.cart.items").get();

    assert_eq!(found.load(Ordering::SeqCst), 2);
    assert_eq!(missed.load(Ordering::SeqCst), 1);
}

#[test]
fn test_hooks_do_not_change_result() {
    let context = context(&["en"])
        .with_found_hook(|_, _| {})
        .with_not_found_hook(|_| {});
    assert_eq!(context.t("shop.title").get(), "Shop");
    assert_eq!(context.t("shop.missing").get(), "shop.missing");
}

#[test]
fn test_contexts_are_independent() {
    let base = context(&["en"]);
    let extended = base
        .clone()
        .with_handler(|_, _| Arc::new(Resolution::from_value("x")));

    assert_eq!(base.t("shop.title").get(), "Shop");
    assert_eq!(extended.t("shop.title").get(), "x");
}
