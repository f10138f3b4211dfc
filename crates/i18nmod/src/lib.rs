//! Modular translation resolution.
//!
//! Translations are organized in groups (one per module or page), loaded
//! from pluggable backends as trees of records, and resolved per request
//! against a locale priority list:
//!
//! ```
//! use std::sync::Arc;
//! use i18nmod::{Translator, YamlBackend, data};
//!
//! let mut backend = YamlBackend::new();
//! backend.add_input("shop", "en", "shop.en", r#"
//! cart:
//!   title~: "Cart of {{ user }}"
//!   items*:
//!     s: "one item"
//!     p: "several items"
//!     0: "empty"
//! "#);
//!
//! let translator = Arc::new(Translator::new());
//! translator.add_backend(backend);
//! translator.preload_all().unwrap();
//!
//! let context = translator.context("pt-BR");
//! assert_eq!(context.t("shop.cart.title").data(data! { "user" => "Ana" }).get(), "Cart of Ana");
//! assert_eq!(context.t("shop.cart.items").count(0).get(), "empty");
//! assert_eq!(context.t("shop.cart.items+").get(), "several items");
//! assert_eq!(context.t("shop.cart.missing").get(), "shop.cart.missing");
//! ```

pub mod backend;
pub mod interpreter;
pub mod parser;
pub mod tree;
pub mod types;

pub use backend::{Backend, BackendError, MemoryBackend, YamlBackend};
pub use interpreter::{
    ANY_LOCALE, Cache, CaseKey, CaseValue, Context, DEFAULT_MAX_ALIAS_HOPS, LoadError, Next,
    Plural, Registry, Request, Resolution, Snapshot, TemplateData, TranslateError, Translator,
    compute_suggestions,
};
pub use parser::{Template, TemplateError, parse_template};
pub use tree::{NodeId, Tree, TreeError};
pub use types::{
    CACHE_SIGIL, DefaultValue, RecordContent, TranslationKey, TranslationRecord, Value, cached,
};

/// Creates a [`TemplateData`] map from key-value pairs.
///
/// Values are converted via `Into<Value>`, so integers, floats and strings
/// can be passed directly.
///
/// # Example
///
/// ```
/// use i18nmod::data;
///
/// let d = data! { "count" => 3, "name" => "Alice" };
/// assert_eq!(d.len(), 2);
/// assert_eq!(d["count"].as_number(), Some(3));
/// assert_eq!(d["name"].as_string(), Some("Alice"));
/// ```
#[macro_export]
macro_rules! data {
    {} => {
        $crate::TemplateData::new()
    };
    { $($key:expr => $value:expr),+ $(,)? } => {
        {
            let mut map = $crate::TemplateData::new();
            $(
                map.insert($key.to_string(), ::std::convert::Into::<$crate::Value>::into($value));
            )+
            map
        }
    };
}
