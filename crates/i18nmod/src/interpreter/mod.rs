//! Translation resolution.
//!
//! This module holds the resolution engine: the translator and its locale
//! lookup tables, resolution contexts and their handler stacks, requests,
//! plural case matching, the selective cache and template rendering.

mod cache;
mod context;
mod error;
mod evaluator;
mod handler;
mod plural;
mod registry;
mod request;
mod translator;

pub use cache::Cache;
pub use context::Context;
pub use error::{LoadError, TranslateError, compute_suggestions};
pub use evaluator::{Funcs, Scope, TemplateData, TemplateFn, render};
pub use handler::{FoundHook, Handler, HandlerFn, Next, NotFoundHook};
pub use plural::{CaseKey, CaseValue, ComparativeCase, Comparison, Plural};
pub use registry::{LocaleInfo, Registry, canonical_locale, is_locale_tag};
pub use request::{Request, Resolution};
pub use translator::{
    ANY_LOCALE, ContextCallback, DEFAULT_MAX_ALIAS_HOPS, GroupObserver, Snapshot, Translator,
};
