//! Translation requests and their resolutions.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;

use crate::interpreter::evaluator::{Funcs, Scope, TemplateData, render};
use crate::interpreter::{Context, TranslateError};
use crate::parser::parse_template;
use crate::types::{DefaultValue, TranslationKey, TranslationRecord, Value};

/// Outcome of resolving one key.
///
/// Exactly one of three things happened: a value was produced, the matched
/// record redirected to another key (`alias`), or an error was recorded.
/// When nothing matched, `record` is `None` and the request's default
/// applies.
#[derive(Debug, Default)]
pub struct Resolution {
    pub(crate) value: Option<String>,
    pub(crate) alias: Option<String>,
    pub(crate) error: Option<TranslateError>,
    pub(crate) record: Option<Arc<TranslationRecord>>,
    pub(crate) locale: Option<String>,
}

impl Resolution {
    /// A resolution carrying a finished value, for handlers that answer a
    /// request themselves.
    pub fn from_value(value: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
            ..Self::default()
        }
    }

    pub fn from_error(error: TranslateError) -> Self {
        Self {
            error: Some(error),
            ..Self::default()
        }
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// Target key when the matched record is an alias.
    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    pub fn error(&self) -> Option<&TranslateError> {
        self.error.as_ref()
    }

    /// The record that matched, if any locale supplied one.
    pub fn record(&self) -> Option<&Arc<TranslationRecord>> {
        self.record.as_ref()
    }

    /// The locale whose table supplied the record.
    pub fn locale(&self) -> Option<&str> {
        self.locale.as_deref()
    }

    pub fn is_found(&self) -> bool {
        self.record.is_some()
    }
}

/// A pending translation request, built fluently from [`Context::t`].
///
/// ```
/// # use std::sync::Arc;
/// # use i18nmod::{Translator, MemoryBackend, RecordContent, TranslationRecord};
/// # let translator = Arc::new(Translator::new());
/// # translator.add_backend(MemoryBackend::new());
/// let context = translator.context("en");
/// let text = context
///     .t("shop.missing")
///     .default("Hello, {{ name }}")
///     .param("name", "Ana")
///     .as_template()
///     .get();
/// assert_eq!(text, "Hello, Ana");
/// ```
#[derive(Clone)]
pub struct Request<'c> {
    context: &'c Context,
    key: TranslationKey,
    default: DefaultValue,
    data: TemplateData,
    count: Option<Value>,
    funcs: Funcs,
    as_template: bool,
}

impl<'c> Request<'c> {
    /// Request for `raw`; the default is the raw key itself.
    pub fn new(context: &'c Context, raw: &str) -> Self {
        Self {
            context,
            key: TranslationKey::new(raw),
            default: DefaultValue::Literal(raw.to_string()),
            data: TemplateData::new(),
            count: None,
            funcs: Funcs::new(),
            as_template: false,
        }
    }

    /// Select a plural case by count.
    pub fn count(mut self, count: impl Into<Value>) -> Self {
        self.count = Some(count.into());
        self
    }

    /// Select by count, marking the key plural.
    pub fn plural(mut self, count: impl Into<Value>) -> Self {
        self.count = Some(count.into());
        self.key = self.key.into_plural();
        self
    }

    /// Select the singular case.
    pub fn singular(mut self) -> Self {
        self.key = self.key.into_singular();
        self
    }

    /// Merge template data into the request.
    pub fn data(mut self, data: TemplateData) -> Self {
        self.data.extend(data);
        self
    }

    pub fn param(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.data.insert(name.to_string(), value.into());
        self
    }

    /// Register a template function for this request only.
    pub fn func(mut self, name: &str, f: impl Fn() -> Value + Send + Sync + 'static) -> Self {
        self.funcs.insert(name.to_string(), Arc::new(f));
        self
    }

    pub fn default(mut self, default: impl Into<DefaultValue>) -> Self {
        self.default = default.into();
        self
    }

    /// Render the default as a template when no locale matches.
    pub fn as_template(mut self) -> Self {
        self.as_template = true;
        self
    }

    /// Redirect the request to `raw`, remembering the current key.
    ///
    /// A default that still equals the current key follows the redirect.
    pub fn with(mut self, raw: &str) -> Self {
        let next = TranslationKey::parse(raw, Some(Arc::new(self.key.clone())));
        self.redirect(next);
        self
    }

    pub fn context(&self) -> &'c Context {
        self.context
    }

    pub fn key(&self) -> &TranslationKey {
        &self.key
    }

    pub fn default_value(&self) -> &DefaultValue {
        &self.default
    }

    pub fn template_data(&self) -> &TemplateData {
        &self.data
    }

    pub fn count_value(&self) -> Option<&Value> {
        self.count.as_ref()
    }

    pub fn funcs(&self) -> &Funcs {
        &self.funcs
    }

    pub fn is_template(&self) -> bool {
        self.as_template
    }

    /// Template scope over this request's data, count and functions.
    pub fn scope(&self) -> Scope<'_> {
        Scope::new(
            &self.data,
            self.count.as_ref(),
            &self.funcs,
            self.context.funcs(),
        )
    }

    /// Resolve through the handler stack, following aliases.
    pub fn resolve(&self) -> Arc<Resolution> {
        self.follow().1
    }

    /// Resolve and extract the final string.
    ///
    /// Errors become `"ERROR: <message>"`; a miss yields the default.
    pub fn get(&self) -> String {
        self.resolve_and_get().1
    }

    /// Resolve once, returning both the resolution and the string [`get`]
    /// would produce from it.
    ///
    /// [`get`]: Request::get
    pub fn resolve_and_get(&self) -> (Arc<Resolution>, String) {
        let (request, resolution) = self.follow();
        let text = if let Some(error) = resolution.error() {
            format!("ERROR: {error}")
        } else if let Some(value) = resolution.value() {
            value.to_string()
        } else {
            request
                .evaluate_default(false)
                .unwrap_or_else(|error| format!("ERROR: {error}"))
        };
        (resolution, text)
    }

    /// Name of this request's cache entry, or `None` when request functions
    /// make the output uncacheable.
    pub(crate) fn cache_entry(&self) -> Option<String> {
        if !self.funcs.is_empty() {
            return None;
        }
        if self.count.is_none() && self.data.is_empty() && !self.as_template {
            return Some(self.key.raw().to_string());
        }
        let data: BTreeMap<&String, &Value> = self.data.iter().collect();
        Some(format!(
            "{}|{:?}|{:?}|{}",
            self.key.raw(),
            self.count,
            data,
            self.as_template
        ))
    }

    /// Evaluate the default; with `as_template` the result is parsed and
    /// rendered against this request's scope.
    pub(crate) fn evaluate_default(&self, as_template: bool) -> Result<String, TranslateError> {
        let text = match &self.default {
            DefaultValue::Template(template) => {
                return render(template, &self.scope()).map_err(|source| {
                    TranslateError::Template {
                        key: self.key.key().to_string(),
                        source,
                    }
                });
            }
            DefaultValue::Literal(text) => text.clone(),
            DefaultValue::Lazy(f) => f(),
            DefaultValue::LazyContext(f) => f(self.context),
        };
        if !as_template {
            return Ok(text);
        }
        parse_template(&text)
            .and_then(|template| render(&template, &self.scope()))
            .map_err(|source| TranslateError::Template {
                key: self.key.key().to_string(),
                source,
            })
    }

    fn redirect(&mut self, next: TranslationKey) {
        if self.default.as_literal() == Some(self.key.raw()) {
            self.default = DefaultValue::Literal(next.raw().to_string());
        }
        self.key = next;
    }

    /// Run the handler stack, re-dispatching alias results until a value,
    /// an error, or a miss. Returns the request that produced the final
    /// resolution.
    fn follow(&self) -> (Cow<'_, Request<'c>>, Arc<Resolution>) {
        let max = self.context.translator().max_alias_hops();
        let mut current = Cow::Borrowed(self);
        let mut hops = 0;
        loop {
            let resolution = self.context.handle(&current);
            if resolution.error().is_some() {
                return (current, resolution);
            }
            let Some(target) = resolution.alias() else {
                return (current, resolution);
            };

            // Only hops taken by this call count; keys chained with `with`
            // keep their history for the reported chain.
            let next = current.key.follow(target);
            hops += 1;
            if hops > max {
                tracing::debug!(key = self.key.raw(), max, "alias hop bound exceeded");
                let error = TranslateError::TooManyHops {
                    max,
                    chain: next.chain(),
                };
                return (current, Arc::new(Resolution::from_error(error)));
            }
            current.to_mut().redirect(next);
        }
    }
}

impl Debug for Request<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("Request")
            .field("key", &self.key)
            .field("default", &self.default)
            .field("data", &self.data)
            .field("count", &self.count)
            .field("funcs", &self.funcs.keys().collect::<Vec<_>>())
            .field("as_template", &self.as_template)
            .finish_non_exhaustive()
    }
}
