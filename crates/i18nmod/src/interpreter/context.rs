//! Per-request resolution context.

use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;

use crate::interpreter::handler::{FoundHook, Handler, HandlerFn, Next, NotFoundHook};
use crate::interpreter::{Funcs, Request, Resolution, Translator};
use crate::types::Value;

/// Immutable resolution context: locale priority list, handler stack,
/// found/not-found observers and template functions.
///
/// Contexts are cheap to clone. The `with_*` methods consume a context and
/// return an extended one; a context is never mutated after it is handed
/// out, so one value can be shared by concurrent requests.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use i18nmod::{MemoryBackend, RecordContent, TranslationRecord, Translator};
///
/// let backend = MemoryBackend::new();
/// backend.insert(
///     TranslationRecord::builder()
///         .group("users")
///         .locale("en")
///         .key("greeting")
///         .content(RecordContent::Text("Hello".to_string()))
///         .build(),
/// );
///
/// let translator = Arc::new(Translator::new());
/// translator.add_backend(backend);
/// translator.preload_all().unwrap();
///
/// let context = translator.context("fr");
/// assert_eq!(context.locales(), ["fr", "en", "_"]);
/// assert_eq!(context.t("users.greeting").get(), "Hello");
/// ```
#[derive(Clone)]
pub struct Context {
    translator: Arc<Translator>,
    locales: Arc<[String]>,
    handler: Option<Arc<Handler>>,
    found_hooks: Vec<FoundHook>,
    not_found_hooks: Vec<NotFoundHook>,
    funcs: Funcs,
}

impl Context {
    /// Context consulting `locales` in order.
    pub fn new(translator: Arc<Translator>, locales: Vec<String>) -> Self {
        Self {
            translator,
            locales: locales.into(),
            handler: None,
            found_hooks: Vec::new(),
            not_found_hooks: Vec::new(),
            funcs: Funcs::new(),
        }
    }

    pub fn translator(&self) -> &Arc<Translator> {
        &self.translator
    }

    pub fn locales(&self) -> &[String] {
        &self.locales
    }

    pub fn funcs(&self) -> &Funcs {
        &self.funcs
    }

    /// Key under which cached resolutions of this context are stored.
    pub fn cache_scope(&self) -> String {
        self.locales.join(",")
    }

    /// Push a middleware handler; the most recently added runs first.
    pub fn with_handler(
        mut self,
        f: impl Fn(Next<'_>, &Request<'_>) -> Arc<Resolution> + Send + Sync + 'static,
    ) -> Self {
        let func: Arc<HandlerFn> = Arc::new(f);
        self.handler = Some(Arc::new(Handler::new(func, self.handler.take())));
        self
    }

    pub fn with_found_hook(
        mut self,
        f: impl Fn(&Request<'_>, &Resolution) + Send + Sync + 'static,
    ) -> Self {
        self.found_hooks.push(Arc::new(f));
        self
    }

    pub fn with_not_found_hook(mut self, f: impl Fn(&Request<'_>) + Send + Sync + 'static) -> Self {
        self.not_found_hooks.push(Arc::new(f));
        self
    }

    /// Make a function available to every template rendered in this context.
    pub fn with_func(
        mut self,
        name: &str,
        f: impl Fn() -> Value + Send + Sync + 'static,
    ) -> Self {
        self.funcs.insert(name.to_string(), Arc::new(f));
        self
    }

    /// Same context consulting another locale list.
    pub fn with_locales(mut self, locales: Vec<String>) -> Self {
        self.locales = locales.into();
        self
    }

    /// Start a request for `key`.
    pub fn t(&self, key: &str) -> Request<'_> {
        Request::new(self, key)
    }

    /// Start a request for `key` whose default is rendered as a template.
    pub fn tt(&self, key: &str) -> Request<'_> {
        self.t(key).as_template()
    }

    /// Run a request through the whole handler stack (one hop, no alias
    /// following).
    pub fn handle(&self, request: &Request<'_>) -> Arc<Resolution> {
        Next::new(self, self.handler.as_deref()).run(request)
    }

    /// Terminal resolution below every middleware handler.
    pub(crate) fn resolve(&self, request: &Request<'_>) -> Arc<Resolution> {
        let cache = self.translator.cache();
        let scope = self.cache_scope();
        let key = request.key();

        let entry = if cache.is_allowed(key) {
            request.cache_entry()
        } else {
            None
        };
        if let Some(hit) = entry.as_deref().and_then(|entry| cache.get(&scope, entry)) {
            tracing::trace!(key = key.raw(), scope = %scope, "cache hit");
            return hit;
        }

        let resolution = Arc::new(self.translator.translate(request));

        if resolution.record().is_some() {
            if let Some(entry) = &entry {
                cache.insert(&scope, entry, &resolution);
            }
            for hook in &self.found_hooks {
                hook(request, &resolution);
            }
        } else {
            tracing::trace!(key = key.raw(), locales = ?self.locales, "translation not found");
            for hook in &self.not_found_hooks {
                hook(request);
            }
        }
        resolution
    }
}

impl Debug for Context {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("Context")
            .field("locales", &self.locales)
            .field("handler", &self.handler)
            .field("found_hooks", &self.found_hooks.len())
            .field("not_found_hooks", &self.not_found_hooks.len())
            .field("funcs", &self.funcs.len())
            .finish_non_exhaustive()
    }
}
