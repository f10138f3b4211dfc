use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;

use crate::interpreter::Context;
use crate::parser::Template;

/// Producer of a default string, invoked only when the default is needed.
pub type LazyFn = Arc<dyn Fn() -> String + Send + Sync>;

/// Producer of a default string that reads the active resolution context.
pub type LazyContextFn = Arc<dyn Fn(&Context) -> String + Send + Sync>;

/// Value used when no locale supplies a translation.
///
/// When the request asks for template-as-default rendering every variant is
/// treated as template source: literals and lazy results are parsed first,
/// pre-parsed templates are rendered directly.
#[derive(Clone)]
pub enum DefaultValue {
    Literal(String),
    Lazy(LazyFn),
    LazyContext(LazyContextFn),
    Template(Template),
}

impl DefaultValue {
    pub fn lazy(f: impl Fn() -> String + Send + Sync + 'static) -> Self {
        DefaultValue::Lazy(Arc::new(f))
    }

    pub fn with_context(f: impl Fn(&Context) -> String + Send + Sync + 'static) -> Self {
        DefaultValue::LazyContext(Arc::new(f))
    }

    /// The literal text, when this is a literal.
    pub fn as_literal(&self) -> Option<&str> {
        match self {
            DefaultValue::Literal(text) => Some(text),
            DefaultValue::Lazy(_) | DefaultValue::LazyContext(_) | DefaultValue::Template(_) => {
                None
            }
        }
    }
}

impl Debug for DefaultValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            DefaultValue::Literal(text) => f.debug_tuple("Literal").field(text).finish(),
            DefaultValue::Lazy(_) => f.write_str("Lazy(..)"),
            DefaultValue::LazyContext(_) => f.write_str("LazyContext(..)"),
            DefaultValue::Template(template) => f.debug_tuple("Template").field(template).finish(),
        }
    }
}

impl From<&str> for DefaultValue {
    fn from(text: &str) -> Self {
        DefaultValue::Literal(text.to_string())
    }
}

impl From<String> for DefaultValue {
    fn from(text: String) -> Self {
        DefaultValue::Literal(text)
    }
}

impl From<Template> for DefaultValue {
    fn from(template: Template) -> Self {
        DefaultValue::Template(template)
    }
}
