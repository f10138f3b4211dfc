//! Template rendering.
//!
//! Placeholders resolve against a [`Scope`], in this order:
//! 1. request data
//! 2. the `count` of the request, when one was given
//! 3. context and request functions

use std::collections::HashMap;
use std::sync::Arc;

use crate::parser::{Segment, Template, TemplateError};
use crate::types::Value;

/// Data made available to templates, keyed by placeholder name.
pub type TemplateData = HashMap<String, Value>;

/// A named function callable from a template placeholder.
pub type TemplateFn = Arc<dyn Fn() -> Value + Send + Sync>;

/// Functions available to templates, keyed by placeholder name.
pub type Funcs = HashMap<String, TemplateFn>;

/// Everything a template may reference during one render.
#[derive(Clone, Copy)]
pub struct Scope<'a> {
    data: &'a TemplateData,
    count: Option<&'a Value>,
    funcs: [&'a Funcs; 2],
}

impl<'a> Scope<'a> {
    /// Scope over request data, an optional count, and two layers of
    /// functions (request functions shadow context functions).
    pub fn new(
        data: &'a TemplateData,
        count: Option<&'a Value>,
        request_funcs: &'a Funcs,
        context_funcs: &'a Funcs,
    ) -> Self {
        Self {
            data,
            count,
            funcs: [request_funcs, context_funcs],
        }
    }

    /// Resolve a placeholder name.
    pub fn lookup(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.data.get(name) {
            return Some(value.clone());
        }
        if name == "count" {
            if let Some(count) = self.count {
                return Some(count.clone());
            }
        }
        self.funcs
            .iter()
            .find_map(|funcs| funcs.get(name))
            .map(|f| f())
    }
}

/// Render a template against a scope.
pub fn render(template: &Template, scope: &Scope<'_>) -> Result<String, TemplateError> {
    let mut output = String::with_capacity(template.source.len());
    for segment in &template.segments {
        match segment {
            Segment::Literal(text) => output.push_str(text),
            Segment::Placeholder(name) => {
                let value = scope
                    .lookup(name)
                    .ok_or_else(|| TemplateError::UnknownReference {
                        name: name.clone(),
                        template: template.source.clone(),
                    })?;
                output.push_str(&value.to_string());
            }
        }
    }
    Ok(output)
}
