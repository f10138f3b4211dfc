//! Template error types.

use thiserror::Error;

/// An error raised while parsing or rendering a template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    /// A syntax error with location information.
    #[error("syntax error at {line}:{column}: {message}")]
    Syntax {
        line: usize,
        column: usize,
        message: String,
    },

    /// A placeholder named neither a data entry nor a function.
    #[error("unknown reference '{name}' in template \"{template}\"")]
    UnknownReference { name: String, template: String },
}
