//! Value template parser.
//!
//! Translation values flagged as templates (`~` keys) and default values
//! rendered as templates are parsed here into a small AST.

pub mod ast;
pub mod error;
mod template;

pub use ast::*;
pub use error::TemplateError;
pub use template::parse_template;
