//! AST types for value templates.

use std::fmt::{Display, Formatter, Result as FmtResult};

/// A parsed template: literal text interleaved with `{{ name }}` placeholders.
///
/// The original source is kept so templates can be dumped and compared.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    pub source: String,
    pub segments: Vec<Segment>,
}

/// A segment within a template.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    /// Literal text (no interpolation).
    Literal(String),
    /// A placeholder naming a data entry or a context function.
    Placeholder(String),
}

impl Template {
    /// Names referenced by placeholders, in order of appearance.
    pub fn references(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Placeholder(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Whether the template contains no placeholders.
    pub fn is_static(&self) -> bool {
        self.references().next().is_none()
    }
}

impl Display for Template {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.source)
    }
}
