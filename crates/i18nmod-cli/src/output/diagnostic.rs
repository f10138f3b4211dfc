//! Miette diagnostic wrapper for translation file errors.

use i18nmod::{BackendError, TemplateError, TreeError};
use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// A miette-compatible diagnostic for an invalid YAML translation file.
///
/// Fields are read by miette derive macros, not directly by code.
#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
#[diagnostic(code(i18nmod::check))]
pub struct YamlDiagnostic {
    #[source_code]
    src: NamedSource<String>,

    #[label("error here")]
    span: Option<SourceSpan>,

    message: String,

    #[help]
    help: Option<String>,
}

impl YamlDiagnostic {
    /// Create a diagnostic for `error`, raised while parsing `content`.
    pub fn from_backend_error(name: &str, content: &str, error: &BackendError) -> Self {
        let (span, help) = match error {
            BackendError::Yaml { line, column, .. } => {
                (Some(span_at(content, *line, *column)), None)
            }
            BackendError::Template { scope, source, .. } => {
                let help = match source {
                    TemplateError::Syntax { .. } => {
                        Some("placeholders look like {{ name }} or {{ .name }}".to_string())
                    }
                    TemplateError::UnknownReference { .. } => None,
                };
                (locate_key(content, scope), help)
            }
            BackendError::InvalidValue { scope, .. } => (
                locate_key(content, scope),
                Some("values are strings, nested mappings, or plural cases under a `*` key".into()),
            ),
            BackendError::Tree { source, .. } => match source {
                TreeError::LinkCycle { path, .. } => (
                    locate_key(content, path),
                    Some("a link cannot point at one of its own ancestors".into()),
                ),
                TreeError::EmptyPath
                | TreeError::EmptySegment { .. }
                | TreeError::AboveRoot { .. }
                | TreeError::LinkRoot => (None, None),
            },
            BackendError::Io { .. }
            | BackendError::NotSupported { .. }
            | BackendError::NoLocale { .. }
            | BackendError::IncompleteRecord { .. } => (None, None),
        };

        YamlDiagnostic {
            src: NamedSource::new(name, content.to_string()),
            span,
            message: error.to_string(),
            help,
        }
    }
}

/// Span of one character at a 1-based line and column.
fn span_at(content: &str, line: usize, column: usize) -> SourceSpan {
    let offset = content
        .lines()
        .take(line.saturating_sub(1))
        .map(|l| l.len() + 1)
        .sum::<usize>()
        + column.saturating_sub(1);

    // Clamp offset to content length to avoid miette panic on out-of-bounds
    (offset.min(content.len()), 1).into()
}

/// Span of the first mapping key naming the last segment of `scope`.
fn locate_key(content: &str, scope: &str) -> Option<SourceSpan> {
    let name = scope.rsplit('.').next().filter(|name| !name.is_empty())?;
    let mut offset = 0;
    for line in content.lines() {
        let trimmed = line.trim_start();
        let unquoted = trimmed.trim_start_matches(['"', '\'']);
        if let Some(rest) = unquoted.strip_prefix(name) {
            if rest.starts_with([':', '~', '*', '@', '&', '"', '\'']) {
                let start = offset + (line.len() - unquoted.len());
                return Some((start, name.len()).into());
            }
        }
        offset += line.len() + 1;
    }
    None
}
