//! Template string parser using winnow.
//!
//! Handles:
//! - Literal text segments (a lone `{` or any `}` is literal)
//! - Placeholders `{{ name }}` and `{{ .name }}`

use winnow::combinator::{alt, cut_err, not, opt, preceded, repeat, terminated};
use winnow::error::{StrContext, StrContextValue};
use winnow::prelude::*;
use winnow::token::{one_of, take_while};

use super::ast::{Segment, Template};
use super::error::TemplateError;

/// Parse a template string into an AST.
///
/// ```
/// use i18nmod::parser::{Segment, parse_template};
///
/// let template = parse_template("Hello, {{ .name }}!").unwrap();
/// assert_eq!(template.segments[1], Segment::Placeholder("name".to_string()));
/// ```
pub fn parse_template(input: &str) -> Result<Template, TemplateError> {
    let mut remaining = input;
    match segments(&mut remaining) {
        Ok(segments) if remaining.is_empty() => Ok(Template {
            source: input.to_string(),
            segments,
        }),
        Ok(_) => {
            let (line, column) = calculate_position(input, remaining);
            Err(TemplateError::Syntax {
                line,
                column,
                message: format!(
                    "unexpected character: '{}'",
                    remaining.chars().next().unwrap_or('?')
                ),
            })
        }
        Err(e) => {
            let (line, column) = calculate_position(input, remaining);
            Err(TemplateError::Syntax {
                line,
                column,
                message: format!("parse error: {e}"),
            })
        }
    }
}

/// Calculate line and column from original input and remaining input.
fn calculate_position(original: &str, remaining: &str) -> (usize, usize) {
    let consumed = original.len() - remaining.len();
    let consumed_str = original.get(..consumed).unwrap_or(original);
    let line = consumed_str.chars().filter(|&c| c == '\n').count() + 1;
    let column = match consumed_str.rfind('\n') {
        Some(pos) => consumed - pos,
        None => consumed + 1,
    };
    (line, column)
}

/// Parse all segments, merging adjacent literals.
fn segments(input: &mut &str) -> ModalResult<Vec<Segment>> {
    let parsed: Vec<Segment> = repeat(0.., segment).parse_next(input)?;
    Ok(merge_literals(parsed))
}

/// Merge adjacent Literal segments into single segments.
fn merge_literals(segments: Vec<Segment>) -> Vec<Segment> {
    let mut result = Vec::with_capacity(segments.len());

    for segment in segments {
        match segment {
            Segment::Literal(text) => {
                if let Some(Segment::Literal(prev)) = result.last_mut() {
                    prev.push_str(&text);
                } else {
                    result.push(Segment::Literal(text));
                }
            }
            other @ Segment::Placeholder(_) => result.push(other),
        }
    }

    result
}

fn segment(input: &mut &str) -> ModalResult<Segment> {
    alt((placeholder, literal_run, lone_brace)).parse_next(input)
}

/// Parse a run of text containing no `{`.
fn literal_run(input: &mut &str) -> ModalResult<Segment> {
    take_while(1.., |c: char| c != '{')
        .map(|s: &str| Segment::Literal(s.to_string()))
        .parse_next(input)
}

/// Parse a `{` that does not open a placeholder.
fn lone_brace(input: &mut &str) -> ModalResult<Segment> {
    terminated('{', not('{'))
        .map(|c: char| Segment::Literal(c.to_string()))
        .parse_next(input)
}

/// Parse `{{ name }}`. Once `{{` is seen the placeholder must be complete.
fn placeholder(input: &mut &str) -> ModalResult<Segment> {
    preceded(
        "{{",
        cut_err(terminated(
            preceded((ws, opt('.')), identifier),
            (
                ws,
                "}}".context(StrContext::Expected(StrContextValue::StringLiteral("}}"))),
            ),
        )),
    )
    .map(|name: &str| Segment::Placeholder(name.to_string()))
    .parse_next(input)
}

/// Parse optional whitespace.
fn ws(input: &mut &str) -> ModalResult<()> {
    take_while(0.., |c: char| c.is_ascii_whitespace())
        .void()
        .parse_next(input)
}

/// Parse an identifier.
fn identifier<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    (
        one_of(|c: char| c.is_ascii_alphabetic() || c == '_'),
        take_while(0.., |c: char| c.is_ascii_alphanumeric() || c == '_'),
    )
        .take()
        .context(StrContext::Label("placeholder name"))
        .parse_next(input)
}
