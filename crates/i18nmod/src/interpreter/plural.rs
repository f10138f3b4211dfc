//! Author-supplied plural case selection.
//!
//! Plural forms are not derived from CLDR rules. Translation authors list
//! the cases explicitly: exact discriminators (`1`, `"one"`, `"other"`) and
//! comparative cases (`>5`, `<%d10`, `=0`). A count selects a case in this
//! order, stopping at the first hit:
//!
//! 1. exact case keyed by the count itself
//! 2. the first registered comparative case accepting the count
//! 3. `"one"` when the count is `1`, `"other"` for any other count

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter, Result as FmtResult};

use crate::parser::Template;
use crate::types::Value;

/// Discriminator of an exact plural case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CaseKey {
    Int(i64),
    Name(String),
}

impl From<&Value> for CaseKey {
    fn from(value: &Value) -> Self {
        match value {
            Value::Number(n) => CaseKey::Int(*n),
            Value::String(s) => CaseKey::Name(s.clone()),
            Value::Float(f) => CaseKey::Name(f.to_string()),
        }
    }
}

impl From<i64> for CaseKey {
    fn from(n: i64) -> Self {
        CaseKey::Int(n)
    }
}

impl From<i32> for CaseKey {
    fn from(n: i32) -> Self {
        CaseKey::Int(i64::from(n))
    }
}

impl From<&str> for CaseKey {
    fn from(name: &str) -> Self {
        CaseKey::Name(name.to_string())
    }
}

impl Display for CaseKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            CaseKey::Int(n) => write!(f, "{n}"),
            CaseKey::Name(name) => f.write_str(name),
        }
    }
}

/// Value selected by a plural case.
#[derive(Debug, Clone, PartialEq)]
pub enum CaseValue {
    Text(String),
    Template(Template),
}

impl Display for CaseValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            CaseValue::Text(text) => f.write_str(text),
            CaseValue::Template(template) => write!(f, "{template}"),
        }
    }
}

impl From<&str> for CaseValue {
    fn from(text: &str) -> Self {
        CaseValue::Text(text.to_string())
    }
}

/// Comparison operator of a comparative case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Equal,
    Greater,
    Less,
}

impl Comparison {
    fn from_char(c: char) -> Option<Self> {
        match c {
            '=' => Some(Comparison::Equal),
            '>' => Some(Comparison::Greater),
            '<' => Some(Comparison::Less),
            _ => None,
        }
    }

    fn symbol(self) -> char {
        match self {
            Comparison::Equal => '=',
            Comparison::Greater => '>',
            Comparison::Less => '<',
        }
    }
}

/// A predicate case such as `>5` or `<%x10`.
///
/// The count is formatted with the case's verb and then compared with the
/// threshold as a string. The comparison is lexical: `"9" > "10"` holds,
/// so bucket boundaries are expected to be written in the same width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparativeCase {
    pub comparison: Comparison,
    pub threshold: String,
    /// Format verb following `%` (`d`, `v`, `x`, ...). `None` means `%v`.
    pub format: Option<char>,
}

impl ComparativeCase {
    /// Parse a case key starting with `=`, `>` or `<`.
    pub fn parse(key: &str) -> Option<Self> {
        let mut chars = key.chars();
        let comparison = Comparison::from_char(chars.next()?)?;
        let rest = chars.as_str();

        let mut verb = rest.chars();
        let (format, threshold) = match (verb.next(), verb.next()) {
            (Some('%'), Some(format)) => (Some(format), verb.as_str()),
            _ => (None, rest),
        };

        Some(Self {
            comparison,
            threshold: threshold.to_string(),
            format,
        })
    }

    /// Whether the formatted count satisfies this case.
    pub fn accepts(&self, count: &Value) -> bool {
        let formatted = format_count(count, self.format);
        match self.comparison {
            Comparison::Equal => formatted == self.threshold,
            Comparison::Greater => formatted > self.threshold,
            Comparison::Less => formatted < self.threshold,
        }
    }
}

impl Display for ComparativeCase {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.comparison.symbol())?;
        if let Some(format) = self.format {
            write!(f, "%{format}")?;
        }
        f.write_str(&self.threshold)
    }
}

/// Stringify a count the way a `%` verb would.
fn format_count(count: &Value, format: Option<char>) -> String {
    match (format, count) {
        (Some('x'), Value::Number(n)) => format!("{n:x}"),
        (Some('X'), Value::Number(n)) => format!("{n:X}"),
        (Some('o'), Value::Number(n)) => format!("{n:o}"),
        (Some('b'), Value::Number(n)) => format!("{n:b}"),
        (Some('f'), Value::Number(_) | Value::Float(_)) => {
            format!("{:.6}", count.as_float().unwrap_or_default())
        }
        (Some('q'), Value::String(s)) => format!("{s:?}"),
        _ => count.to_string(),
    }
}

/// The plural cases of one translation record.
///
/// # Example
///
/// ```
/// use i18nmod::{Plural, Value};
///
/// let mut plural = Plural::new();
/// plural.add_case(1, "one-item");
/// plural.add_case(">5", "many");
/// plural.add_case("other", "several");
///
/// assert_eq!(plural.find(&Value::from(1)).unwrap().to_string(), "one-item");
/// assert_eq!(plural.find(&Value::from(6)).unwrap().to_string(), "many");
/// assert_eq!(plural.find(&Value::from(3)).unwrap().to_string(), "several");
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Plural {
    exact: BTreeMap<CaseKey, CaseValue>,
    /// Kept in registration order; the first accepting case wins.
    comparative: Vec<(ComparativeCase, CaseValue)>,
}

impl Plural {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a case.
    ///
    /// Names starting with `=`, `>` or `<` become comparative cases. The
    /// shorthand `p` also seeds `other` and `s` also seeds `one` when those
    /// buckets are still unset.
    pub fn add_case(&mut self, key: impl Into<CaseKey>, value: impl Into<CaseValue>) {
        let key = key.into();
        let value = value.into();

        if let CaseKey::Name(name) = &key {
            if let Some(case) = ComparativeCase::parse(name) {
                match self.comparative.iter_mut().find(|(c, _)| *c == case) {
                    Some(slot) => slot.1 = value,
                    None => self.comparative.push((case, value)),
                }
                return;
            }

            let seeded = match name.as_str() {
                "p" => Some("other"),
                "s" => Some("one"),
                _ => None,
            };
            if let Some(bucket) = seeded {
                self.exact
                    .entry(CaseKey::from(bucket))
                    .or_insert_with(|| value.clone());
            }
        }

        self.exact.insert(key, value);
    }

    /// Select the case for `count`.
    pub fn find(&self, count: &Value) -> Option<&CaseValue> {
        if let Some(value) = self.exact.get(&CaseKey::from(count)) {
            return Some(value);
        }

        if let Some((_, value)) = self
            .comparative
            .iter()
            .find(|(case, _)| case.accepts(count))
        {
            return Some(value);
        }

        let bucket = if count.is_one() { "one" } else { "other" };
        self.exact.get(&CaseKey::from(bucket))
    }

    /// The value requested through a plural modifier (`+`, `~p`).
    pub fn plural_value(&self) -> Option<&CaseValue> {
        self.exact
            .get(&CaseKey::from("p"))
            .or_else(|| self.exact.get(&CaseKey::from("other")))
    }

    /// The value requested through a singular modifier (`-`, `~s`).
    pub fn singular_value(&self) -> Option<&CaseValue> {
        self.exact
            .get(&CaseKey::from("s"))
            .or_else(|| self.exact.get(&CaseKey::from("one")))
    }

    pub fn is_empty(&self) -> bool {
        self.exact.is_empty() && self.comparative.is_empty()
    }

    /// All cases as (key, value): exact cases in key order, then comparative
    /// cases in registration order.
    pub fn cases(&self) -> impl Iterator<Item = (String, &CaseValue)> {
        self.exact
            .iter()
            .map(|(key, value)| (key.to_string(), value))
            .chain(
                self.comparative
                    .iter()
                    .map(|(case, value)| (case.to_string(), value)),
            )
    }
}
