use std::sync::OnceLock;

use bon::Builder;
use serde::Serialize;

use crate::interpreter::{CaseValue, Plural};
use crate::parser::{Template, TemplateError, parse_template};

/// What a translation record resolves to. Exactly one shape per record.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordContent {
    /// A plain string used verbatim.
    Text(String),
    /// A value rendered against request data.
    Template(Template),
    /// Author-supplied plural cases.
    Plural(Plural),
    /// A leaf redirect to another key, followed at resolution time.
    /// A leading `.` makes the target relative to the record's group.
    Alias(String),
}

/// One unit of translated content for a (group, key) pair in one locale.
///
/// Records are immutable once inserted into a tree, apart from a memoized
/// parse of plain text that is only computed when the text is requested as
/// a template.
#[derive(Debug, Clone, Builder)]
#[builder(on(String, into))]
pub struct TranslationRecord {
    /// Dotted key path inside the group.
    key: String,

    content: RecordContent,

    #[builder(default)]
    group: String,

    #[builder(default)]
    locale: String,

    /// Where the record came from (file path, input name, table).
    source: Option<String>,

    #[builder(skip)]
    template_cache: OnceLock<Result<Template, TemplateError>>,
}

impl PartialEq for TranslationRecord {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
            && self.content == other.content
            && self.group == other.group
            && self.locale == other.locale
            && self.source == other.source
    }
}

impl TranslationRecord {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn content(&self) -> &RecordContent {
        &self.content
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// The plain text value, if this record holds one.
    pub fn text(&self) -> Option<&str> {
        match &self.content {
            RecordContent::Text(text) => Some(text),
            RecordContent::Template(_) | RecordContent::Plural(_) | RecordContent::Alias(_) => None,
        }
    }

    pub fn alias(&self) -> Option<&str> {
        match &self.content {
            RecordContent::Alias(target) => Some(target),
            RecordContent::Text(_) | RecordContent::Template(_) | RecordContent::Plural(_) => None,
        }
    }

    /// Copy of this record placed under another key path.
    pub fn rekeyed(&self, key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            content: self.content.clone(),
            group: self.group.clone(),
            locale: self.locale.clone(),
            source: self.source.clone(),
            template_cache: OnceLock::new(),
        }
    }

    /// This record's value as a template.
    ///
    /// Template records return their own template. Plain text is parsed on
    /// first use and the parse is kept; parsing the same text twice yields an
    /// equal template, so a racing initialization is harmless.
    pub fn as_template(&self) -> Option<Result<&Template, TemplateError>> {
        match &self.content {
            RecordContent::Template(template) => Some(Ok(template)),
            RecordContent::Text(text) => Some(
                self.template_cache
                    .get_or_init(|| parse_template(text))
                    .as_ref()
                    .map_err(Clone::clone),
            ),
            RecordContent::Plural(_) | RecordContent::Alias(_) => None,
        }
    }

    /// Serializable view of this record.
    pub fn view(&self) -> RecordView {
        let content = match &self.content {
            RecordContent::Text(value) => ContentView::Text {
                value: value.clone(),
            },
            RecordContent::Template(template) => ContentView::Template {
                source: template.source.clone(),
            },
            RecordContent::Plural(plural) => ContentView::Plural {
                cases: plural
                    .cases()
                    .map(|(key, value)| CaseView {
                        key,
                        value: value.to_string(),
                        template: matches!(value, CaseValue::Template(_)),
                    })
                    .collect(),
            },
            RecordContent::Alias(target) => ContentView::Alias {
                target: target.clone(),
            },
        };
        RecordView {
            source: self.source.clone(),
            content,
        }
    }
}

/// Serializable snapshot of a record, used by dumps.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordView {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(flatten)]
    pub content: ContentView,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ContentView {
    Text { value: String },
    Template { source: String },
    Plural { cases: Vec<CaseView> },
    Alias { target: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaseView {
    pub key: String,
    pub value: String,
    pub template: bool,
}
