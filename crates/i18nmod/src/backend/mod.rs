//! Pluggable sources of translation data.
//!
//! A backend hands the translator one [`Tree`] per (locale, group) pair.
//! The translator never parses storage formats itself.

mod memory;
mod yaml;

use std::fmt::Debug;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub use memory::MemoryBackend;
pub use yaml::{YamlBackend, YamlSource, detect_locale, format_group_name, parse_yaml};

use crate::parser::TemplateError;
use crate::tree::{Tree, TreeError};
use crate::types::TranslationRecord;

/// A source of translation trees.
pub trait Backend: Send + Sync + Debug {
    /// Short name used in load errors.
    fn name(&self) -> &str;

    /// Groups this backend holds data for.
    fn list_groups(&self) -> Vec<String>;

    /// Locales this backend holds data for.
    fn list_languages(&self) -> Vec<String>;

    /// Build the tree for one (locale, group) pair. A pair the backend knows
    /// nothing about yields an empty tree.
    fn load_translations(&self, locale: &str, group: &str) -> Result<Tree, BackendError>;

    /// Persist a record.
    fn save_translation(&self, record: &TranslationRecord) -> Result<(), BackendError>;

    /// Remove a record.
    fn delete_translation(&self, record: &TranslationRecord) -> Result<(), BackendError>;
}

/// Errors raised by backends while reading or writing translations.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("failed to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid YAML in '{name}': {message}")]
    Yaml {
        name: String,
        line: usize,
        column: usize,
        message: String,
    },

    #[error("invalid value at '{scope}' in '{name}': {message}")]
    InvalidValue {
        name: String,
        scope: String,
        message: String,
    },

    #[error("invalid template at '{scope}' in '{name}': {source}")]
    Template {
        name: String,
        scope: String,
        #[source]
        source: TemplateError,
    },

    #[error("invalid tree in '{name}': {source}")]
    Tree {
        name: String,
        #[source]
        source: TreeError,
    },

    #[error("backend '{backend}' does not support {operation}")]
    NotSupported {
        backend: String,
        operation: &'static str,
    },

    #[error("no locale found in file name '{}'", path.display())]
    NoLocale { path: PathBuf },

    #[error("record '{key}' has no group or locale")]
    IncompleteRecord { key: String },
}
