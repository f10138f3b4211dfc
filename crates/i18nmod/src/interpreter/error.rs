//! Error types for loading and resolving translations.

use thiserror::Error;

use crate::backend::BackendError;
use crate::parser::TemplateError;

/// Errors that occur while preloading translations from backends.
#[derive(Debug, Error)]
pub enum LoadError {
    /// A backend failed to load one (group, locale) pair.
    #[error("failed to load group '{group}' for locale '{locale}' from backend '{backend}': {source}")]
    Backend {
        group: String,
        locale: String,
        backend: String,
        #[source]
        source: BackendError,
    },
}

/// A failure recorded on a resolution instead of being raised.
///
/// A missing translation is never an error; it falls back to the default.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranslateError {
    /// A plural record was matched without a count or a singular/plural
    /// modifier to pick a case with.
    #[error("ambiguous plural request for '{key}': no count and no singular or plural modifier")]
    AmbiguousPlural { key: String },

    /// A value template, plural-case template or default template failed.
    #[error("template error in '{key}': {source}")]
    Template {
        key: String,
        #[source]
        source: TemplateError,
    },

    /// Alias redirection exceeded the configured hop bound.
    #[error("too many alias hops (max {max}): {}", chain.join(" -> "))]
    TooManyHops { max: usize, chain: Vec<String> },
}

/// Compute "did you mean" suggestions for a missing key.
///
/// Returns up to three candidates within edit distance 1 (for keys of three
/// characters or fewer) or 2 (longer keys), closest first.
pub fn compute_suggestions(target: &str, available: &[String]) -> Vec<String> {
    let max_distance = if target.chars().count() <= 3 { 1 } else { 2 };

    let mut candidates: Vec<(usize, &String)> = available
        .iter()
        .map(|candidate| (strsim::levenshtein(target, candidate), candidate))
        .filter(|(distance, _)| *distance > 0 && *distance <= max_distance)
        .collect();

    candidates.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(b.1)));
    candidates
        .into_iter()
        .take(3)
        .map(|(_, candidate)| candidate.clone())
        .collect()
}
