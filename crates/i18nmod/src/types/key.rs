//! Parsing of requested translation keys.
//!
//! A lookup key has the shape `[^]GROUP.BASENAME[MODIFIER]`:
//! - `^` marks the key as cacheable
//! - `GROUP` is everything before the first `.`
//! - `MODIFIER` is `+` / `~p` (plural), `-` / `~s` (singular) or absent

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::sync::Arc;

/// Prefix marking a key whose resolution may be memoized.
pub const CACHE_SIGIL: char = '^';

/// Prefix `key` with the cache sigil.
///
/// ```
/// assert_eq!(i18nmod::cached("users.greeting"), "^users.greeting");
/// ```
pub fn cached(key: &str) -> String {
    format!("{CACHE_SIGIL}{key}")
}

/// Immutable parsed form of a requested key.
///
/// Parsing is total: an empty string yields a key with an empty group and an
/// empty base name, which never matches a stored translation.
///
/// Keys produced while following aliases keep a link to the key that was
/// active before the hop, so the chain can be reported and bounded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationKey {
    raw: String,
    key: String,
    group: String,
    plural: bool,
    singular: bool,
    cacheable: bool,
    previous: Option<Arc<TranslationKey>>,
}

impl TranslationKey {
    /// Parse a raw key with no alias history.
    pub fn new(raw: &str) -> Self {
        Self::parse(raw, None)
    }

    /// Parse a raw key, recording the key that was active before it.
    pub fn parse(raw: &str, previous: Option<Arc<TranslationKey>>) -> Self {
        let (cacheable, rest) = match raw.strip_prefix(CACHE_SIGIL) {
            Some(rest) => (true, rest),
            None => (false, raw),
        };

        let group = rest
            .split_once('.')
            .map(|(group, _)| group.to_string())
            .unwrap_or_default();

        let (key, plural, singular) = if let Some(key) = rest.strip_suffix("~p") {
            (key, true, false)
        } else if let Some(key) = rest.strip_suffix("~s") {
            (key, false, true)
        } else if let Some(key) = rest.strip_suffix('+') {
            (key, true, false)
        } else if let Some(key) = rest.strip_suffix('-') {
            (key, false, true)
        } else {
            (rest, false, false)
        };

        Self {
            raw: raw.to_string(),
            key: key.to_string(),
            group,
            plural,
            singular,
            cacheable,
            previous,
        }
    }

    /// Build the key reached by following an alias from this one.
    ///
    /// The new key inherits this key's singular/plural selector when the
    /// target does not carry a modifier of its own.
    pub fn follow(&self, target: &str) -> Self {
        let mut next = Self::parse(target, Some(Arc::new(self.clone())));
        if !next.plural && !next.singular {
            next.plural = self.plural;
            next.singular = self.singular;
        }
        next
    }

    /// Same key, forced to select the plural case.
    pub fn into_plural(mut self) -> Self {
        self.plural = true;
        self.singular = false;
        self
    }

    /// Same key, forced to select the singular case.
    pub fn into_singular(mut self) -> Self {
        self.plural = false;
        self.singular = true;
        self
    }

    /// The string exactly as requested, sigil and modifier included.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The full key with group, without sigil or modifier.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The group name (first dot-segment), empty for ungrouped keys.
    pub fn group(&self) -> &str {
        &self.group
    }

    /// The key inside its group's table.
    pub fn name(&self) -> &str {
        if self.group.is_empty() {
            return &self.key;
        }
        self.key
            .strip_prefix(self.group.as_str())
            .and_then(|rest| rest.strip_prefix('.'))
            .unwrap_or(&self.key)
    }

    pub fn is_plural(&self) -> bool {
        self.plural
    }

    pub fn is_singular(&self) -> bool {
        self.singular
    }

    pub fn is_cacheable(&self) -> bool {
        self.cacheable
    }

    /// The key active before the last alias hop.
    pub fn previous(&self) -> Option<&TranslationKey> {
        self.previous.as_deref()
    }

    /// Number of keys before this one in the chain, from alias hops and
    /// [`Request::with`] redirects alike.
    ///
    /// [`Request::with`]: crate::Request::with
    pub fn hops(&self) -> usize {
        let mut hops = 0;
        let mut current = self.previous();
        while let Some(key) = current {
            hops += 1;
            current = key.previous();
        }
        hops
    }

    /// Keys visited so far, oldest first.
    pub fn chain(&self) -> Vec<String> {
        let mut chain = vec![self.key.clone()];
        let mut current = self.previous();
        while let Some(key) = current {
            chain.push(key.key.clone());
            current = key.previous();
        }
        chain.reverse();
        chain
    }
}

impl Display for TranslationKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.key)
    }
}
