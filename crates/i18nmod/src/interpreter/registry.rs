//! Explicit registry of locale metadata and translation asset paths.

use std::path::{Path, PathBuf};

use bon::Builder;
use icu_locale_core::Locale;

/// Metadata about a locale known to the host application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleInfo {
    /// Canonical tag, e.g. `pt-BR`.
    pub code: String,
    /// Human-readable name, e.g. `Português (Brasil)`.
    pub name: Option<String>,
}

/// Locale metadata and asset directories, passed to a [`Translator`] at
/// construction instead of living in process-wide state.
///
/// [`Translator`]: crate::Translator
///
/// # Example
///
/// ```
/// use i18nmod::Registry;
///
/// let mut registry = Registry::builder().default_locale("en").build();
/// registry.register_locale("pt-br", Some("Português"));
///
/// assert_eq!(registry.canonicalize("PT_br"), "pt-BR");
/// assert_eq!(registry.locales()[0].code, "pt-BR");
/// ```
#[derive(Debug, Clone, Builder)]
#[builder(on(String, into))]
pub struct Registry {
    /// Locale consulted after the requested one.
    #[builder(default = "en".to_string())]
    default_locale: String,

    #[builder(default)]
    locales: Vec<LocaleInfo>,

    /// Directories of translation files.
    #[builder(default)]
    asset_paths: Vec<PathBuf>,
}

impl Default for Registry {
    fn default() -> Self {
        Registry::builder().build()
    }
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn default_locale(&self) -> &str {
        &self.default_locale
    }

    pub fn set_default_locale(&mut self, locale: &str) {
        self.default_locale = self.canonicalize(locale);
    }

    pub fn locales(&self) -> &[LocaleInfo] {
        &self.locales
    }

    pub fn asset_paths(&self) -> &[PathBuf] {
        &self.asset_paths
    }

    /// Register a locale. Registering the same canonical tag again updates
    /// its name.
    pub fn register_locale(&mut self, code: &str, name: Option<&str>) {
        let code = canonical_locale(code);
        let name = name.map(ToString::to_string);
        match self.locales.iter_mut().find(|info| info.code == code) {
            Some(info) => info.name = name,
            None => self.locales.push(LocaleInfo { code, name }),
        }
    }

    /// Register a directory of translation files.
    pub fn register_path(&mut self, path: impl AsRef<Path>) {
        let path = path.as_ref().to_path_buf();
        if !self.asset_paths.contains(&path) {
            self.asset_paths.push(path);
        }
    }

    pub fn locale_info(&self, code: &str) -> Option<&LocaleInfo> {
        let code = canonical_locale(code);
        self.locales.iter().find(|info| info.code == code)
    }

    /// Canonical form of a locale tag.
    pub fn canonicalize(&self, tag: &str) -> String {
        canonical_locale(tag)
    }
}

/// Canonicalize a locale tag through ICU parsing: `_` becomes `-` and each
/// subtag takes its canonical case (`pt_br` → `pt-BR`, `en-us-u-ca-buddhist`
/// → `en-US-u-ca-buddhist`).
///
/// The wildcard locale and tags that do not parse as locales are returned
/// unchanged.
pub fn canonical_locale(tag: &str) -> String {
    match parse_locale(tag) {
        Some(locale) => locale.to_string(),
        None => tag.to_string(),
    }
}

/// Whether `tag` parses as a BCP 47 locale (`en`, `pt-BR`, `zh_Hant_TW`,
/// `en-US-u-ca-buddhist`).
pub fn is_locale_tag(tag: &str) -> bool {
    parse_locale(tag).is_some()
}

/// Parse `tag`, accepting `_` separators. Five to eight letter language
/// subtags are rejected so plain words such as `messages` are not locales.
fn parse_locale(tag: &str) -> Option<Locale> {
    let locale = Locale::try_from_str(&tag.replace('_', "-")).ok()?;
    (locale.id.language.as_str().len() <= 3).then_some(locale)
}
