//! YAML translation files.
//!
//! Keys in a YAML document form the tree path of each record. Suffixes on a
//! key change how its value is read:
//!
//! | suffix | value | record |
//! |--------|-------|--------|
//! | `*`    | mapping of cases | plural; case keys ending in `~` are templates |
//! | `~`    | scalar | template |
//! | `@`    | scalar | alias to another key (`.x` is relative to the group) |
//! | `&`    | scalar | link: the subtree is replaced by the target path |
//!
//! ```yaml
//! users:
//!   greeting~: "Hello, {{ name }}"
//!   item*:
//!     s: "one item"
//!     p: "many items"
//!     0: "no items"
//!     ">99~": "{{ count }}+ items"
//!   hello@: ".users.greeting"
//! people&: users
//! ```

use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use walkdir::{DirEntry, WalkDir};
use yaml_rust::{Yaml, YamlLoader};

use crate::backend::{Backend, BackendError};
use crate::interpreter::{
    ANY_LOCALE, CaseKey, CaseValue, Plural, Registry, canonical_locale, is_locale_tag,
};
use crate::parser::parse_template;
use crate::tree::Tree;
use crate::types::{RecordContent, TranslationRecord};

/// Where one YAML document comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum YamlSource {
    File(PathBuf),
    /// In-memory content registered under a name.
    Input { name: String, content: String },
}

impl YamlSource {
    /// Name used as the record source and in errors.
    pub fn name(&self) -> Cow<'_, str> {
        match self {
            YamlSource::File(path) => path.to_string_lossy(),
            YamlSource::Input { name, .. } => Cow::Borrowed(name),
        }
    }

    /// The document text.
    pub fn read(&self) -> Result<Cow<'_, str>, BackendError> {
        match self {
            YamlSource::File(path) => fs::read_to_string(path)
                .map(Cow::Owned)
                .map_err(|source| BackendError::Io {
                    path: path.clone(),
                    source,
                }),
            YamlSource::Input { content, .. } => Ok(Cow::Borrowed(content)),
        }
    }
}

/// Backend reading YAML documents registered per (group, locale).
///
/// Documents of the same (group, locale) are merged in registration order;
/// the first document defining a key wins.
#[derive(Debug, Default)]
pub struct YamlBackend {
    /// group -> locale -> documents
    sources: BTreeMap<String, BTreeMap<String, Vec<YamlSource>>>,
}

impl YamlBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend over every asset directory registered in `registry`.
    pub fn from_registry(registry: &Registry) -> Result<Self, BackendError> {
        let mut backend = Self::new();
        for path in registry.asset_paths() {
            backend.load_dir(path)?;
        }
        Ok(backend)
    }

    /// Register in-memory YAML for `group` in `locale`. Use
    /// [`ANY_LOCALE`] for content matching every locale.
    pub fn add_input(&mut self, group: &str, locale: &str, name: &str, content: &str) -> &mut Self {
        self.push(
            group,
            &canonical_locale(locale),
            YamlSource::Input {
                name: name.to_string(),
                content: content.to_string(),
            },
        );
        self
    }

    /// Register a file for `group`; the locale comes from the file name
    /// (`en.yaml`, `users.pt-br.yml`).
    pub fn add_file(
        &mut self,
        group: &str,
        path: impl AsRef<Path>,
    ) -> Result<&mut Self, BackendError> {
        let path = path.as_ref();
        let locale = detect_locale(path).ok_or_else(|| BackendError::NoLocale {
            path: path.to_path_buf(),
        })?;
        self.push(group, &locale, YamlSource::File(path.to_path_buf()));
        Ok(self)
    }

    /// Register every YAML file below `dir`. Returns the number of files
    /// registered.
    ///
    /// A file's group is its directory relative to `dir`, nested directories
    /// joined with `:` (`admin/users/en.yaml` belongs to `admin:users`). Files
    /// directly in `dir` take their group from the file name instead
    /// (`users.en.yaml`). Hidden files and directories are skipped.
    pub fn load_dir(&mut self, dir: impl AsRef<Path>) -> Result<usize, BackendError> {
        let dir = dir.as_ref();
        let mut count = 0;

        let walker = WalkDir::new(dir)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !is_hidden(entry));
        for entry in walker {
            let entry = entry.map_err(|error| BackendError::Io {
                path: error
                    .path()
                    .map_or_else(|| dir.to_path_buf(), Path::to_path_buf),
                source: io::Error::from(error),
            })?;
            if !entry.file_type().is_file() || !is_yaml(entry.path()) {
                continue;
            }

            let path = entry.path();
            let Some(group) = group_of(dir, path) else {
                tracing::warn!(path = %path.display(), "no group for translation file, skipping");
                continue;
            };
            self.add_file(&group, path)?;
            count += 1;
        }

        tracing::debug!(dir = %dir.display(), files = count, "registered translation files");
        Ok(count)
    }

    /// Documents registered for (group, locale).
    pub fn sources(&self, group: &str, locale: &str) -> &[YamlSource] {
        self.sources
            .get(group)
            .and_then(|locales| locales.get(locale))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Every registered document as (group, locale, source).
    pub fn all_sources(&self) -> impl Iterator<Item = (&str, &str, &YamlSource)> {
        self.sources.iter().flat_map(|(group, locales)| {
            locales.iter().flat_map(move |(locale, sources)| {
                sources
                    .iter()
                    .map(move |source| (group.as_str(), locale.as_str(), source))
            })
        })
    }

    fn push(&mut self, group: &str, locale: &str, source: YamlSource) {
        self.sources
            .entry(group.to_string())
            .or_default()
            .entry(locale.to_string())
            .or_default()
            .push(source);
    }
}

impl Backend for YamlBackend {
    fn name(&self) -> &str {
        "yaml"
    }

    fn list_groups(&self) -> Vec<String> {
        self.sources.keys().cloned().collect()
    }

    fn list_languages(&self) -> Vec<String> {
        let locales: BTreeSet<&String> = self.sources.values().flat_map(BTreeMap::keys).collect();
        locales.into_iter().cloned().collect()
    }

    fn load_translations(&self, locale: &str, group: &str) -> Result<Tree, BackendError> {
        let mut tree = Tree::new();
        for source in self.sources(group, locale) {
            let content = source.read()?;
            let loaded = parse_yaml(&source.name(), group, locale, &content)?;
            tree.merge(&loaded);
        }
        Ok(tree)
    }

    fn save_translation(&self, _record: &TranslationRecord) -> Result<(), BackendError> {
        Err(BackendError::NotSupported {
            backend: self.name().to_string(),
            operation: "saving translations",
        })
    }

    fn delete_translation(&self, _record: &TranslationRecord) -> Result<(), BackendError> {
        Err(BackendError::NotSupported {
            backend: self.name().to_string(),
            operation: "deleting translations",
        })
    }
}

/// Build the tree of one YAML document.
///
/// `name` identifies the document in errors and becomes each record's
/// source. Records are added first, then links are applied in document
/// order, then empty nodes are pruned.
pub fn parse_yaml(
    name: &str,
    group: &str,
    locale: &str,
    content: &str,
) -> Result<Tree, BackendError> {
    let documents = YamlLoader::load_from_str(content).map_err(|error| BackendError::Yaml {
        name: name.to_string(),
        line: error.marker().line(),
        column: error.marker().col() + 1,
        message: error.to_string(),
    })?;

    let mut importer = Importer {
        name,
        group,
        locale,
        tree: Tree::new(),
        links: Vec::new(),
    };
    for document in &documents {
        match document {
            Yaml::Hash(_) => importer.import(document, &mut Vec::new())?,
            Yaml::Null => {}
            _ => return Err(importer.invalid(&[], "a translation document must be a mapping")),
        }
    }

    let Importer {
        mut tree, links, ..
    } = importer;
    for (path, target) in links {
        tree.link(&path, &target)
            .map_err(|source| BackendError::Tree {
                name: name.to_string(),
                source,
            })?;
    }
    tree.prune();
    Ok(tree)
}

struct Importer<'a> {
    name: &'a str,
    group: &'a str,
    locale: &'a str,
    tree: Tree,
    links: Vec<(String, String)>,
}

impl Importer<'_> {
    fn import(&mut self, value: &Yaml, scope: &mut Vec<String>) -> Result<(), BackendError> {
        match value {
            Yaml::Hash(entries) => {
                for (key, value) in entries {
                    let key = scalar_text(key)
                        .ok_or_else(|| self.invalid(scope, "mapping keys must be scalars"))?;
                    if let Some(name) = key.strip_suffix('*') {
                        scope.push(name.to_string());
                        let plural = self.plural(value, scope)?;
                        self.add(scope, RecordContent::Plural(plural))?;
                        scope.pop();
                    } else if let Some(name) = key.strip_suffix('&') {
                        scope.push(name.to_string());
                        let target = scalar_text(value)
                            .ok_or_else(|| self.invalid(scope, "a link target must be a scalar"))?;
                        self.links.push((scope.join("."), target));
                        scope.pop();
                    } else {
                        scope.push(key);
                        self.import(value, scope)?;
                        scope.pop();
                    }
                }
                Ok(())
            }
            Yaml::String(_) | Yaml::Integer(_) | Yaml::Real(_) | Yaml::Boolean(_) => {
                let text = scalar_text(value).unwrap_or_default();
                let Some(last) = scope.pop() else {
                    return Err(self.invalid(scope, "a translation document must be a mapping"));
                };

                let content = if let Some(name) = last.strip_suffix('~') {
                    scope.push(name.to_string());
                    let template = parse_template(&text).map_err(|source| BackendError::Template {
                        name: self.name.to_string(),
                        scope: scope.join("."),
                        source,
                    })?;
                    RecordContent::Template(template)
                } else if let Some(name) = last.strip_suffix('@') {
                    scope.push(name.to_string());
                    RecordContent::Alias(text)
                } else {
                    scope.push(last);
                    RecordContent::Text(text)
                };
                self.add(scope, content)
            }
            Yaml::Null => Err(self.invalid(scope, "missing value")),
            Yaml::Array(_) | Yaml::Alias(_) | Yaml::BadValue => {
                Err(self.invalid(scope, "expected a mapping or a scalar"))
            }
        }
    }

    fn plural(&self, value: &Yaml, scope: &[String]) -> Result<Plural, BackendError> {
        let Yaml::Hash(cases) = value else {
            return Err(self.invalid(scope, "plural cases must be a mapping"));
        };

        let mut plural = Plural::new();
        for (key, value) in cases {
            let key = scalar_text(key)
                .ok_or_else(|| self.invalid(scope, "plural case keys must be scalars"))?;
            let text = scalar_text(value)
                .ok_or_else(|| self.invalid(scope, "plural case values must be scalars"))?;

            let (key, value) = match key.strip_suffix('~') {
                Some(key) => {
                    let template = parse_template(&text).map_err(|source| BackendError::Template {
                        name: self.name.to_string(),
                        scope: format!("{}.{key}", scope.join(".")),
                        source,
                    })?;
                    (key.to_string(), CaseValue::Template(template))
                }
                None => (key, CaseValue::Text(text)),
            };
            plural.add_case(case_key(&key), value);
        }
        Ok(plural)
    }

    fn add(&mut self, scope: &[String], content: RecordContent) -> Result<(), BackendError> {
        let record = TranslationRecord::builder()
            .key(scope.join("."))
            .content(content)
            .group(self.group)
            .locale(self.locale)
            .source(self.name.to_string())
            .build();
        self.tree
            .add(record)
            .map(|_| ())
            .map_err(|source| BackendError::Tree {
                name: self.name.to_string(),
                source,
            })
    }

    fn invalid(&self, scope: &[String], message: &str) -> BackendError {
        BackendError::InvalidValue {
            name: self.name.to_string(),
            scope: scope.join("."),
            message: message.to_string(),
        }
    }
}

fn scalar_text(value: &Yaml) -> Option<String> {
    match value {
        Yaml::String(text) | Yaml::Real(text) => Some(text.clone()),
        Yaml::Integer(n) => Some(n.to_string()),
        Yaml::Boolean(b) => Some(b.to_string()),
        Yaml::Null | Yaml::Array(_) | Yaml::Hash(_) | Yaml::Alias(_) | Yaml::BadValue => None,
    }
}

/// Numeric case keys are integer discriminators.
fn case_key(key: &str) -> CaseKey {
    match key.parse::<i64>() {
        Ok(n) => CaseKey::Int(n),
        Err(_) => CaseKey::from(key),
    }
}

/// Locale named by the last `.`-separated part of a file stem, canonicalized
/// (`users.pt-br.yaml` → `pt-BR`). A stem of `_` is the any-locale.
pub fn detect_locale(path: &Path) -> Option<String> {
    let stem = yaml_stem(path)?;
    let tag = stem.rsplit('.').next().unwrap_or(stem);
    if tag == ANY_LOCALE {
        return Some(ANY_LOCALE.to_string());
    }
    is_locale_tag(tag).then(|| canonical_locale(tag))
}

/// Group name with `.` replaced by `_`, so it cannot be confused with a key
/// separator.
pub fn format_group_name(name: &str) -> String {
    name.replace('.', "_")
}

fn group_of(root: &Path, path: &Path) -> Option<String> {
    let relative = path.parent()?.strip_prefix(root).ok()?;
    let parts: Vec<String> = relative
        .components()
        .map(|part| part.as_os_str().to_string_lossy().into_owned())
        .collect();
    if !parts.is_empty() {
        return Some(format_group_name(&parts.join(":")));
    }

    let stem = yaml_stem(path)?;
    let (prefix, _) = stem.rsplit_once('.')?;
    (!prefix.is_empty()).then(|| format_group_name(prefix))
}

fn yaml_stem(path: &Path) -> Option<&str> {
    let name = path.file_name()?.to_str()?;
    name.strip_suffix(".yaml")
        .or_else(|| name.strip_suffix(".yml"))
}

fn is_yaml(path: &Path) -> bool {
    yaml_stem(path).is_some()
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0 && entry.file_name().to_string_lossy().starts_with('.')
}
