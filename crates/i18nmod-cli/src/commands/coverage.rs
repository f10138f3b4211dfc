//! Coverage command implementation.

use std::collections::BTreeSet;
use std::path::PathBuf;

use clap::Args;
use i18nmod::interpreter::canonical_locale;
use i18nmod::{Translator, ANY_LOCALE};
use miette::{IntoDiagnostic, Result};
use serde::Serialize;

use crate::commands::load_translator;
use crate::output::table::{format_coverage_table, GroupCoverage};

/// Arguments for the coverage command.
#[derive(Debug, Args)]
pub struct CoverageArgs {
    /// Directory of YAML translation files
    #[arg(env = "I18NMOD_DIR")]
    pub dir: PathBuf,

    /// Source locale every other locale is compared against. Defaults to the
    /// default locale.
    #[arg(long)]
    pub source: Option<String>,

    /// Locales to check coverage for (comma-separated). Defaults to every
    /// locale found.
    #[arg(long, value_delimiter = ',')]
    pub lang: Vec<String>,

    /// Exit with non-zero code if any translation is incomplete.
    #[arg(long)]
    pub strict: bool,

    /// Output results as JSON.
    #[arg(long)]
    pub json: bool,
}

/// JSON output format for coverage data.
#[derive(Debug, Serialize)]
struct CoverageJson<'a> {
    group: &'a str,
    language: &'a str,
    translated: usize,
    total: usize,
    missing: &'a [String],
}

/// Run the coverage command.
pub fn run_coverage(args: CoverageArgs, default_locale: &str) -> Result<i32> {
    let translator = load_translator(&args.dir, default_locale)?;
    let source = canonical_locale(args.source.as_deref().unwrap_or(default_locale));

    let languages: Vec<String> = if args.lang.is_empty() {
        let all: BTreeSet<String> = translator
            .groups()
            .iter()
            .flat_map(|group| translator.locales(group))
            .filter(|locale| *locale != source && locale != ANY_LOCALE)
            .collect();
        all.into_iter().collect()
    } else {
        args.lang.iter().map(|lang| canonical_locale(lang)).collect()
    };

    let coverage_data = collect_coverage(&translator, &source, &languages);
    let any_incomplete = coverage_data.iter().any(|c| !c.missing.is_empty());

    if args.json {
        let json_data: Vec<CoverageJson<'_>> = coverage_data
            .iter()
            .map(|c| CoverageJson {
                group: &c.group,
                language: &c.language,
                translated: c.translated,
                total: c.total,
                missing: &c.missing,
            })
            .collect();

        let json_output = serde_json::to_string_pretty(&json_data).into_diagnostic()?;
        println!("{json_output}");
    } else {
        println!("{}", format_coverage_table(&coverage_data));

        for row in &coverage_data {
            if !row.missing.is_empty() {
                println!("\nMissing in {} ({}):", row.group, row.language);
                for key in &row.missing {
                    println!("  - {key}");
                }
            }
        }
    }

    if args.strict && any_incomplete {
        Ok(exitcode::DATAERR)
    } else {
        Ok(exitcode::OK)
    }
}

/// Compare each group's `source` keys against every language. Keys available
/// to any locale count as translated everywhere.
fn collect_coverage(
    translator: &Translator,
    source: &str,
    languages: &[String],
) -> Vec<GroupCoverage> {
    let mut coverage = Vec::new();
    for group in translator.groups() {
        let source_keys = translator.keys(&group, source);
        if source_keys.is_empty() {
            continue;
        }
        let shared: BTreeSet<String> = translator.keys(&group, ANY_LOCALE).into_iter().collect();

        for language in languages {
            let present: BTreeSet<String> =
                translator.keys(&group, language).into_iter().collect();
            let missing: Vec<String> = source_keys
                .iter()
                .filter(|key| !present.contains(*key) && !shared.contains(*key))
                .cloned()
                .collect();

            coverage.push(GroupCoverage {
                group: group.clone(),
                language: language.clone(),
                translated: source_keys.len() - missing.len(),
                total: source_keys.len(),
                missing,
            });
        }
    }
    coverage
}
