//! Implementation of the `i18nmod get` command.

use std::path::PathBuf;

use i18nmod::{TranslationKey, Translator, Value};
use miette::IntoDiagnostic;
use owo_colors::OwoColorize;
use serde::Serialize;

use crate::commands::load_translator;

/// Arguments for the get command.
#[derive(Debug, clap::Args)]
pub struct GetArgs {
    /// Directory of YAML translation files
    #[arg(env = "I18NMOD_DIR")]
    pub dir: PathBuf,

    /// Locale to resolve in (e.g., en, pt-BR)
    #[arg(long, env = "I18NMOD_LANG")]
    pub lang: String,

    /// Key to resolve (e.g., users.greeting, users.items+)
    #[arg(long, required = true)]
    pub key: String,

    /// Count used to pick a plural case
    #[arg(long)]
    pub count: Option<String>,

    /// Template data in name=value format (repeatable)
    #[arg(short = 'p', long = "param", value_parser = parse_key_val)]
    pub params: Vec<(String, String)>,

    /// Value used when no locale has the key
    #[arg(long)]
    pub default: Option<String>,

    /// Render the default as a template
    #[arg(long)]
    pub template: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// JSON output for get results.
#[derive(Serialize)]
pub struct GetResult {
    pub key: String,
    pub value: String,
    pub locale: Option<String>,
    pub found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Parse a key=value parameter string.
fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid parameter format '{s}': expected name=value"))?;
    Ok((name.to_string(), value.to_string()))
}

/// Integers become numbers, everything else a string.
fn parse_value(s: &str) -> Value {
    match s.parse::<i64>() {
        Ok(n) => Value::from(n),
        Err(_) => Value::from(s),
    }
}

/// Run the get command.
pub fn run_get(args: GetArgs, default_locale: &str) -> miette::Result<i32> {
    let translator = load_translator(&args.dir, default_locale)?;
    let context = translator.context_with_default(&args.lang, default_locale);

    let mut request = context.t(&args.key);
    for (name, value) in &args.params {
        request = request.param(name, parse_value(value));
    }
    if let Some(count) = &args.count {
        request = request.count(parse_value(count));
    }
    if let Some(default) = &args.default {
        request = request.default(default.as_str());
    }
    if args.template {
        request = request.as_template();
    }

    let (resolution, value) = request.resolve_and_get();
    let error = resolution.error().map(ToString::to_string);

    if args.json {
        let output = GetResult {
            key: args.key.clone(),
            value,
            locale: resolution.locale().map(ToString::to_string),
            found: resolution.is_found(),
            error: error.clone(),
        };
        let json = serde_json::to_string_pretty(&output).into_diagnostic()?;
        println!("{json}");
    } else if let Some(error) = &error {
        eprintln!("{} {error}", "error:".red());
    } else {
        println!("{value}");
        if !resolution.is_found() {
            let suggestions = suggest(&translator, request.key(), context.locales());
            if !suggestions.is_empty() {
                eprintln!(
                    "{} no translation found; did you mean {}?",
                    "help:".yellow(),
                    suggestions.join(", ")
                );
            }
        }
    }

    if error.is_some() {
        Ok(exitcode::DATAERR)
    } else {
        Ok(exitcode::OK)
    }
}

/// Close keys of the same group in the first locale that has any.
fn suggest(translator: &Translator, key: &TranslationKey, locales: &[String]) -> Vec<String> {
    locales
        .iter()
        .map(|locale| translator.suggest(key.group(), locale, key.name()))
        .find(|suggestions| !suggestions.is_empty())
        .unwrap_or_default()
        .into_iter()
        .map(|name| format!("{}.{name}", key.group()))
        .collect()
}
