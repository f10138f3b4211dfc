//! Implementation of the `i18nmod check` command.

use std::path::PathBuf;

use clap::Args;
use i18nmod::backend::parse_yaml;
use i18nmod::YamlBackend;
use miette::{miette, IntoDiagnostic, Report, Result, WrapErr};
use owo_colors::OwoColorize;
use serde::Serialize;

use crate::output::YamlDiagnostic;

/// Arguments for the check command.
#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Directory of YAML translation files
    #[arg(env = "I18NMOD_DIR")]
    pub dir: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// One invalid translation file.
#[derive(Debug, Serialize)]
struct CheckProblem {
    file: String,
    group: String,
    locale: String,
    error: String,
}

/// Run the check command.
pub fn run_check(args: CheckArgs) -> Result<i32> {
    let mut backend = YamlBackend::new();
    let files = backend
        .load_dir(&args.dir)
        .into_diagnostic()
        .wrap_err_with(|| format!("failed to scan {}", args.dir.display()))?;

    let mut problems = Vec::new();
    for (group, locale, source) in backend.all_sources() {
        let name = source.name();
        let failure = match source.read() {
            Ok(content) => parse_yaml(&name, group, locale, &content)
                .err()
                .map(|error| {
                    let report = Report::new(YamlDiagnostic::from_backend_error(
                        &name, &content, &error,
                    ));
                    (error, report)
                }),
            Err(error) => {
                let report = miette!("{error}");
                Some((error, report))
            }
        };

        if let Some((error, report)) = failure {
            if !args.json {
                eprintln!("{report:?}");
            }
            tracing::debug!(file = %name, group, locale, "invalid translation file");
            problems.push(CheckProblem {
                file: name.into_owned(),
                group: group.to_string(),
                locale: locale.to_string(),
                error: error.to_string(),
            });
        }
    }

    if args.json {
        let output = serde_json::to_string_pretty(&problems).into_diagnostic()?;
        println!("{output}");
    } else if problems.is_empty() {
        println!("{} {files} files checked", "✓".green());
    } else {
        println!(
            "{} {} of {files} files invalid",
            "✗".red(),
            problems.len()
        );
    }

    if problems.is_empty() {
        Ok(exitcode::OK)
    } else {
        Ok(exitcode::DATAERR)
    }
}
