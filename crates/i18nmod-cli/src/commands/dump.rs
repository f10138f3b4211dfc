//! Implementation of the `i18nmod dump` command.

use std::path::PathBuf;

use i18nmod::types::{ContentView, RecordView};
use miette::IntoDiagnostic;

use crate::commands::load_translator;
use crate::output::table::format_dump_table;

/// Arguments for the dump command.
#[derive(Debug, clap::Args)]
pub struct DumpArgs {
    /// Directory of YAML translation files
    #[arg(env = "I18NMOD_DIR")]
    pub dir: PathBuf,

    /// Only dump this group
    #[arg(long)]
    pub group: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Run the dump command.
pub fn run_dump(args: DumpArgs, default_locale: &str) -> miette::Result<i32> {
    let translator = load_translator(&args.dir, default_locale)?;
    let mut snapshot = translator.snapshot();
    if let Some(group) = &args.group {
        snapshot.groups.retain(|name, _| name == group);
    }

    if args.json {
        let output = serde_json::to_string_pretty(&snapshot).into_diagnostic()?;
        println!("{output}");
        return Ok(exitcode::OK);
    }

    let mut rows = Vec::new();
    for (group, locales) in &snapshot.groups {
        for (locale, keys) in locales {
            for (key, record) in keys {
                rows.push((format!("{group}.{key}"), locale.clone(), describe(record)));
            }
        }
    }
    rows.sort();
    println!("{}", format_dump_table(&rows));
    Ok(exitcode::OK)
}

/// One-line rendering of a record: templates are marked `~`, aliases `@`,
/// plural cases `*`.
fn describe(record: &RecordView) -> String {
    match &record.content {
        ContentView::Text { value } => value.clone(),
        ContentView::Template { source } => format!("~ {source}"),
        ContentView::Alias { target } => format!("@ {target}"),
        ContentView::Plural { cases } => {
            let cases: Vec<String> = cases
                .iter()
                .map(|case| format!("{}={}", case.key, case.value))
                .collect();
            format!("* {}", cases.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use i18nmod::types::CaseView;

    use super::*;

    #[test]
    fn test_describe_records() {
        let plural = RecordView {
            source: None,
            content: ContentView::Plural {
                cases: vec![
                    CaseView {
                        key: "one".to_string(),
                        value: "item".to_string(),
                        template: false,
                    },
                    CaseView {
                        key: "other".to_string(),
                        value: "items".to_string(),
                        template: false,
                    },
                ],
            },
        };
        assert_eq!(describe(&plural), "* one=item, other=items");

        let alias = RecordView {
            source: Some("en.yaml".to_string()),
            content: ContentView::Alias {
                target: ".x".to_string(),
            },
        };
        assert_eq!(describe(&alias), "@ .x");
    }
}
