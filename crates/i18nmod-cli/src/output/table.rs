//! Table formatting utilities for CLI output.

use comfy_table::{presets, ContentArrangement, Table};

/// Coverage data for one group in one locale.
pub struct GroupCoverage {
    pub group: String,
    /// Locale code (e.g., "de", "pt-BR").
    pub language: String,
    /// Number of source keys this locale resolves.
    pub translated: usize,
    /// Number of keys in the source locale.
    pub total: usize,
    /// Source keys this locale does not resolve.
    pub missing: Vec<String>,
}

/// Format coverage data as an ASCII table.
pub fn format_coverage_table(coverage: &[GroupCoverage]) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_BORDERS_ONLY);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Group", "Language", "Coverage", "Missing"]);

    for row in coverage {
        table.add_row(vec![
            row.group.clone(),
            row.language.clone(),
            format!("{}/{}", row.translated, row.total),
            row.missing.len().to_string(),
        ]);
    }

    table
}

/// Format `group.key [locale]  value` rows for the dump command.
pub fn format_dump_table(rows: &[(String, String, String)]) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_BORDERS_ONLY);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Key", "Locale", "Value"]);
    for (key, locale, value) in rows {
        table.add_row(vec![key.clone(), locale.clone(), value.clone()]);
    }
    table
}
