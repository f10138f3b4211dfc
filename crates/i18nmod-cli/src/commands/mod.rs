//! CLI command implementations.

mod check;
mod coverage;
mod dump;
mod get;

use std::path::Path;
use std::sync::Arc;

use i18nmod::{Registry, Translator, YamlBackend};
use miette::{IntoDiagnostic, Result, WrapErr};

pub use check::{run_check, CheckArgs};
pub use coverage::{run_coverage, CoverageArgs};
pub use dump::{run_dump, DumpArgs};
pub use get::{run_get, GetArgs};

/// Load and preload every YAML file below `dir`.
fn load_translator(dir: &Path, default_locale: &str) -> Result<Arc<Translator>> {
    let mut registry = Registry::new();
    registry.set_default_locale(default_locale);
    registry.register_path(dir);

    let backend = YamlBackend::from_registry(&registry)
        .into_diagnostic()
        .wrap_err_with(|| format!("failed to scan {}", dir.display()))?;

    let translator = Arc::new(Translator::builder().registry(registry).build());
    translator.add_backend(backend);
    translator
        .preload_all()
        .into_diagnostic()
        .wrap_err("failed to load translations; run `i18nmod check` for details")?;
    Ok(translator)
}
