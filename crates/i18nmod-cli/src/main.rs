//! i18nmod CLI entry point.
//!
//! Provides command-line tools for working with directories of YAML
//! translation files:
//! - `i18nmod check` - Validate every translation file
//! - `i18nmod coverage` - Report missing keys per group and locale
//! - `i18nmod get` - Resolve one key the way an application would
//! - `i18nmod dump` - Print the loaded lookup tables

mod commands;
mod output;

use std::io::stderr;
use std::process::exit;

use clap::{Parser, Subcommand, ValueEnum};
use commands::{
    run_check, run_coverage, run_dump, run_get, CheckArgs, CoverageArgs, DumpArgs, GetArgs,
};
use tracing_subscriber::EnvFilter;

/// i18nmod translation file tools.
#[derive(Debug, Parser)]
#[command(name = "i18nmod")]
#[command(about = "i18nmod translation file tools", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Color output control
    #[arg(long, value_enum, default_value_t = ColorWhen::Auto, global = true)]
    pub color: ColorWhen,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Locale consulted after the requested one
    #[arg(long, env = "I18NMOD_DEFAULT_LOCALE", default_value = "en", global = true)]
    pub default_locale: String,

    #[command(subcommand)]
    pub command: Commands,
}

/// When to use colored output.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ColorWhen {
    Auto,
    Always,
    Never,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Check every YAML translation file in a directory
    Check(CheckArgs),
    /// Report translation coverage across locales
    Coverage(CoverageArgs),
    /// Resolve a single translation key
    Get(GetArgs),
    /// Print the loaded lookup tables
    Dump(DumpArgs),
}

/// Set up color output based on user preference.
fn setup_colors(color_when: ColorWhen) {
    match color_when {
        ColorWhen::Auto => {
            // owo-colors automatically checks TTY, NO_COLOR, FORCE_COLOR
        }
        ColorWhen::Always => {
            owo_colors::set_override(true);
        }
        ColorWhen::Never => {
            owo_colors::set_override(false);
        }
    }
}

/// Log to stderr; `RUST_LOG` overrides the verbosity flag.
fn setup_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(stderr)
        .with_target(false)
        .init();
}

fn main() -> miette::Result<()> {
    let cli = Cli::parse();
    setup_colors(cli.color);
    setup_tracing(cli.verbose);

    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .build(),
        )
    }))?;

    let result = match cli.command {
        Commands::Check(args) => run_check(args),
        Commands::Coverage(args) => run_coverage(args, &cli.default_locale),
        Commands::Get(args) => run_get(args, &cli.default_locale),
        Commands::Dump(args) => run_dump(args, &cli.default_locale),
    };

    match result {
        Ok(code) => exit(code),
        Err(e) => {
            eprintln!("{e:?}");
            exit(exitcode::SOFTWARE);
        }
    }
}
