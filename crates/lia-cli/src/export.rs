//! `lia export`: turn a filtered document into a one-row-per-profile CSV.

use std::path::PathBuf;

use clap::Args;
use lia_core::AppConfig;
use lia_filter::{write_table, DEFAULT_SNIPPET_CHARS};
use lia_scraper::open_store;

use crate::filter::encoding_for_path;

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Filtered document to read [default: <output dir>/filtered.json]
    #[arg(long, short = 'i')]
    pub input: Option<PathBuf>,

    /// CSV file to write [default: <output dir>/filtered.csv]
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Longest post snippet in characters; 0 keeps the full text
    #[arg(long, default_value_t = DEFAULT_SNIPPET_CHARS)]
    pub max_chars: usize,
}

/// Runs the export subcommand.
///
/// # Errors
///
/// Returns an error if the input file is missing or the table cannot be
/// written.
pub(crate) fn run(config: &AppConfig, args: &ExportArgs) -> anyhow::Result<()> {
    let input = args.input.clone().unwrap_or_else(|| config.filtered_path());
    let output = args.output.clone().unwrap_or_else(|| config.table_path());

    if !input.is_file() {
        anyhow::bail!("input file {} does not exist", input.display());
    }
    let document = open_store(&input, encoding_for_path(&input)).snapshot()?;

    write_table(&output, &document, args.max_chars)?;
    tracing::info!(profiles = document.profiles.len(), output = %output.display(), "exported table");
    println!("Wrote CSV: {}", output.display());
    Ok(())
}
