//! `lia filter`: reduce an aggregate file to recent, on-topic posts.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Utc;
use clap::Args;
use lia_core::AppConfig;
use lia_filter::{filter_document, DeepseekClient};
use lia_scraper::{open_store, write_document, StoreEncoding};

#[derive(Debug, Args)]
pub struct FilterArgs {
    /// Aggregate file to read, json or ndjson [default: <output dir>/all.json]
    #[arg(long, short = 'i')]
    pub input: Option<PathBuf>,

    /// Where to write the filtered document [default: <output dir>/filtered.json]
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Classifier base URL; overrides DEEPSEEK_BASE_URL
    #[arg(long)]
    pub base_url: Option<String>,

    /// Classifier model; overrides DEEPSEEK_MODEL
    #[arg(long)]
    pub model: Option<String>,

    /// Skip the remote classifier and use the keyword heuristic only
    #[arg(long)]
    pub no_llm: bool,
}

/// Runs the filter subcommand.
///
/// # Errors
///
/// Returns an error if the input file is missing, the classifier client
/// cannot be built, or the output cannot be written.
pub(crate) async fn run(config: &AppConfig, args: FilterArgs) -> anyhow::Result<()> {
    let input = args
        .input
        .clone()
        .unwrap_or_else(|| config.aggregate_path(false));
    let output = args.output.clone().unwrap_or_else(|| config.filtered_path());

    if !input.is_file() {
        anyhow::bail!("input file {} does not exist", input.display());
    }
    let document = open_store(&input, encoding_for_path(&input)).snapshot()?;

    let classifier = build_classifier(config, &args)?;
    if classifier.is_none() {
        tracing::info!("relevance decided by keyword heuristic");
    }

    let outcome = filter_document(&document, classifier.as_ref(), Utc::now()).await;
    write_document(&output, &outcome.document)?;

    eprintln!(
        "Filtered posts: {} -> {}",
        outcome.stats.posts_before, outcome.stats.posts_after
    );
    println!("Wrote: {}", output.display());
    Ok(())
}

/// Store encoding implied by a file's extension; anything but
/// `.ndjson`/`.jsonl` is read as a single document.
pub(crate) fn encoding_for_path(path: &Path) -> StoreEncoding {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("ndjson") || ext.eq_ignore_ascii_case("jsonl") => {
            StoreEncoding::Lines
        }
        _ => StoreEncoding::Document,
    }
}

/// The remote classifier, unless disabled or no API key is configured.
pub(crate) fn build_classifier(
    config: &AppConfig,
    args: &FilterArgs,
) -> anyhow::Result<Option<DeepseekClient>> {
    if args.no_llm {
        return Ok(None);
    }
    let Some(api_key) = config.deepseek_api_key.as_deref() else {
        tracing::warn!("DEEPSEEK_API_KEY not set; falling back to keyword heuristic");
        return Ok(None);
    };

    let client = DeepseekClient::new(
        api_key,
        args.model.as_deref().unwrap_or(&config.deepseek_model),
        args.base_url.as_deref().unwrap_or(&config.deepseek_base_url),
        Duration::from_secs(config.classifier_timeout_secs),
    )?;
    Ok(Some(client))
}
