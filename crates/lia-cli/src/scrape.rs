//! `lia scrape`: drive a browser session over a profile list and append
//! each profile's latest posts to the aggregate file.

use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use lia_core::{
    load_profile_urls, load_profile_urls_csv, parse_profile_urls, AppConfig, DEFAULT_URL_COLUMN,
};
use lia_scraper::{
    open_store, run_scrape, OperatorPrompt, Pacing, ScrapeOptions, StoreEncoding,
    WebDriverConfig, WebDriverPage, HARD_POST_LIMIT,
};

#[derive(Debug, Args)]
pub struct ScrapeArgs {
    /// File with one profile URL per line (`#` starts a comment)
    #[arg(long)]
    pub urls: Option<PathBuf>,

    /// CSV export with one profile URL per row
    #[arg(long)]
    pub csv: Option<PathBuf>,

    /// Header of the URL column in --csv; matched ignoring case and spacing
    #[arg(long, default_value = DEFAULT_URL_COLUMN)]
    pub url_column: String,

    /// Extra profile URL to scrape; repeatable
    #[arg(long = "url", value_name = "URL")]
    pub extra_urls: Vec<String>,

    /// Aggregate file to append to [default: <output dir>/all.json or all.ndjson]
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Aggregate file encoding: json or ndjson
    #[arg(long, default_value = "json")]
    pub format: StoreEncoding,

    /// Posts to take per profile (1 to 3)
    #[arg(long, default_value_t = HARD_POST_LIMIT, value_parser = parse_limit)]
    pub limit: usize,

    /// Run the browser without a window; never waits for a manual login
    #[arg(long)]
    pub headless: bool,

    /// Leave profiles that yield no posts unrecorded so the next run retries them
    #[arg(long)]
    pub retry_empty: bool,
}

/// A per-profile post count between 1 and the hard cap.
fn parse_limit(raw: &str) -> Result<usize, String> {
    let limit: usize = raw
        .parse()
        .map_err(|_| format!("`{raw}` is not a number"))?;
    if (1..=HARD_POST_LIMIT).contains(&limit) {
        Ok(limit)
    } else {
        Err(format!("must be between 1 and {HARD_POST_LIMIT}"))
    }
}

/// Waits for the operator to press Enter after signing in.
pub(crate) struct ConsolePrompt<R> {
    pub input: R,
}

impl<R: BufRead> OperatorPrompt for ConsolePrompt<R> {
    fn wait_for_login(&mut self) {
        eprint!("Sign in to LinkedIn in the browser window, then press Enter to continue... ");
        let _ = std::io::stderr().flush();
        // The runtime worker hands its other tasks off while the read blocks.
        let read = tokio::task::block_in_place(|| {
            let mut line = String::new();
            self.input.read_line(&mut line)
        });
        if let Err(e) = read {
            tracing::warn!(error = %e, "could not read operator confirmation; continuing");
        }
    }
}

/// Runs the scrape subcommand.
///
/// # Errors
///
/// Returns an error if no URL can be loaded, the WebDriver session cannot be
/// started, or the aggregate file cannot be written.
pub(crate) async fn run(config: &AppConfig, args: ScrapeArgs) -> anyhow::Result<()> {
    let urls = collect_urls(&args)?;
    let out = args
        .out
        .clone()
        .unwrap_or_else(|| config.aggregate_path(args.format == StoreEncoding::Lines));
    let options = scrape_options(config, &args);

    let mut store = open_store(&out, args.format);
    tracing::info!(
        profiles = urls.len(),
        known = store.known_count(),
        out = %out.display(),
        format = %args.format,
        "starting scrape"
    );

    let driver_config = WebDriverConfig {
        headless: args.headless,
        action_timeout: Duration::from_secs(config.driver_timeout_secs),
        ..WebDriverConfig::new(config.webdriver_url.clone(), config.user_data_dir.clone())
    };
    let mut page = WebDriverPage::connect(&driver_config).await?;

    let mut prompt = ConsolePrompt {
        input: std::io::BufReader::new(std::io::stdin()),
    };
    let result = run_scrape(&mut page, &mut *store, &urls, &options, &mut prompt).await;

    if let Err(e) = page.close().await {
        tracing::warn!(error = %e, "failed to close WebDriver session");
    }
    let summary = result?;

    println!(
        "Recorded {} of {} profiles ({} posts; {} already done, {} empty, {} failed). Wrote: {}",
        summary.recorded,
        summary.total,
        summary.posts,
        summary.skipped,
        summary.empty,
        summary.failed,
        out.display()
    );
    Ok(())
}

/// Merges the URL list file, the CSV column and `--url` entries into one
/// normalized, duplicate-free list.
pub(crate) fn collect_urls(args: &ScrapeArgs) -> anyhow::Result<Vec<String>> {
    let mut entries = Vec::new();
    if let Some(path) = args.urls.as_deref() {
        entries.extend(load_profile_urls(path)?);
    }
    if let Some(path) = args.csv.as_deref() {
        entries.extend(load_profile_urls_csv(path, &args.url_column)?);
    }
    entries.extend(args.extra_urls.iter().cloned());

    let urls = parse_profile_urls(entries.iter().map(String::as_str));
    if urls.is_empty() {
        anyhow::bail!("no profile URLs given; pass --urls <file>, --csv <file> or --url <profile>");
    }
    Ok(urls)
}

pub(crate) fn scrape_options(config: &AppConfig, args: &ScrapeArgs) -> ScrapeOptions {
    ScrapeOptions {
        limit: args.limit,
        headless: args.headless,
        record_empty_profiles: config.record_empty_profiles && !args.retry_empty,
        container_wait: Duration::from_secs(config.container_wait_secs),
        pacing: Pacing::default(),
    }
}
