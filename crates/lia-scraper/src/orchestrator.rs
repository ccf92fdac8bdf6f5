//! Sequential, resumable scrape over a list of profile URLs.
//!
//! Profiles already present in the aggregate store are skipped. Every newly
//! scraped profile is committed before the next one starts, so stopping the
//! process between profiles never loses finished work.

use std::time::Duration;

use lia_core::ProfileRecord;

use crate::driver::PageDriver;
use crate::error::ScraperError;
use crate::extract::{scrape_profile, HARD_POST_LIMIT};
use crate::pacing::{jitter_sleep, Pacing};
use crate::selectors::{FEED_URL, LOGIN_FORM_MARKER};
use crate::store::AggregateStore;

/// Blocks until a human operator confirms the browser session is signed in.
pub trait OperatorPrompt {
    fn wait_for_login(&mut self);
}

/// Prompt that never blocks; used for headless and unattended runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPrompt;

impl OperatorPrompt for NoPrompt {
    fn wait_for_login(&mut self) {}
}

#[derive(Debug, Clone)]
pub struct ScrapeOptions {
    /// Posts per profile; clamped to [`HARD_POST_LIMIT`].
    pub limit: usize,
    /// Headless runs never wait for a manual login.
    pub headless: bool,
    /// Record profiles that yielded zero posts so later runs skip them.
    pub record_empty_profiles: bool,
    /// Bound on waiting for the first post container of a profile.
    pub container_wait: Duration,
    pub pacing: Pacing,
}

impl Default for ScrapeOptions {
    fn default() -> Self {
        Self {
            limit: HARD_POST_LIMIT,
            headless: false,
            record_empty_profiles: true,
            container_wait: Duration::from_secs(8),
            pacing: Pacing::default(),
        }
    }
}

/// Counters for one scrape run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ScrapeSummary {
    pub total: usize,
    /// Already present in the store.
    pub skipped: usize,
    /// Newly written to the store.
    pub recorded: usize,
    /// Scraped but yielded no posts.
    pub empty: usize,
    /// Could not be opened; left for the next run.
    pub failed: usize,
    pub posts: usize,
}

/// Scrapes every profile in `urls` not yet in `store`, in order.
///
/// The session check runs once, just before the first profile that actually
/// needs scraping. A profile whose page cannot be opened is logged and left
/// out of the store.
///
/// # Errors
///
/// Returns [`ScraperError::Store`] if a record cannot be persisted; the
/// run stops there and everything recorded so far stays on disk.
pub async fn run_scrape<D, S, P>(
    driver: &mut D,
    store: &mut S,
    urls: &[String],
    options: &ScrapeOptions,
    prompt: &mut P,
) -> Result<ScrapeSummary, ScraperError>
where
    D: PageDriver,
    S: AggregateStore + ?Sized,
    P: OperatorPrompt,
{
    let limit = options.limit.min(HARD_POST_LIMIT);
    let total = urls.len();
    let mut summary = ScrapeSummary {
        total,
        ..ScrapeSummary::default()
    };
    let mut session_checked = false;

    for (idx, profile_url) in urls.iter().enumerate() {
        let position = idx + 1;

        if store.contains(profile_url) {
            tracing::info!(position, total, profile = %profile_url, "skipping already scraped profile");
            summary.skipped += 1;
            continue;
        }

        if !session_checked {
            ensure_logged_in(driver, options.headless, prompt).await;
            session_checked = true;
        }

        tracing::info!(position, total, profile = %profile_url, "scraping profile");

        let posts = match scrape_profile(
            driver,
            profile_url,
            limit,
            options.container_wait,
            &options.pacing,
        )
        .await
        {
            Ok(posts) => posts,
            Err(e) => {
                tracing::warn!(
                    profile = %profile_url,
                    error = %e,
                    "failed to open profile; it will be retried on the next run"
                );
                summary.failed += 1;
                continue;
            }
        };

        if posts.is_empty() {
            summary.empty += 1;
            if !options.record_empty_profiles {
                tracing::info!(profile = %profile_url, "no posts found; not recording");
                jitter_sleep(options.pacing.between_profiles).await;
                continue;
            }
        }

        let post_count = posts.len();
        store.append(ProfileRecord {
            profile_url: profile_url.clone(),
            posts,
        })?;
        summary.recorded += 1;
        summary.posts += post_count;
        tracing::info!(profile = %profile_url, posts = post_count, "profile recorded");

        jitter_sleep(options.pacing.between_profiles).await;
    }

    tracing::info!(
        total = summary.total,
        skipped = summary.skipped,
        recorded = summary.recorded,
        empty = summary.empty,
        failed = summary.failed,
        posts = summary.posts,
        "scrape run finished"
    );
    Ok(summary)
}

/// Opens the main feed and, if a sign-in form shows up in an interactive
/// session, waits for the operator. Never fails the run.
async fn ensure_logged_in<D, P>(driver: &mut D, headless: bool, prompt: &mut P)
where
    D: PageDriver,
    P: OperatorPrompt,
{
    if let Err(e) = driver.navigate(FEED_URL).await {
        tracing::warn!(error = %e, "could not open the feed for the session check");
        return;
    }

    let login_required = match driver.count(LOGIN_FORM_MARKER).await {
        Ok(n) => n > 0,
        Err(e) => {
            tracing::debug!(error = %e, "login form check failed");
            false
        }
    };

    if !login_required {
        return;
    }
    if headless {
        tracing::warn!("sign-in form detected in headless mode; continuing without login");
    } else {
        tracing::info!("sign-in form detected; waiting for operator");
        prompt.wait_for_login();
    }
}
