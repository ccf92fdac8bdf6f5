//! Post extraction from a profile's recent-activity feed.
//!
//! Only the top of the feed is read: a few bounded scrolls make sure enough
//! containers are rendered, then the first `limit` containers are processed
//! exactly once each. Any failing sub-step leaves its field empty instead of
//! failing the profile.

use std::collections::HashSet;
use std::time::Duration;

use lia_core::{to_recent_activity, Post};

use crate::driver::PageDriver;
use crate::error::DriverError;
use crate::pacing::{jitter_sleep, Pacing};
use crate::selectors::{
    COPY_LINK_LABEL, MENU_TRIGGER, POST_CONTAINER, POST_CONTENT_FALLBACK, POST_CONTENT_PRIMARY,
    POST_TIME_FALLBACK, POST_TIME_PRIMARY, SEE_MORE_LABEL,
};

/// No more than this many posts are taken per profile, whatever the caller asks.
pub const HARD_POST_LIMIT: usize = 3;

/// Scroll attempts made while fewer than `limit` containers are rendered.
const ENSURE_SCROLL_ATTEMPTS: usize = 4;
const SCROLL_STEP_PX: i64 = 2_000;

/// Opens a profile's recent-activity view and extracts its latest posts.
///
/// Returns an empty list when no post container becomes visible within
/// `container_wait`.
///
/// # Errors
///
/// Returns [`DriverError`] only if navigation itself fails; every later
/// failure is absorbed.
pub async fn scrape_profile<D: PageDriver>(
    driver: &mut D,
    profile_url: &str,
    limit: usize,
    container_wait: Duration,
    pacing: &Pacing,
) -> Result<Vec<Post>, DriverError> {
    driver.navigate(&to_recent_activity(profile_url)).await?;

    match driver.wait_visible(POST_CONTAINER, container_wait).await {
        Ok(true) => {}
        Ok(false) => {
            tracing::warn!(profile = %profile_url, "no post containers became visible");
            return Ok(Vec::new());
        }
        Err(e) => {
            tracing::warn!(profile = %profile_url, error = %e, "waiting for post containers failed");
            return Ok(Vec::new());
        }
    }

    Ok(collect_top_posts(driver, limit, pacing).await)
}

/// Extracts up to `limit` (capped at [`HARD_POST_LIMIT`]) posts from the page
/// as it is currently rendered.
///
/// Containers yielding no link, content or timestamp are skipped, as are
/// containers whose link was already captured earlier in this call.
pub async fn collect_top_posts<D: PageDriver>(
    driver: &mut D,
    limit: usize,
    pacing: &Pacing,
) -> Vec<Post> {
    let limit = limit.min(HARD_POST_LIMIT);
    if limit == 0 {
        return Vec::new();
    }

    ensure_rendered(driver, limit, pacing).await;

    let containers = match driver.find_all(POST_CONTAINER).await {
        Ok(containers) => containers,
        Err(e) => {
            tracing::warn!(error = %e, "failed to enumerate post containers");
            return Vec::new();
        }
    };

    let top_n = containers.len().min(limit);
    let mut posts = Vec::with_capacity(top_n);
    let mut seen_links: HashSet<String> = HashSet::new();

    for (index, container) in containers.iter().take(top_n).enumerate() {
        if let Err(e) = driver.scroll_into_view(container).await {
            tracing::debug!(index, error = %e, "scroll into view failed");
        }

        let link = copy_link(driver, container).await.unwrap_or_default();
        let content = extract_content(driver, container).await;
        let timestamp = extract_timestamp(driver, container).await;

        let post = Post {
            link,
            content,
            timestamp,
        };
        if post.is_blank() {
            tracing::debug!(index, "container yielded nothing, skipping");
            continue;
        }
        if !post.link.is_empty() && !seen_links.insert(post.link.clone()) {
            tracing::debug!(index, link = %post.link, "duplicate link, skipping");
            continue;
        }

        posts.push(post);
        jitter_sleep(pacing.between_posts).await;
    }

    posts
}

/// Scrolls a bounded number of times until at least `limit` containers exist.
async fn ensure_rendered<D: PageDriver>(driver: &mut D, limit: usize, pacing: &Pacing) {
    for _ in 0..ENSURE_SCROLL_ATTEMPTS {
        match driver.count(POST_CONTAINER).await {
            Ok(n) if n >= limit => return,
            Ok(_) => {}
            Err(e) => tracing::debug!(error = %e, "counting post containers failed"),
        }
        if let Err(e) = driver.scroll_by(SCROLL_STEP_PX).await {
            tracing::debug!(error = %e, "scroll failed");
        }
        jitter_sleep(pacing.scroll).await;
    }
}

/// Copies the post permalink through the control menu and reads it back
/// from the clipboard.
///
/// The clipboard is cleared and sampled before the menu opens; a read-back
/// equal to that sample means the copy never landed and yields no link.
async fn copy_link<D: PageDriver>(driver: &mut D, container: &D::Element) -> Option<String> {
    if let Err(e) = driver.clear_clipboard().await {
        tracing::debug!(error = %e, "clipboard clear before copy failed");
    }
    let before = match driver.read_clipboard().await {
        Ok(text) => Some(text.trim().to_string()),
        Err(e) => {
            tracing::debug!(error = %e, "clipboard sample before copy failed");
            None
        }
    };

    let trigger = match driver.find_within(container, MENU_TRIGGER).await {
        Ok(Some(trigger)) => trigger,
        Ok(None) => return None,
        Err(e) => {
            tracing::debug!(error = %e, "menu trigger lookup failed");
            return None;
        }
    };
    if let Err(e) = driver.scroll_into_view(&trigger).await {
        tracing::debug!(error = %e, "scrolling menu trigger failed");
    }
    if let Err(e) = driver.click(&trigger).await {
        tracing::debug!(error = %e, "opening post menu failed");
        return None;
    }

    if !click_copy_item(driver).await {
        return None;
    }

    match driver.read_clipboard().await {
        Ok(text) => {
            let link = text.trim();
            if link.is_empty() {
                return None;
            }
            if before.as_deref() == Some(link) {
                tracing::debug!(link, "clipboard unchanged after copy, ignoring stale link");
                return None;
            }
            Some(link.to_string())
        }
        Err(e) => {
            tracing::debug!(error = %e, "clipboard read failed");
            None
        }
    }
}

/// Clicks the copy-link menu item: accessible-role lookup first, then a
/// plain text match. The menu is rendered at page level, outside the post.
async fn click_copy_item<D: PageDriver>(driver: &mut D) -> bool {
    match driver.find_by_role(None, "menuitem", COPY_LINK_LABEL).await {
        Ok(Some(item)) => match driver.click(&item).await {
            Ok(()) => return true,
            Err(e) => tracing::debug!(error = %e, "copy-link menu item click failed"),
        },
        Ok(None) => {}
        Err(e) => tracing::debug!(error = %e, "copy-link role lookup failed"),
    }

    match driver.find_by_text(COPY_LINK_LABEL).await {
        Ok(Some(item)) => match driver.click(&item).await {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!(error = %e, "copy-link text fallback click failed");
                false
            }
        },
        Ok(None) => false,
        Err(e) => {
            tracing::debug!(error = %e, "copy-link text lookup failed");
            false
        }
    }
}

async fn extract_content<D: PageDriver>(driver: &mut D, container: &D::Element) -> String {
    for selector in [POST_CONTENT_PRIMARY, POST_CONTENT_FALLBACK] {
        let element = match driver.find_within(container, selector).await {
            Ok(Some(element)) => element,
            Ok(None) => continue,
            Err(e) => {
                tracing::debug!(selector, error = %e, "content lookup failed");
                continue;
            }
        };

        expand_see_more(driver, container).await;

        match driver.inner_text(&element).await {
            Ok(text) => return text.trim().to_string(),
            Err(e) => tracing::debug!(selector, error = %e, "content read failed"),
        }
    }
    String::new()
}

/// Best-effort click on the "see more" toggle so the full text is rendered.
async fn expand_see_more<D: PageDriver>(driver: &mut D, container: &D::Element) {
    if let Ok(Some(button)) = driver
        .find_by_role(Some(container), "button", SEE_MORE_LABEL)
        .await
    {
        if let Err(e) = driver.click(&button).await {
            tracing::debug!(error = %e, "see-more click failed");
        }
    }
}

async fn extract_timestamp<D: PageDriver>(driver: &mut D, container: &D::Element) -> String {
    if let Ok(Some(time)) = driver.find_within(container, POST_TIME_PRIMARY).await {
        match driver.attribute(&time, "datetime").await {
            Ok(Some(datetime)) if !datetime.is_empty() => return datetime,
            Ok(_) => {}
            Err(e) => tracing::debug!(error = %e, "datetime attribute read failed"),
        }
    }

    if let Ok(Some(label)) = driver.find_within(container, POST_TIME_FALLBACK).await {
        match driver.inner_text(&label).await {
            Ok(text) => return text.trim().to_string(),
            Err(e) => tracing::debug!(error = %e, "timestamp label read failed"),
        }
    }

    String::new()
}

#[cfg(test)]
#[path = "extract_test.rs"]
mod tests;
