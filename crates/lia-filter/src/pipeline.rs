//! Recency and relevance filter over an aggregate store document.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use lia_core::{Post, ProfileRecord, StoreDocument};

use crate::classifier::RelevanceClassifier;
use crate::heuristic::heuristic_relevant;
use crate::recency::within_two_weeks;

/// Only links containing this prefix point at an actual post.
pub const POST_LINK_MARKER: &str = "https://www.linkedin.com/posts";

/// Relevance is decided on at most this many leading characters of content.
pub const CLASSIFY_PREFIX_CHARS: usize = 5_000;

/// Why a post was dropped, in check order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DropReason {
    /// Link, content or timestamp is blank.
    Incomplete,
    /// Link does not point at a post.
    NotAPost,
    /// Older than the two-week window.
    Stale,
    /// Off topic.
    Irrelevant,
}

impl DropReason {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Incomplete => "incomplete",
            Self::NotAPost => "not_a_post",
            Self::Stale => "stale",
            Self::Irrelevant => "irrelevant",
        }
    }
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Counters for one filter run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FilterStats {
    pub posts_before: usize,
    pub posts_after: usize,
    pub profiles_before: usize,
    pub profiles_after: usize,
    pub incomplete: usize,
    pub not_a_post: usize,
    pub stale: usize,
    pub irrelevant: usize,
    /// Distinct contents sent to the remote classifier.
    pub classifier_calls: usize,
    /// Remote classifications that failed and fell back to the heuristic.
    pub classifier_failures: usize,
    pub cache_hits: usize,
}

impl FilterStats {
    /// Number of posts dropped for `reason`.
    #[must_use]
    pub fn dropped(&self, reason: DropReason) -> usize {
        match reason {
            DropReason::Incomplete => self.incomplete,
            DropReason::NotAPost => self.not_a_post,
            DropReason::Stale => self.stale,
            DropReason::Irrelevant => self.irrelevant,
        }
    }

    fn record_drop(&mut self, reason: DropReason) {
        match reason {
            DropReason::Incomplete => self.incomplete += 1,
            DropReason::NotAPost => self.not_a_post += 1,
            DropReason::Stale => self.stale += 1,
            DropReason::Irrelevant => self.irrelevant += 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterOutcome {
    pub document: StoreDocument,
    pub stats: FilterStats,
}

/// Per-run memo of relevance verdicts keyed by truncated content.
struct RelevanceCache<'c, C> {
    classifier: Option<&'c C>,
    verdicts: HashMap<String, bool>,
}

impl<'c, C: RelevanceClassifier> RelevanceCache<'c, C> {
    fn new(classifier: Option<&'c C>) -> Self {
        Self {
            classifier,
            verdicts: HashMap::new(),
        }
    }

    async fn is_relevant(&mut self, content: &str, stats: &mut FilterStats) -> bool {
        let key: String = content.chars().take(CLASSIFY_PREFIX_CHARS).collect();
        if let Some(&verdict) = self.verdicts.get(&key) {
            stats.cache_hits += 1;
            tracing::debug!(relevant = verdict, "relevance cache hit");
            return verdict;
        }

        let verdict = match self.classifier {
            None => heuristic_relevant(&key),
            Some(classifier) => {
                stats.classifier_calls += 1;
                match classifier.classify(&key).await {
                    Ok(classification) => classification.relevant,
                    Err(e) => {
                        stats.classifier_failures += 1;
                        tracing::warn!(error = %e, "classifier failed, using keyword heuristic");
                        heuristic_relevant(&key)
                    }
                }
            }
        };

        self.verdicts.insert(key, verdict);
        verdict
    }
}

/// Filters every profile's posts down to complete, recent, on-topic posts.
///
/// Checks run in order (completeness, post link, recency, relevance) and the
/// first failing one drops the post. Relevance uses `classifier` when given,
/// otherwise the keyword heuristic; a failing classifier degrades to the
/// heuristic for that content. Profiles left without posts are omitted, and
/// surviving posts keep their original order.
pub async fn filter_document<C: RelevanceClassifier>(
    document: &StoreDocument,
    classifier: Option<&C>,
    now: DateTime<Utc>,
) -> FilterOutcome {
    let mut stats = FilterStats {
        posts_before: document.post_count(),
        profiles_before: document.profiles.len(),
        ..FilterStats::default()
    };
    let mut cache = RelevanceCache::new(classifier);
    let mut profiles = Vec::new();

    for profile in &document.profiles {
        let mut kept: Vec<Post> = Vec::new();

        for post in &profile.posts {
            let verdict = match static_check(post, now) {
                Some(reason) => Err(reason),
                None => {
                    if cache.is_relevant(post.content.trim(), &mut stats).await {
                        Ok(())
                    } else {
                        Err(DropReason::Irrelevant)
                    }
                }
            };

            match verdict {
                Ok(()) => kept.push(post.clone()),
                Err(reason) => {
                    stats.record_drop(reason);
                    tracing::debug!(
                        profile = %profile.profile_url,
                        reason = %reason,
                        link = %post.link,
                        timestamp = %post.timestamp,
                        "dropping post"
                    );
                }
            }
        }

        if kept.is_empty() {
            tracing::debug!(profile = %profile.profile_url, "no posts kept, omitting profile");
            continue;
        }
        stats.posts_after += kept.len();
        profiles.push(ProfileRecord {
            profile_url: profile.profile_url.clone(),
            posts: kept,
        });
    }

    stats.profiles_after = profiles.len();
    tracing::info!(
        before = stats.posts_before,
        after = stats.posts_after,
        incomplete = stats.incomplete,
        not_a_post = stats.not_a_post,
        stale = stats.stale,
        irrelevant = stats.irrelevant,
        "filter run finished"
    );

    FilterOutcome {
        document: StoreDocument { profiles },
        stats,
    }
}

/// The cheap checks; `None` means the post may go on to classification.
fn static_check(post: &Post, now: DateTime<Utc>) -> Option<DropReason> {
    let link = post.link.trim();
    let timestamp = post.timestamp.trim();
    if link.is_empty() || post.content.trim().is_empty() || timestamp.is_empty() {
        return Some(DropReason::Incomplete);
    }
    if !link.contains(POST_LINK_MARKER) {
        return Some(DropReason::NotAPost);
    }
    if !within_two_weeks(timestamp, now) {
        return Some(DropReason::Stale);
    }
    None
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod tests;
