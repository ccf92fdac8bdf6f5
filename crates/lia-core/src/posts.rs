use serde::{Deserialize, Serialize};

/// One post captured from a profile's recent-activity feed.
///
/// Fields are stored exactly as extracted; whitespace cleanup is left to
/// whoever renders them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    /// Canonical permalink from the "copy link" menu, or empty when unobtainable.
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub content: String,
    /// ISO-8601 datetime or a relative string such as `"2wk"` or `"5 days ago"`.
    #[serde(default)]
    pub timestamp: String,
}

impl Post {
    /// Returns `true` if link, content and timestamp are all empty.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.link.is_empty() && self.content.is_empty() && self.timestamp.is_empty()
    }
}

/// All posts captured for one profile, in feed order (latest first).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileRecord {
    #[serde(default)]
    pub profile_url: String,
    #[serde(default)]
    pub posts: Vec<Post>,
}

impl ProfileRecord {
    /// The most recent post, assuming feed order was preserved.
    #[must_use]
    pub fn latest(&self) -> Option<&Post> {
        self.posts.first()
    }
}

/// Document form of the aggregate and filtered files: `{"profiles": [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreDocument {
    #[serde(default)]
    pub profiles: Vec<ProfileRecord>,
}

impl StoreDocument {
    /// Total number of posts across every profile.
    #[must_use]
    pub fn post_count(&self) -> usize {
        self.profiles.iter().map(|p| p.posts.len()).sum()
    }
}
