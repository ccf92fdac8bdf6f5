//! CSS selectors and labels for LinkedIn's recent-activity markup.
//!
//! LinkedIn reshuffles class names often, so most lookups carry a fallback.
//! All post-level selectors are evaluated inside a single post container.

/// Post container: activity article, or the activity `div` keyed by URN.
pub const POST_CONTAINER: &str = "article, div[data-urn^='urn:li:activity:']";

/// Three-dots control menu trigger within a post.
pub const MENU_TRIGGER: &str = "button.feed-shared-control-menu__trigger, \
     button.artdeco-dropdown__trigger[aria-label*='More']";

/// Accessible name of the menu item that copies the post permalink.
pub const COPY_LINK_LABEL: &str = "Copy link to post";

/// Accessible name of the truncation toggle on long posts.
pub const SEE_MORE_LABEL: &str = "see more";

pub const POST_CONTENT_PRIMARY: &str = "div.update-components-text";
pub const POST_CONTENT_FALLBACK: &str = "div.update-components-update-v2__commentary";

/// Machine-readable timestamp element; read through its `datetime` attribute.
pub const POST_TIME_PRIMARY: &str = "time[datetime]";
pub const POST_TIME_FALLBACK: &str =
    "span.update-components-actor__sub-description.text-body-xsmall";

pub const FEED_URL: &str = "https://www.linkedin.com/feed/";

/// Present only on the sign-in form.
pub const LOGIN_FORM_MARKER: &str = "input#username";
