//! Scripted in-memory [`PageDriver`] for extractor and orchestrator tests.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use crate::driver::PageDriver;
use crate::error::DriverError;
use crate::selectors::{
    LOGIN_FORM_MARKER, MENU_TRIGGER, POST_CONTAINER, POST_CONTENT_FALLBACK, POST_CONTENT_PRIMARY,
    POST_TIME_FALLBACK, POST_TIME_PRIMARY,
};

/// How the copy-link menu item can be reached for a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CopyVia {
    Role,
    Text,
    Unavailable,
}

#[derive(Debug, Clone)]
pub(crate) struct FakePost {
    pub menu: bool,
    pub copy_via: CopyVia,
    /// Whether clicking the copy item actually writes the clipboard.
    pub copy_lands: bool,
    pub link: String,
    pub primary_content: Option<String>,
    pub fallback_content: Option<String>,
    pub datetime: Option<String>,
    pub time_text: Option<String>,
    pub see_more: bool,
}

impl FakePost {
    pub fn new(link: &str, content: &str, datetime: &str) -> Self {
        Self {
            menu: true,
            copy_via: CopyVia::Role,
            copy_lands: true,
            link: link.to_string(),
            primary_content: (!content.is_empty()).then(|| content.to_string()),
            fallback_content: None,
            datetime: (!datetime.is_empty()).then(|| datetime.to_string()),
            time_text: None,
            see_more: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum FakeElement {
    Container(usize),
    Trigger(usize),
    MenuItem,
    MenuText,
    Content { post: usize, primary: bool },
    TimePrimary(usize),
    TimeFallback(usize),
    SeeMore(usize),
}

#[derive(Debug, Default)]
pub(crate) struct FakePage {
    /// Feed shown on the current page.
    pub posts: Vec<FakePost>,
    /// Containers rendered before any scrolling.
    pub initially_rendered: usize,
    /// Containers added by each scroll.
    pub per_scroll: usize,
    rendered: usize,
    pub login_form: bool,
    pub clipboard: String,
    /// Rejects clipboard clears, as a page without write permission does.
    pub clipboard_locked: bool,
    menu_open_for: Option<usize>,
    /// Feeds keyed by recent-activity URL, loaded on navigation.
    pub feeds: HashMap<String, Vec<FakePost>>,
    pub failing_urls: HashSet<String>,
    pub navigations: Vec<String>,
    pub scrolls: usize,
    pub see_more_clicks: usize,
}

impl FakePage {
    /// A page already showing `posts`, all rendered.
    pub fn with_posts(posts: Vec<FakePost>) -> Self {
        let rendered = posts.len();
        Self {
            posts,
            initially_rendered: rendered,
            rendered,
            ..Self::default()
        }
    }

    /// Sets how many containers are rendered up front and per scroll.
    pub fn lazily_rendered(mut self, initially: usize, per_scroll: usize) -> Self {
        self.initially_rendered = initially;
        self.rendered = initially;
        self.per_scroll = per_scroll;
        self
    }

    fn visible_count(&self) -> usize {
        self.rendered.min(self.posts.len())
    }

    fn menu_post(&self) -> Option<&FakePost> {
        self.menu_open_for.and_then(|i| self.posts.get(i))
    }
}

impl PageDriver for FakePage {
    type Element = FakeElement;

    async fn navigate(&mut self, url: &str) -> Result<(), DriverError> {
        self.navigations.push(url.to_string());
        if self.failing_urls.contains(url) {
            return Err(DriverError::Timeout {
                action: format!("navigate to {url}"),
                timeout_ms: 0,
            });
        }
        if let Some(feed) = self.feeds.get(url) {
            self.posts = feed.clone();
            self.rendered = self.initially_rendered.max(feed.len());
        } else if url.ends_with("/recent-activity") {
            self.posts.clear();
            self.rendered = 0;
        }
        self.menu_open_for = None;
        Ok(())
    }

    async fn count(&mut self, selector: &str) -> Result<usize, DriverError> {
        Ok(match selector {
            POST_CONTAINER => self.visible_count(),
            LOGIN_FORM_MARKER => usize::from(self.login_form),
            _ => 0,
        })
    }

    async fn wait_visible(&mut self, selector: &str, _timeout: Duration) -> Result<bool, DriverError> {
        Ok(selector == POST_CONTAINER && self.visible_count() > 0)
    }

    async fn scroll_by(&mut self, _dy: i64) -> Result<(), DriverError> {
        self.scrolls += 1;
        self.rendered += self.per_scroll;
        Ok(())
    }

    async fn find_all(&mut self, selector: &str) -> Result<Vec<FakeElement>, DriverError> {
        if selector == POST_CONTAINER {
            Ok((0..self.visible_count()).map(FakeElement::Container).collect())
        } else {
            Ok(Vec::new())
        }
    }

    async fn find_within(
        &mut self,
        scope: &FakeElement,
        selector: &str,
    ) -> Result<Option<FakeElement>, DriverError> {
        let FakeElement::Container(i) = *scope else {
            return Ok(None);
        };
        let post = &self.posts[i];
        let found = match selector {
            MENU_TRIGGER => post.menu.then_some(FakeElement::Trigger(i)),
            POST_CONTENT_PRIMARY => post
                .primary_content
                .as_ref()
                .map(|_| FakeElement::Content { post: i, primary: true }),
            POST_CONTENT_FALLBACK => post
                .fallback_content
                .as_ref()
                .map(|_| FakeElement::Content { post: i, primary: false }),
            POST_TIME_PRIMARY => post.datetime.as_ref().map(|_| FakeElement::TimePrimary(i)),
            POST_TIME_FALLBACK => post.time_text.as_ref().map(|_| FakeElement::TimeFallback(i)),
            _ => None,
        };
        Ok(found)
    }

    async fn find_by_role(
        &mut self,
        scope: Option<&FakeElement>,
        role: &str,
        _name: &str,
    ) -> Result<Option<FakeElement>, DriverError> {
        match (scope, role) {
            (None, "menuitem") => Ok(self
                .menu_post()
                .filter(|p| p.copy_via == CopyVia::Role)
                .map(|_| FakeElement::MenuItem)),
            (Some(FakeElement::Container(i)), "button") => {
                Ok(self.posts[*i].see_more.then_some(FakeElement::SeeMore(*i)))
            }
            _ => Ok(None),
        }
    }

    async fn find_by_text(&mut self, _text: &str) -> Result<Option<FakeElement>, DriverError> {
        Ok(self
            .menu_post()
            .filter(|p| p.copy_via == CopyVia::Text)
            .map(|_| FakeElement::MenuText))
    }

    async fn scroll_into_view(&mut self, _element: &FakeElement) -> Result<(), DriverError> {
        Ok(())
    }

    async fn click(&mut self, element: &FakeElement) -> Result<(), DriverError> {
        match element {
            FakeElement::Trigger(i) => self.menu_open_for = Some(*i),
            FakeElement::MenuItem | FakeElement::MenuText => {
                if let Some(post) = self.menu_post().filter(|p| p.copy_lands) {
                    self.clipboard = post.link.clone();
                }
                self.menu_open_for = None;
            }
            FakeElement::SeeMore(_) => self.see_more_clicks += 1,
            _ => {}
        }
        Ok(())
    }

    async fn inner_text(&mut self, element: &FakeElement) -> Result<String, DriverError> {
        let text = match element {
            FakeElement::Content { post, primary: true } => self.posts[*post].primary_content.clone(),
            FakeElement::Content { post, primary: false } => {
                self.posts[*post].fallback_content.clone()
            }
            FakeElement::TimeFallback(i) => self.posts[*i].time_text.clone(),
            _ => None,
        };
        text.ok_or(DriverError::MissingValue("text"))
    }

    async fn attribute(
        &mut self,
        element: &FakeElement,
        name: &str,
    ) -> Result<Option<String>, DriverError> {
        match (element, name) {
            (FakeElement::TimePrimary(i), "datetime") => Ok(self.posts[*i].datetime.clone()),
            _ => Ok(None),
        }
    }

    async fn read_clipboard(&mut self) -> Result<String, DriverError> {
        Ok(self.clipboard.clone())
    }

    async fn clear_clipboard(&mut self) -> Result<(), DriverError> {
        if self.clipboard_locked {
            return Err(DriverError::ClipboardRejected);
        }
        self.clipboard.clear();
        Ok(())
    }
}
