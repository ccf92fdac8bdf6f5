use super::*;
use crate::fake::{CopyVia, FakePage, FakePost};

const POSTS: &str = "https://www.linkedin.com/posts/";

fn link(n: u32) -> String {
    format!("{POSTS}jane_activity-{n}")
}

fn blank_post() -> FakePost {
    FakePost {
        menu: false,
        ..FakePost::new("", "", "")
    }
}

#[tokio::test]
async fn extracts_link_content_and_timestamp() {
    let mut page = FakePage::with_posts(vec![
        FakePost::new(&link(1), "  Exciting news in AI  ", "2024-01-10T00:00:00.000Z"),
        FakePost::new(&link(2), "Second", "2024-01-09T00:00:00.000Z"),
    ]);

    let posts = collect_top_posts(&mut page, 3, &Pacing::none()).await;

    assert_eq!(posts.len(), 2);
    assert_eq!(posts[0].link, link(1));
    assert_eq!(posts[0].content, "Exciting news in AI");
    assert_eq!(posts[0].timestamp, "2024-01-10T00:00:00.000Z");
    assert_eq!(posts[1].link, link(2));
}

#[tokio::test]
async fn caller_limit_is_capped_at_hard_limit() {
    let feed = (1..=5)
        .map(|n| FakePost::new(&link(n), "post", "1d"))
        .collect();
    let mut page = FakePage::with_posts(feed);

    let posts = collect_top_posts(&mut page, 10, &Pacing::none()).await;

    assert_eq!(posts.len(), HARD_POST_LIMIT);
    assert_eq!(posts[2].link, link(3));
}

#[tokio::test]
async fn zero_limit_extracts_nothing() {
    let mut page = FakePage::with_posts(vec![FakePost::new(&link(1), "post", "1d")]);
    let posts = collect_top_posts(&mut page, 0, &Pacing::none()).await;
    assert!(posts.is_empty());
}

#[tokio::test]
async fn duplicate_links_keep_first_post_only() {
    let mut page = FakePage::with_posts(vec![
        FakePost::new(&link(7), "original", "1d"),
        FakePost::new(&link(7), "reshare", "1d"),
    ]);

    let posts = collect_top_posts(&mut page, 3, &Pacing::none()).await;

    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].content, "original");
}

#[tokio::test]
async fn blank_container_is_skipped_without_widening_window() {
    let mut page = FakePage::with_posts(vec![
        blank_post(),
        FakePost::new(&link(1), "kept", "1d"),
        FakePost::new(&link(2), "outside window", "1d"),
    ]);

    let posts = collect_top_posts(&mut page, 2, &Pacing::none()).await;

    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].content, "kept");
}

#[tokio::test]
async fn copy_link_falls_back_to_text_lookup() {
    let mut post = FakePost::new(&link(3), "text menu", "1d");
    post.copy_via = CopyVia::Text;
    let mut page = FakePage::with_posts(vec![post]);

    let posts = collect_top_posts(&mut page, 3, &Pacing::none()).await;

    assert_eq!(posts[0].link, link(3));
}

#[tokio::test]
async fn missing_copy_item_leaves_link_empty_but_keeps_post() {
    let mut first = FakePost::new(&link(1), "first", "1d");
    first.copy_via = CopyVia::Role;
    let mut second = FakePost::new(&link(2), "second", "2d");
    second.copy_via = CopyVia::Unavailable;
    let mut page = FakePage::with_posts(vec![first, second]);

    let posts = collect_top_posts(&mut page, 3, &Pacing::none()).await;

    assert_eq!(posts.len(), 2);
    // The first post's link must not carry over.
    assert_eq!(posts[1].link, "");
    assert_eq!(posts[1].content, "second");
}

#[tokio::test]
async fn copy_that_never_reaches_clipboard_keeps_post_without_link() {
    let first = FakePost::new(&link(1), "first post", "1d");
    let mut second = FakePost::new(&link(2), "second post about AI", "2d");
    second.copy_lands = false;
    let mut page = FakePage::with_posts(vec![first, second]);

    let posts = collect_top_posts(&mut page, 3, &Pacing::none()).await;

    assert_eq!(posts.len(), 2);
    assert_eq!(posts[0].link, link(1));
    assert_eq!(posts[1].link, "");
    assert_eq!(posts[1].content, "second post about AI");
    assert_eq!(posts[1].timestamp, "2d");
}

#[tokio::test]
async fn stale_clipboard_is_ignored_when_it_cannot_be_cleared() {
    let first = FakePost::new(&link(1), "first post", "1d");
    let mut second = FakePost::new(&link(2), "second post", "2d");
    second.copy_lands = false;
    let mut page = FakePage::with_posts(vec![first, second]);
    page.clipboard_locked = true;

    let posts = collect_top_posts(&mut page, 3, &Pacing::none()).await;

    assert_eq!(posts.len(), 2);
    assert_eq!(posts[0].link, link(1));
    assert_eq!(posts[1].link, "");
    assert_eq!(posts[1].content, "second post");
}

#[tokio::test]
async fn link_left_on_clipboard_before_run_is_not_reused() {
    let mut post = FakePost::new(&link(4), "body", "1d");
    post.copy_lands = false;
    let mut page = FakePage::with_posts(vec![post]);
    page.clipboard = link(9);

    let posts = collect_top_posts(&mut page, 3, &Pacing::none()).await;

    assert_eq!(posts[0].link, "");
}

#[tokio::test]
async fn content_falls_back_and_expands_see_more() {
    let mut post = FakePost::new(&link(1), "", "1d");
    post.fallback_content = Some("commentary body\n".to_string());
    post.see_more = true;
    let mut page = FakePage::with_posts(vec![post]);

    let posts = collect_top_posts(&mut page, 1, &Pacing::none()).await;

    assert_eq!(posts[0].content, "commentary body");
    assert_eq!(page.see_more_clicks, 1);
}

#[tokio::test]
async fn timestamp_falls_back_to_visible_label() {
    let mut post = FakePost::new(&link(1), "body", "");
    post.time_text = Some(" 2wk • ".to_string());
    let mut page = FakePage::with_posts(vec![post]);

    let posts = collect_top_posts(&mut page, 1, &Pacing::none()).await;

    assert_eq!(posts[0].timestamp, "2wk •");
}

#[tokio::test]
async fn scrolls_until_enough_posts_render() {
    let feed = (1..=3)
        .map(|n| FakePost::new(&link(n), "post", "1d"))
        .collect();
    let mut page = FakePage::with_posts(feed).lazily_rendered(1, 1);

    let posts = collect_top_posts(&mut page, 3, &Pacing::none()).await;

    assert_eq!(page.scrolls, 2);
    assert_eq!(posts.len(), 3);
}

#[tokio::test]
async fn scrolling_is_bounded() {
    let feed = (1..=3)
        .map(|n| FakePost::new(&link(n), "post", "1d"))
        .collect();
    let mut page = FakePage::with_posts(feed).lazily_rendered(1, 0);

    let posts = collect_top_posts(&mut page, 3, &Pacing::none()).await;

    assert_eq!(page.scrolls, ENSURE_SCROLL_ATTEMPTS);
    assert_eq!(posts.len(), 1);
}

#[tokio::test]
async fn scrape_profile_opens_recent_activity() {
    let mut page = FakePage::default();
    page.feeds.insert(
        "https://www.linkedin.com/in/jane/recent-activity".to_string(),
        vec![FakePost::new(&link(1), "hello", "1d")],
    );

    let posts = scrape_profile(
        &mut page,
        "https://www.linkedin.com/in/jane",
        3,
        Duration::from_secs(1),
        &Pacing::none(),
    )
    .await
    .unwrap();

    assert_eq!(
        page.navigations,
        vec!["https://www.linkedin.com/in/jane/recent-activity"]
    );
    assert_eq!(posts.len(), 1);
}

#[tokio::test]
async fn scrape_profile_without_containers_returns_empty() {
    let mut page = FakePage::default();

    let posts = scrape_profile(
        &mut page,
        "https://www.linkedin.com/in/nobody",
        3,
        Duration::from_millis(10),
        &Pacing::none(),
    )
    .await
    .unwrap();

    assert!(posts.is_empty());
    assert_eq!(page.scrolls, 0);
}

#[tokio::test]
async fn scrape_profile_propagates_navigation_failure() {
    let mut page = FakePage::default();
    page.failing_urls
        .insert("https://www.linkedin.com/in/down/recent-activity".to_string());

    let result = scrape_profile(
        &mut page,
        "https://www.linkedin.com/in/down",
        3,
        Duration::from_millis(10),
        &Pacing::none(),
    )
    .await;

    assert!(matches!(result, Err(DriverError::Timeout { .. })));
}
