//! Integration tests for `DeepseekClient` and the filter's fallback path.
//!
//! A `wiremock` server stands in for the chat-completion endpoint.

use std::time::Duration;

use chrono::{TimeZone, Utc};
use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use lia_core::{Post, ProfileRecord, StoreDocument};
use lia_filter::{filter_document, DeepseekClient, FilterError, RelevanceClassifier};

fn client(server: &MockServer) -> DeepseekClient {
    DeepseekClient::new(
        "sk-test",
        "deepseek-chat",
        &server.uri(),
        Duration::from_secs(2),
    )
    .expect("failed to build test DeepseekClient")
}

fn completion(content: &str) -> serde_json::Value {
    json!({
        "id": "cmpl-1",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }]
    })
}

#[tokio::test]
async fn classify_sends_authorized_chat_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_string_contains("deepseek-chat"))
        .and(body_string_contains("JSON-only classifier"))
        .and(body_string_contains("Exciting news in AI"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(completion(r#"{"relevant": true, "category": "AI"}"#)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let verdict = client(&server).classify("Exciting news in AI").await.unwrap();

    assert!(verdict.relevant);
    assert_eq!(verdict.raw, r#"{"relevant": true, "category": "AI"}"#);
}

#[tokio::test]
async fn classify_reads_json_wrapped_in_prose() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(
            "Here you go:\n```json\n{\"relevant\": false, \"category\": \"Other\"}\n```",
        )))
        .mount(&server)
        .await;

    let verdict = client(&server).classify("Exciting news in AI").await.unwrap();

    assert!(!verdict.relevant);
}

#[tokio::test]
async fn classify_falls_back_to_keywords_on_unusable_verdict() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("I cannot decide.")))
        .mount(&server)
        .await;

    let c = client(&server);
    assert!(c.classify("New proptech fund").await.unwrap().relevant);
    assert!(!c.classify("Lunch with the team").await.unwrap().relevant);
}

#[tokio::test]
async fn classify_uses_raw_body_when_not_a_chat_completion() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"relevant": true}"#))
        .mount(&server)
        .await;

    let verdict = client(&server).classify("Lunch with the team").await.unwrap();

    assert!(verdict.relevant);
}

#[tokio::test]
async fn classify_reports_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
        .mount(&server)
        .await;

    let err = client(&server).classify("anything").await.unwrap_err();

    match err {
        FilterError::UnexpectedStatus { status, body } => {
            assert_eq!(status, 401);
            assert_eq!(body, "invalid api key");
        }
        other => panic!("expected UnexpectedStatus, got: {other:?}"),
    }
}

#[tokio::test]
async fn classify_reports_empty_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let err = client(&server).classify("anything").await.unwrap_err();

    assert!(matches!(err, FilterError::EmptyCompletion), "got: {err:?}");
}

#[tokio::test]
async fn classify_times_out_as_http_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(completion(r#"{"relevant": true}"#))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let err = client(&server).classify("anything").await.unwrap_err();

    assert!(matches!(err, FilterError::Http(ref e) if e.is_timeout()), "got: {err:?}");
}

#[tokio::test]
async fn filter_survives_classifier_outage() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(503))
        .expect(2)
        .mount(&server)
        .await;

    let doc = StoreDocument {
        profiles: vec![ProfileRecord {
            profile_url: "https://www.linkedin.com/in/jane".to_string(),
            posts: vec![
                Post {
                    link: "https://www.linkedin.com/posts/jane_activity-1".to_string(),
                    content: "Exciting news in AI".to_string(),
                    timestamp: "2d".to_string(),
                },
                Post {
                    link: "https://www.linkedin.com/posts/jane_activity-2".to_string(),
                    content: "Lunch with the team".to_string(),
                    timestamp: "3d".to_string(),
                },
            ],
        }],
    };
    let now = Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap();
    let c = client(&server);

    let outcome = filter_document(&doc, Some(&c), now).await;

    assert_eq!(outcome.stats.classifier_failures, 2);
    assert_eq!(outcome.stats.posts_after, 1);
    assert_eq!(
        outcome.document.profiles[0].posts[0].link,
        "https://www.linkedin.com/posts/jane_activity-1"
    );
}
