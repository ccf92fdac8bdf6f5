//! Remote relevance classification over an OpenAI-compatible
//! chat-completion endpoint (DeepSeek by default).

use std::future::Future;
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use serde::Serialize;
use serde_json::Value;

use crate::error::FilterError;
use crate::heuristic::heuristic_relevant;

const SYSTEM_PROMPT: &str = "You are a precise JSON-only classifier.";

const USER_PROMPT: &str = "Decide whether the LinkedIn post below is relevant to any of: \
(A) AI (artificial intelligence), (B) Real Estate, or (C) AI applied to Real Estate.\n\
Answer with one compact JSON object with keys: relevant (boolean), \
category (one of: AI, RealEstate, AI_in_RealEstate, Other). No extra text.\n\
Content:";

const MAX_COMPLETION_TOKENS: u32 = 64;

static JSON_OBJECT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{.*\}").expect("valid regex"));

/// Verdict for one piece of post content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub relevant: bool,
    /// Classifier output kept for diagnostics.
    pub raw: String,
}

/// Decides whether post content is on topic.
pub trait RelevanceClassifier {
    /// Classifies `content`.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError`] when the classifier cannot be reached or
    /// answers with an error; callers fall back to the keyword heuristic.
    fn classify(
        &self,
        content: &str,
    ) -> impl Future<Output = Result<Classification, FilterError>> + Send;
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

/// Chat-completion classifier client.
pub struct DeepseekClient {
    client: reqwest::Client,
    url: String,
    api_key: String,
    model: String,
}

impl std::fmt::Debug for DeepseekClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeepseekClient")
            .field("url", &self.url)
            .field("api_key", &"[redacted]")
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl DeepseekClient {
    /// Creates a client posting to `{base_url}/v1/chat/completions`.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::Http`] if the HTTP client cannot be built.
    pub fn new(
        api_key: &str,
        model: &str,
        base_url: &str,
        timeout: Duration,
    ) -> Result<Self, FilterError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: format!("{}/v1/chat/completions", base_url.trim_end_matches('/')),
            api_key: api_key.to_owned(),
            model: model.to_owned(),
        })
    }
}

impl RelevanceClassifier for DeepseekClient {
    async fn classify(&self, content: &str) -> Result<Classification, FilterError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_owned(),
                },
                ChatMessage {
                    role: "user",
                    content: format!("{USER_PROMPT}\n\n{}", content.trim()),
                },
            ],
            temperature: 0.0,
            max_tokens: MAX_COMPLETION_TOKENS,
        };

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(FilterError::UnexpectedStatus {
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }
        if body.trim().is_empty() {
            return Err(FilterError::EmptyCompletion);
        }

        let text = completion_text(&body).unwrap_or_else(|| body.trim().to_owned());
        let relevant = parse_relevance(&text, heuristic_relevant(content));
        tracing::debug!(relevant, raw = %text, "classifier verdict");

        Ok(Classification {
            relevant,
            raw: text,
        })
    }
}

/// `choices[0].message.content` of a chat-completion response, trimmed.
fn completion_text(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .map(|s| s.trim().to_owned())
}

/// Reads the boolean `relevant` key from classifier output.
///
/// The whole text is tried as JSON first, then the outermost brace-delimited
/// substring. Returns `fallback` when neither yields a boolean `relevant`.
#[must_use]
pub fn parse_relevance(text: &str, fallback: bool) -> bool {
    relevant_flag(text)
        .or_else(|| {
            JSON_OBJECT_RE
                .find(text)
                .and_then(|m| relevant_flag(m.as_str()))
        })
        .unwrap_or(fallback)
}

fn relevant_flag(candidate: &str) -> Option<bool> {
    serde_json::from_str::<Value>(candidate)
        .ok()?
        .get("relevant")?
        .as_bool()
}
