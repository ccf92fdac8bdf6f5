//! Keyword heuristic for AI and real-estate topical relevance.

/// AI-related terms. Matched as lowercase substrings, so short terms such as
/// `"ai"` also hit inside longer words.
pub(crate) const AI_KEYWORDS: &[&str] = &[
    "ai",
    "artificial intelligence",
    "machine learning",
    "ml",
    "genai",
    "gpt",
    "llm",
    "deep learning",
    "neural",
    "openai",
    "deepseek",
];

/// Real-estate-related terms.
pub(crate) const REAL_ESTATE_KEYWORDS: &[&str] = &[
    "real estate",
    "property",
    "properties",
    "realtor",
    "reit",
    "cre",
    "proptech",
    "prop tech",
];

/// Returns `true` if `text` contains any AI or real-estate keyword,
/// ignoring case.
#[must_use]
pub fn heuristic_relevant(text: &str) -> bool {
    let lower = text.to_lowercase();
    AI_KEYWORDS
        .iter()
        .chain(REAL_ESTATE_KEYWORDS)
        .any(|kw| lower.contains(kw))
}
