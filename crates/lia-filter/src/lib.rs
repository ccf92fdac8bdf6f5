//! Recency and topical relevance filter for scraped LinkedIn posts.
//!
//! Reads an aggregate store document, drops incomplete, non-post, stale and
//! off-topic posts, and returns the filtered document with run statistics.
//! Relevance comes from a chat-completion classifier when one is configured,
//! with a keyword heuristic as the fallback. The filtered document can be
//! exported as a one-row-per-profile CSV table.

pub mod classifier;
pub mod error;
pub mod export;
pub mod heuristic;
pub mod pipeline;
pub mod recency;

pub use classifier::{parse_relevance, Classification, DeepseekClient, RelevanceClassifier};
pub use error::{ExportError, FilterError};
pub use export::{export_table, write_table, DEFAULT_SNIPPET_CHARS};
pub use heuristic::heuristic_relevant;
pub use pipeline::{filter_document, DropReason, FilterOutcome, FilterStats};
pub use recency::{parse_timestamp, within_two_weeks};
