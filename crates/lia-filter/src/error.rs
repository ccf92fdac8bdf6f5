use thiserror::Error;

/// Failure of a remote relevance classification.
///
/// Never fatal to a filter run: the pipeline falls back to the keyword
/// heuristic for the affected post.
#[derive(Debug, Error)]
pub enum FilterError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("classifier returned HTTP {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    #[error("classifier returned an empty completion")]
    EmptyCompletion,
}

/// Failure writing the tabular summary.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("I/O error on table {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write CSV: {0}")]
    Csv(#[from] csv::Error),
}
