use thiserror::Error;

/// Failure of a single browser interaction.
///
/// The extractor treats almost every `DriverError` as "field unavailable";
/// only navigation failures surface to the orchestrator.
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("WebDriver returned {status} ({error}): {message}")]
    WebDriver {
        status: u16,
        error: String,
        message: String,
    },

    #[error("WebDriver response is missing {0}")]
    MissingValue(&'static str),

    #[error("page rejected the clipboard write")]
    ClipboardRejected,

    #[error("timed out after {timeout_ms}ms waiting for {action}")]
    Timeout { action: String, timeout_ms: u64 },
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on aggregate store {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize store record: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error(transparent)]
    Driver(#[from] DriverError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
