//! Error types shared across layers.

use crate::domain::value_objects::FetchResult;

/// Failure of a single region or location fetch.
#[derive(Debug, thiserror::Error)]
pub enum RegionError {
    /// Transport failure, bad status, or an unusable body.
    #[error("no result: {0}")]
    NoResult(String),
    /// The request deadline passed before a response arrived.
    #[error("request timed out")]
    Timeout,
    /// The resolver was cancelled.
    #[error("cancelled")]
    Cancelled,
}

impl RegionError {
    /// Telemetry classification, `None` for cancellation.
    pub fn fetch_result(&self) -> Option<FetchResult> {
        match self {
            Self::NoResult(_) => Some(FetchResult::NoResult),
            Self::Timeout => Some(FetchResult::Timeout),
            Self::Cancelled => None,
        }
    }
}

impl From<TransportError> for RegionError {
    fn from(e: TransportError) -> Self {
        Self::NoResult(e.to_string())
    }
}

/// Failure reported by an `HttpFetcher`.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Request(String),
    #[error("unexpected status: {0}")]
    Status(u16),
    #[error("unsupported url: {0}")]
    UnsupportedUrl(String),
}

/// Failure reported by a `RegionStore`.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("store task failed: {0}")]
    Join(String),
    #[error("corrupt value for {key}: {value:?}")]
    Corrupt { key: String, value: String },
}
