//! HTTP Fetcher Port
//!
//! Defines the interface the resolver uses to reach the network services.

use crate::error::TransportError;
use async_trait::async_trait;
use bytes::Bytes;

/// Transport for a single HTTP GET.
///
/// This is an outbound port. The resolver owns deadlines and cancellation:
/// it wraps each call in a timeout and drops the future to abort it, so
/// implementations should not add their own retries.
#[async_trait]
pub trait HttpFetcher: Send + Sync {
    /// Fetch `url` and return the response body.
    ///
    /// Any non-success status is reported as an error.
    async fn get(&self, url: &str) -> Result<Bytes, TransportError>;
}
