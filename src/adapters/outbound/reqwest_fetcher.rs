//! Reqwest HTTP Fetcher
//!
//! Implements HttpFetcher with reqwest. `data:` URLs are answered locally,
//! which lets a configuration pin the region without a server.

use crate::domain::ports::HttpFetcher;
use crate::error::TransportError;
use async_trait::async_trait;
use bytes::Bytes;
use percent_encoding::percent_decode_str;

/// reqwest-backed fetcher.
///
/// Holds one connection pool for all requests. No client-level timeout is
/// set; the resolver applies its own deadline.
#[derive(Clone, Default)]
pub struct ReqwestFetcher {
    client: reqwest::Client,
}

impl ReqwestFetcher {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Use a preconfigured client (proxy, user agent, TLS roots).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    fn is_data_url(url: &str) -> bool {
        url.get(..5)
            .is_some_and(|scheme| scheme.eq_ignore_ascii_case("data:"))
    }

    /// Percent-decoded body of a `data:` URL. Only the plain (non-base64)
    /// form is supported.
    fn data_url_body(url: &str) -> Result<Bytes, TransportError> {
        let rest = &url["data:".len()..];
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| TransportError::UnsupportedUrl(url.to_string()))?;

        if header.split(';').any(|p| p.eq_ignore_ascii_case("base64")) {
            return Err(TransportError::UnsupportedUrl(url.to_string()));
        }

        let body: Vec<u8> = percent_decode_str(payload).collect();
        Ok(Bytes::from(body))
    }
}

#[async_trait]
impl HttpFetcher for ReqwestFetcher {
    async fn get(&self, url: &str) -> Result<Bytes, TransportError> {
        if Self::is_data_url(url) {
            return Self::data_url_body(url);
        }

        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(TransportError::Status(resp.status().as_u16()));
        }

        resp.bytes()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))
    }
}
