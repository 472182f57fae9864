//! region-client Library
//!
//! Resolves the user's home region from a network service, with bounded
//! retries, request deadlines, an update interval gate and outcome
//! telemetry. Exposed as a library for the binary and integration tests.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;

// Re-export commonly used types
pub use application::{RegionService, SubscriptionId};
pub use config::{load_config, Config, RegionConfig};
pub use domain::entities::{Location, RegionState};
pub use domain::ports::{Clock, HttpFetcher, PlatformRegion, RegionStore, TelemetrySink};
pub use domain::value_objects::{CountryCode, FetchOutcome, FetchResult};
pub use error::{RegionError, StoreError, TransportError};
