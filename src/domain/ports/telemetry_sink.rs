//! Telemetry Sink Port
//!
//! Defines the interface for reporting resolution outcomes.

use crate::domain::value_objects::FetchResult;

/// Counter sink for region fetch telemetry.
///
/// Storage format and upload are the implementation's concern.
pub trait TelemetrySink: Send + Sync {
    /// Count one completed `fetch_region` call.
    fn record_fetch_result(&self, result: FetchResult);

    /// Count one comparison between the platform country and the fetched one.
    ///
    /// `platform_is_us` selects the probe, `mismatched` the bucket.
    fn record_platform_mismatch(&self, platform_is_us: bool, mismatched: bool);
}
