//! DashMap Telemetry
//!
//! Implements TelemetrySink with atomic counters and Prometheus text export.

use crate::domain::ports::TelemetrySink;
use crate::domain::value_objects::FetchResult;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Probe key for the platform mismatch counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct MismatchKey {
    platform_is_us: bool,
    mismatched: bool,
}

/// In-process telemetry counters.
///
/// One counter per fetch result bucket plus one per mismatch probe bucket.
pub struct DashMapTelemetry {
    fetch_results: [AtomicU64; 3],
    mismatches: DashMap<MismatchKey, AtomicU64>,
}

impl DashMapTelemetry {
    pub fn new() -> Self {
        Self {
            fetch_results: Default::default(),
            mismatches: DashMap::new(),
        }
    }

    /// Count recorded for one result bucket.
    pub fn fetch_result_count(&self, result: FetchResult) -> u64 {
        self.fetch_results[result.bucket()].load(Ordering::Relaxed)
    }

    /// Sum over all result buckets.
    pub fn total_fetch_results(&self) -> u64 {
        self.fetch_results
            .iter()
            .map(|c| c.load(Ordering::Relaxed))
            .sum()
    }

    /// Bucket values indexed by `FetchResult::bucket`.
    pub fn snapshot(&self) -> [u64; 3] {
        let mut values = [0; 3];
        for (slot, counter) in values.iter_mut().zip(self.fetch_results.iter()) {
            *slot = counter.load(Ordering::Relaxed);
        }
        values
    }

    pub fn mismatch_count(&self, platform_is_us: bool, mismatched: bool) -> u64 {
        self.mismatches
            .get(&MismatchKey {
                platform_is_us,
                mismatched,
            })
            .map(|c| c.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    /// Export counters in Prometheus text format.
    pub fn export_prometheus(&self) -> String {
        let mut output = String::new();

        output.push_str("# HELP region_fetch_result_total Region fetch calls by outcome\n");
        output.push_str("# TYPE region_fetch_result_total counter\n");
        for result in FetchResult::ALL {
            output.push_str(&format!(
                "region_fetch_result_total{{result=\"{}\"}} {}\n",
                result,
                self.fetch_result_count(result)
            ));
        }

        output.push_str(
            "# HELP region_platform_mismatch_total Platform country compared with fetched region\n",
        );
        output.push_str("# TYPE region_platform_mismatch_total counter\n");
        let mut keys: Vec<MismatchKey> = self.mismatches.iter().map(|e| *e.key()).collect();
        keys.sort_by_key(|k| (k.platform_is_us, k.mismatched));
        for key in keys {
            output.push_str(&format!(
                "region_platform_mismatch_total{{platform=\"{}\",mismatched=\"{}\"}} {}\n",
                if key.platform_is_us { "us" } else { "non_us" },
                key.mismatched,
                self.mismatch_count(key.platform_is_us, key.mismatched)
            ));
        }

        output
    }
}

impl Default for DashMapTelemetry {
    fn default() -> Self {
        Self::new()
    }
}

impl TelemetrySink for DashMapTelemetry {
    fn record_fetch_result(&self, result: FetchResult) {
        self.fetch_results[result.bucket()].fetch_add(1, Ordering::Relaxed);
    }

    fn record_platform_mismatch(&self, platform_is_us: bool, mismatched: bool) {
        self.mismatches
            .entry(MismatchKey {
                platform_is_us,
                mismatched,
            })
            .or_default()
            .fetch_add(1, Ordering::Relaxed);
    }
}
