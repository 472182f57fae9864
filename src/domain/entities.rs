//! Domain Entities - Core business objects
//!
//! These entities represent the state the region resolver keeps and the
//! payloads it exchanges with the network services. They have no external
//! dependencies beyond serde and contain only business logic.

use crate::domain::value_objects::CountryCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Mutable bookkeeping of the region resolver.
///
/// One instance lives inside each resolver. It is only mutated by the
/// resolution path and the explicit reset hooks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegionState {
    /// Last successfully resolved region
    pub home: Option<CountryCode>,
    /// Consecutive failed attempts since the last success or reset
    pub retry_count: u32,
    /// Seconds since the Unix epoch of the last successful resolution
    pub last_update: Option<u64>,
    /// Whether this process already went to the network once
    pub first_fetch_done: bool,
}

impl RegionState {
    /// Create state restored from persisted values.
    pub fn restored(home: Option<CountryCode>, last_update: Option<u64>) -> Self {
        Self {
            home,
            last_update,
            ..Default::default()
        }
    }

    /// Whether the known region is recent enough to skip a refetch.
    ///
    /// A timestamp in the future (clock moved backwards) counts as stale.
    pub fn is_fresh(&self, now: u64, interval: Duration) -> bool {
        if self.home.is_none() {
            return false;
        }
        match self.last_update {
            Some(last) if last <= now => now - last < interval.as_secs(),
            _ => false,
        }
    }

    /// Apply a successful attempt. Returns true if `home` changed.
    pub fn record_success(&mut self, code: CountryCode, now: u64) -> bool {
        let changed = self.home.as_ref() != Some(&code);
        self.home = Some(code);
        self.retry_count = 0;
        self.last_update = Some(now);
        changed
    }

    /// Apply a failed attempt. `home` is left untouched.
    pub fn record_failure(&mut self) {
        self.retry_count = self.retry_count.saturating_add(1);
    }
}

/// Geographic position returned by the location service.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy_meters: f64,
}

/// Body of a location service response.
///
/// `{"location": {"lat": -1.0, "lng": 1.0}, "accuracy": 100.0}`
#[derive(Debug, Clone, Deserialize)]
pub struct LocationResponse {
    pub location: LatLng,
    pub accuracy: f64,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl From<LocationResponse> for Location {
    fn from(resp: LocationResponse) -> Self {
        Self {
            latitude: resp.location.lat,
            longitude: resp.location.lng,
            accuracy_meters: resp.accuracy,
        }
    }
}

/// Extract the region from a region service response body.
///
/// Returns `Err` with a short reason when the body is not JSON or the
/// `country_code` field is absent, not a string, or empty.
pub fn parse_region_body(body: &[u8]) -> Result<CountryCode, String> {
    let value: serde_json::Value =
        serde_json::from_slice(body).map_err(|e| format!("invalid json: {}", e))?;

    let raw = value
        .get("country_code")
        .ok_or_else(|| "missing country_code".to_string())?
        .as_str()
        .ok_or_else(|| "country_code is not a string".to_string())?;

    CountryCode::parse(raw).ok_or_else(|| "empty country_code".to_string())
}
