//! Clock Port

/// Source of wall-clock time for the update interval gate.
///
/// Wall-clock seconds rather than `Instant` so the timestamp survives a
/// restart through the region store.
pub trait Clock: Send + Sync {
    /// Seconds since the Unix epoch.
    fn now_secs(&self) -> u64;
}
