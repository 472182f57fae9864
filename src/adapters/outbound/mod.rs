mod dashmap_region_store;
mod dashmap_telemetry;
mod reqwest_fetcher;
mod sqlite_region_store;
mod static_platform_region;
mod system_clock;

pub use dashmap_region_store::DashMapRegionStore;
pub use dashmap_telemetry::DashMapTelemetry;
pub use reqwest_fetcher::ReqwestFetcher;
pub use sqlite_region_store::SqliteRegionStore;
pub use static_platform_region::StaticPlatformRegion;
pub use system_clock::{ManualClock, SystemClock};
