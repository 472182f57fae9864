mod clock;
mod http_fetcher;
mod platform_region;
mod region_store;
mod telemetry_sink;

pub use clock::Clock;
pub use http_fetcher::HttpFetcher;
pub use platform_region::PlatformRegion;
pub use region_store::{RegionStore, HOME_KEY, UPDATED_KEY};
pub use telemetry_sink::TelemetrySink;
