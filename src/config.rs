use std::time::Duration;

/// Built-in region service endpoint.
pub const DEFAULT_REGION_URL: &str =
    "https://location.services.mozilla.com/v1/country?key=%MOZILLA_API_KEY%";

/// 30 days.
pub const DEFAULT_UPDATE_INTERVAL_SECS: u64 = 2_592_000;
pub const DEFAULT_RETRY_TIMEOUT_MS: u64 = 3_000;
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 5_000;
pub const DEFAULT_CHECK_INTERVAL_SECS: u64 = 3_600;
pub const DEFAULT_MAX_ATTEMPTS: u32 = 4;

#[derive(Debug, Clone)]
pub struct Config {
    // Endpoints
    pub region_url: String,
    pub location_url: Option<String>,

    // Timing
    pub update_interval_secs: u64,
    pub retry_timeout_ms: u64,
    pub request_timeout_ms: u64,
    pub check_interval_secs: u64,

    // Storage and platform
    pub db_path: Option<String>,
    pub platform_country: Option<String>,

    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            region_url: DEFAULT_REGION_URL.to_string(),
            location_url: None,
            update_interval_secs: DEFAULT_UPDATE_INTERVAL_SECS,
            retry_timeout_ms: DEFAULT_RETRY_TIMEOUT_MS,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            check_interval_secs: DEFAULT_CHECK_INTERVAL_SECS,
            db_path: None,
            platform_country: None,
            debug: false,
        }
    }
}

impl Config {
    /// Resolver settings derived from this configuration.
    pub fn region_config(&self) -> RegionConfig {
        RegionConfig {
            region_url: self.region_url.clone(),
            location_url: self.location_url.clone(),
            update_interval: Duration::from_secs(self.update_interval_secs),
            retry_timeout: Duration::from_millis(self.retry_timeout_ms),
            request_timeout: Duration::from_millis(self.request_timeout_ms),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_secs)
    }
}

/// Settings of a single region resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionConfig {
    /// Region service endpoint
    pub region_url: String,
    /// Location service endpoint; lookups fail without one
    pub location_url: Option<String>,
    /// Minimum spacing between successful refreshes
    pub update_interval: Duration,
    /// Base delay between attempts; zero disables the delay
    pub retry_timeout: Duration,
    /// Deadline of every single request
    pub request_timeout: Duration,
    /// Total attempts per `fetch_region` call
    pub max_attempts: u32,
}

impl Default for RegionConfig {
    fn default() -> Self {
        Config::default().region_config()
    }
}

pub fn load_config() -> anyhow::Result<Config> {
    load_config_from(|key| std::env::var(key).ok())
}

/// Build a configuration from an arbitrary variable source.
///
/// Unparsable numbers fall back to their defaults.
pub fn load_config_from<F>(var: F) -> anyhow::Result<Config>
where
    F: Fn(&str) -> Option<String>,
{
    let region_url = var("REGION_NETWORK_URL").unwrap_or_else(|| DEFAULT_REGION_URL.to_string());

    let location_url = var("REGION_LOCATION_URL").filter(|v| !v.is_empty());

    let update_interval_secs = var("REGION_UPDATE_INTERVAL_SECS")
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_UPDATE_INTERVAL_SECS);

    let retry_timeout_ms = var("REGION_RETRY_TIMEOUT_MS")
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_RETRY_TIMEOUT_MS);

    let request_timeout_ms = var("REGION_REQUEST_TIMEOUT_MS")
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_REQUEST_TIMEOUT_MS);

    let check_interval_secs = var("REGION_CHECK_INTERVAL_SECS")
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_CHECK_INTERVAL_SECS);

    let db_path = var("REGION_DB_PATH").filter(|v| !v.is_empty());

    let platform_country = var("REGION_PLATFORM_COUNTRY").filter(|v| !v.trim().is_empty());

    let debug = var("DEBUG").is_some();

    if region_url.trim().is_empty() {
        anyhow::bail!("REGION_NETWORK_URL must not be empty");
    }

    Ok(Config {
        region_url,
        location_url,
        update_interval_secs,
        retry_timeout_ms,
        request_timeout_ms,
        check_interval_secs,
        db_path,
        platform_country,
        debug,
    })
}
