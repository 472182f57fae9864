//! region-client - home region resolver
//!
//! This is the composition root that wires together all the components.

use region_client::adapters::outbound::{
    DashMapRegionStore, DashMapTelemetry, ReqwestFetcher, SqliteRegionStore, StaticPlatformRegion,
    SystemClock,
};
use region_client::infrastructure::shutdown_signal;
use region_client::{load_config, FetchOutcome, RegionService, RegionStore};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::fmt::format::FmtSpan;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration from environment
    let cfg = load_config()?;

    // Setup logging
    let log_level = if cfg.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_span_events(FmtSpan::CLOSE)
        .init();

    tracing::info!(
        "starting region-client url={} update_interval={}s",
        cfg.region_url,
        cfg.update_interval_secs
    );

    // ===== COMPOSITION ROOT =====

    // 1. Outbound adapters
    let store: Arc<dyn RegionStore> = match &cfg.db_path {
        Some(path) => {
            let store = SqliteRegionStore::open(path)?;
            tracing::info!("region store opened at {}", path);
            Arc::new(store)
        }
        None => {
            tracing::info!("region store is in-memory");
            Arc::new(DashMapRegionStore::new())
        }
    };
    let telemetry = Arc::new(DashMapTelemetry::new());
    let platform = Arc::new(StaticPlatformRegion::new(cfg.platform_country.as_deref()));

    // 2. Application service
    let service = RegionService::new(
        cfg.region_config(),
        Arc::new(ReqwestFetcher::new()),
        store,
        telemetry.clone(),
        Arc::new(SystemClock),
    )
    .with_platform_region(platform);

    service.subscribe(|region| tracing::info!("home region is now {}", region));
    service.restore().await;

    // 3. Shutdown wiring
    let shutdown = CancellationToken::new();
    tokio::spawn(shutdown_signal(shutdown.clone()));

    // 4. Initial resolution, then periodic refresh
    tokio::select! {
        _ = shutdown.cancelled() => return Ok(()),
        outcome = service.fetch_region() => match outcome {
            FetchOutcome::Success(region) => tracing::info!("region: {}", region),
            FetchOutcome::Failed(result) => {
                tracing::warn!("region unavailable ({}), keeping {:?}", result, service.home())
            }
            other => tracing::debug!("initial region fetch: {:?}", other),
        },
    }

    if cfg.location_url.is_some() {
        match service.get_location().await {
            Ok(location) => tracing::info!(
                "location: lat={} lng={} accuracy={}m",
                location.latitude,
                location.longitude,
                location.accuracy_meters
            ),
            Err(e) => tracing::warn!("location lookup failed: {}", e),
        }
    }

    service.run(shutdown, cfg.check_interval()).await;

    tracing::debug!("telemetry at exit:\n{}", telemetry.export_prometheus());
    Ok(())
}
