//! Region Service - home region resolution use case
//!
//! Resolves the user's home region from a network service with a bounded
//! number of attempts, a per-request deadline, and an update interval that
//! suppresses refetching a region that is still recent. Every completed
//! resolution is reported to telemetry exactly once.

use crate::application::region_observers::{RegionObservers, SubscriptionId};
use crate::config::RegionConfig;
use crate::domain::entities::{parse_region_body, Location, LocationResponse, RegionState};
use crate::domain::ports::{
    Clock, HttpFetcher, PlatformRegion, RegionStore, TelemetrySink, HOME_KEY, UPDATED_KEY,
};
use crate::domain::services::RetryPolicy;
use crate::domain::value_objects::{CountryCode, FetchOutcome, FetchResult};
use crate::error::{RegionError, StoreError};
use bytes::Bytes;
use futures::future::{BoxFuture, FutureExt, Shared, WeakShared};
use parking_lot::Mutex;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

type InFlight = Shared<BoxFuture<'static, FetchOutcome>>;

/// Region resolver.
///
/// Cheap to clone; clones share state, subscribers and the in-flight fetch.
///
/// Concurrent `fetch_region` calls join the resolution already running
/// instead of starting a second one. When every caller drops its future the
/// running resolution is dropped too, aborting its request.
#[derive(Clone)]
pub struct RegionService {
    inner: Arc<Inner>,
}

struct Inner {
    config: RegionConfig,
    policy: RetryPolicy,
    fetcher: Arc<dyn HttpFetcher>,
    store: Arc<dyn RegionStore>,
    telemetry: Arc<dyn TelemetrySink>,
    clock: Arc<dyn Clock>,
    platform: Option<Arc<dyn PlatformRegion>>,
    state: Mutex<RegionState>,
    observers: RegionObservers,
    in_flight: Mutex<Option<WeakShared<BoxFuture<'static, FetchOutcome>>>>,
    /// Replaced on every `cancel()`
    cancel: Mutex<CancellationToken>,
}

impl RegionService {
    /// Create a resolver with empty state.
    ///
    /// Call [`RegionService::restore`] to pick up a previously persisted
    /// region.
    pub fn new(
        config: RegionConfig,
        fetcher: Arc<dyn HttpFetcher>,
        store: Arc<dyn RegionStore>,
        telemetry: Arc<dyn TelemetrySink>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let policy = RetryPolicy::new(config.max_attempts, config.retry_timeout);
        Self {
            inner: Arc::new(Inner {
                config,
                policy,
                fetcher,
                store,
                telemetry,
                clock,
                platform: None,
                state: Mutex::new(RegionState::default()),
                observers: RegionObservers::new(),
                in_flight: Mutex::new(None),
                cancel: Mutex::new(CancellationToken::new()),
            }),
        }
    }

    /// Enable the platform mismatch probe.
    ///
    /// Must be called before the service is cloned.
    pub fn with_platform_region(mut self, platform: Arc<dyn PlatformRegion>) -> Self {
        match Arc::get_mut(&mut self.inner) {
            Some(inner) => inner.platform = Some(platform),
            None => tracing::warn!("platform region ignored: service already shared"),
        }
        self
    }

    /// Load the persisted region and update timestamp into memory.
    ///
    /// Store failures are logged and leave the state empty.
    pub async fn restore(&self) {
        match load_persisted(self.inner.store.as_ref()).await {
            Ok((home, last_update)) => {
                tracing::debug!(
                    "restored region home={:?} last_update={:?}",
                    home,
                    last_update
                );
                let mut state = self.inner.state.lock();
                let restored = RegionState {
                    retry_count: state.retry_count,
                    first_fetch_done: state.first_fetch_done,
                    ..RegionState::restored(home, last_update)
                };
                *state = restored;
            }
            Err(e) => tracing::warn!("failed to restore persisted region: {}", e),
        }
    }

    /// Resolve the home region.
    ///
    /// Returns `Skipped` without touching the network when a region is
    /// known and was updated less than `update_interval` ago, except on the
    /// first call of the process which always fetches.
    ///
    /// The resolution is registered, and bound to the current cancellation
    /// token, when this is called rather than when the future is first
    /// polled.
    pub fn fetch_region(&self) -> impl Future<Output = FetchOutcome> + Send + 'static {
        let mut slot = self.inner.in_flight.lock();
        if let Some(running) = slot.as_ref().and_then(|weak| weak.upgrade()) {
            tracing::debug!("joining in-flight region fetch");
            return running;
        }

        let cancel = self.inner.cancel.lock().clone();
        let inner = self.inner.clone();
        let running: InFlight = async move { inner.resolve(cancel).await }.boxed().shared();
        *slot = running.downgrade();
        running
    }

    /// Look up the geographic location. Single attempt, no state changes.
    pub async fn get_location(&self) -> Result<Location, RegionError> {
        let url = self
            .inner
            .config
            .location_url
            .as_deref()
            .ok_or_else(|| RegionError::NoResult("no location url configured".to_string()))?;

        let cancel = self.inner.cancel.lock().clone();
        let body = self.inner.fetch_body(url, &cancel).await?;

        let resp: LocationResponse = serde_json::from_slice(&body)
            .map_err(|e| RegionError::NoResult(format!("invalid location: {}", e)))?;

        Ok(resp.into())
    }

    /// Abort the running fetch or lookup, if any.
    ///
    /// Later calls start with a fresh token and are not affected.
    pub fn cancel(&self) {
        let old = std::mem::replace(&mut *self.inner.cancel.lock(), CancellationToken::new());
        old.cancel();
    }

    /// Refresh the region every `check_interval` until `shutdown` fires.
    ///
    /// The first refresh happens one period after the call. The update
    /// interval still decides whether a refresh goes to the network.
    pub async fn run(&self, shutdown: CancellationToken, check_interval: Duration) {
        let period = check_interval.max(Duration::from_millis(1));
        let start = tokio::time::Instant::now() + period;
        let mut interval = tokio::time::interval_at(start, period);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    tracing::info!("region refresh loop stopped");
                    return;
                }
                _ = interval.tick() => {
                    tokio::select! {
                        _ = shutdown.cancelled() => {
                            tracing::info!("region refresh loop stopped during fetch");
                            return;
                        }
                        outcome = self.fetch_region() => {
                            tracing::debug!("periodic region refresh: {:?}", outcome);
                        }
                    }
                }
            }
        }
    }

    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&CountryCode) + Send + Sync + 'static,
    {
        self.inner.observers.subscribe(callback)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.inner.observers.unsubscribe(id)
    }

    pub fn home(&self) -> Option<CountryCode> {
        self.inner.state.lock().home.clone()
    }

    pub fn retry_count(&self) -> u32 {
        self.inner.state.lock().retry_count
    }

    pub fn last_update(&self) -> Option<u64> {
        self.inner.state.lock().last_update
    }

    /// Copy of the whole state.
    pub fn state(&self) -> RegionState {
        self.inner.state.lock().clone()
    }

    pub fn reset_retry_count(&self) {
        self.inner.state.lock().retry_count = 0;
    }

    /// Forget the region so the next call fetches again, here and after a
    /// restart.
    pub async fn reset_home(&self) {
        {
            let mut state = self.inner.state.lock();
            state.home = None;
            state.last_update = None;
        }

        for key in [HOME_KEY, UPDATED_KEY] {
            if let Err(e) = self.inner.store.remove(key).await {
                tracing::warn!("failed to remove persisted {}: {}", key, e);
            }
        }
    }

    pub fn config(&self) -> &RegionConfig {
        &self.inner.config
    }
}

impl Inner {
    async fn resolve(self: Arc<Self>, cancel: CancellationToken) -> FetchOutcome {
        let now = self.clock.now_secs();
        {
            let mut state = self.state.lock();
            if state.first_fetch_done && state.is_fresh(now, self.config.update_interval) {
                tracing::debug!(
                    "region {:?} updated at {:?} is still fresh, skipping fetch",
                    state.home,
                    state.last_update
                );
                return FetchOutcome::Skipped;
            }
            state.first_fetch_done = true;
        }

        let mut attempts = 0;

        let last_error = loop {
            attempts += 1;

            let error = match self.attempt_fetch(&cancel).await {
                Ok(code) => return self.finish_success(code, attempts).await,
                Err(RegionError::Cancelled) => return self.finish_cancelled(attempts),
                Err(e) => e,
            };

            self.state.lock().record_failure();
            tracing::debug!("region fetch attempt {} failed: {}", attempts, error);

            if !self.policy.should_retry(attempts) {
                break error;
            }

            let delay = self.policy.backoff(attempts);
            if !delay.is_zero() {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return self.finish_cancelled(attempts),
                    _ = tokio::time::sleep(delay) => {}
                }
            }
        };

        let result = last_error.fetch_result().unwrap_or(FetchResult::NoResult);
        self.telemetry.record_fetch_result(result);
        tracing::warn!(
            "region fetch failed after {} attempts: {} ({})",
            attempts,
            last_error,
            result
        );

        FetchOutcome::Failed(result)
    }

    /// One round trip to the region service.
    async fn attempt_fetch(&self, cancel: &CancellationToken) -> Result<CountryCode, RegionError> {
        let body = self.fetch_body(&self.config.region_url, cancel).await?;
        parse_region_body(&body).map_err(RegionError::NoResult)
    }

    /// GET `url` bounded by the request deadline and `cancel`.
    ///
    /// Losing either race drops the request future, which aborts it.
    async fn fetch_body(&self, url: &str, cancel: &CancellationToken) -> Result<Bytes, RegionError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(RegionError::Cancelled),
            res = tokio::time::timeout(self.config.request_timeout, self.fetcher.get(url)) => {
                match res {
                    Ok(Ok(body)) => Ok(body),
                    Ok(Err(e)) => Err(e.into()),
                    Err(_) => Err(RegionError::Timeout),
                }
            }
        }
    }

    async fn finish_success(&self, code: CountryCode, attempts: u32) -> FetchOutcome {
        let now = self.clock.now_secs();
        let changed = self.state.lock().record_success(code.clone(), now);

        self.telemetry.record_fetch_result(FetchResult::Success);
        self.record_platform_probe(&code);
        tracing::info!("region resolved: {} (attempt {})", code, attempts);

        if changed {
            self.observers.notify(&code);
        }

        // Runs to completion even if every caller goes away
        let persist = tokio::spawn(persist_region(self.store.clone(), code.clone(), now));
        if let Err(e) = persist.await {
            tracing::warn!("region persist task failed: {}", e);
        }

        FetchOutcome::Success(code)
    }

    fn finish_cancelled(&self, attempts: u32) -> FetchOutcome {
        tracing::info!("region fetch cancelled after {} attempts", attempts);
        FetchOutcome::Cancelled
    }

    fn record_platform_probe(&self, fetched: &CountryCode) {
        let Some(platform) = self.platform.as_ref().and_then(|p| p.country_code()) else {
            return;
        };

        let platform_is_us = platform.as_str().eq_ignore_ascii_case("US");
        let mismatched = !platform.as_str().eq_ignore_ascii_case(fetched.as_str());
        self.telemetry
            .record_platform_mismatch(platform_is_us, mismatched);
    }
}

async fn persist_region(store: Arc<dyn RegionStore>, code: CountryCode, now: u64) {
    if let Err(e) = store.set(HOME_KEY, code.as_str()).await {
        tracing::warn!("failed to persist region: {}", e);
    }
    if let Err(e) = store.set(UPDATED_KEY, &now.to_string()).await {
        tracing::warn!("failed to persist region timestamp: {}", e);
    }
}

async fn load_persisted(
    store: &dyn RegionStore,
) -> Result<(Option<CountryCode>, Option<u64>), StoreError> {
    let home = store
        .get(HOME_KEY)
        .await?
        .and_then(|raw| CountryCode::parse(&raw));

    let last_update = match store.get(UPDATED_KEY).await? {
        Some(raw) => Some(raw.trim().parse::<u64>().map_err(|_| StoreError::Corrupt {
            key: UPDATED_KEY.to_string(),
            value: raw.clone(),
        })?),
        None => None,
    };

    Ok((home, last_update))
}
