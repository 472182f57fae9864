//! Region Observers - publish/subscribe for region changes.

use crate::domain::value_objects::CountryCode;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Callback invoked with the newly resolved region.
pub type RegionCallback = Arc<dyn Fn(&CountryCode) + Send + Sync>;

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Registry of region-changed callbacks.
#[derive(Default)]
pub struct RegionObservers {
    next_id: AtomicU64,
    callbacks: DashMap<u64, RegionCallback>,
}

impl RegionObservers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&CountryCode) + Send + Sync + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.callbacks.insert(id, Arc::new(callback));
        SubscriptionId(id)
    }

    /// Returns false if the subscription was already gone.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.callbacks.remove(&id.0).is_some()
    }

    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }

    /// Invoke every callback in subscription order.
    ///
    /// Callbacks run without any map shard locked, so they may subscribe or
    /// unsubscribe.
    pub fn notify(&self, region: &CountryCode) {
        let mut callbacks: Vec<(u64, RegionCallback)> = self
            .callbacks
            .iter()
            .map(|e| (*e.key(), e.value().clone()))
            .collect();
        callbacks.sort_by_key(|(id, _)| *id);

        for (_, callback) in callbacks {
            callback(region);
        }
    }
}
