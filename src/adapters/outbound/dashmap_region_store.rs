//! DashMap Region Store
//!
//! Implements RegionStore in memory. Nothing survives a restart, which is
//! what tests and ephemeral runs want.

use crate::domain::ports::RegionStore;
use crate::error::StoreError;
use async_trait::async_trait;
use dashmap::DashMap;

/// In-memory key/value store.
#[derive(Debug, Default)]
pub struct DashMapRegionStore {
    values: DashMap<String, String>,
}

impl DashMapRegionStore {
    pub fn new() -> Self {
        Self {
            values: DashMap::new(),
        }
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[async_trait]
impl RegionStore for DashMapRegionStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.values.get(key).map(|v| v.value().clone()))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.values.remove(key);
        Ok(())
    }
}
