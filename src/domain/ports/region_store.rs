//! Region Store Port
//!
//! Defines the interface for the small persisted key/value store that keeps
//! the resolved region and its update timestamp across restarts.

use crate::error::StoreError;
use async_trait::async_trait;

/// Key holding the last resolved region code.
pub const HOME_KEY: &str = "region.home";

/// Key holding the last update time, in decimal seconds since the Unix epoch.
pub const UPDATED_KEY: &str = "region.updated";

/// Persisted key/value store.
///
/// Implementations may use SQLite or in-memory storage.
#[async_trait]
pub trait RegionStore: Send + Sync {
    /// Read a value, `None` if the key was never written.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Create or overwrite a value.
    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Delete a value. Deleting a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<(), StoreError>;
}
