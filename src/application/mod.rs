//! Application Layer
//!
//! The region resolver use case and its notification fan-out.

mod region_observers;
mod region_service;

pub use region_observers::{RegionCallback, RegionObservers, SubscriptionId};
pub use region_service::RegionService;
