//! Platform Region Port

use crate::domain::value_objects::CountryCode;

/// Country code the operating system reports, if any.
pub trait PlatformRegion: Send + Sync {
    fn country_code(&self) -> Option<CountryCode>;
}
