//! Fixed platform country, taken from configuration.

use crate::domain::ports::PlatformRegion;
use crate::domain::value_objects::CountryCode;

#[derive(Debug, Clone, Default)]
pub struct StaticPlatformRegion {
    code: Option<CountryCode>,
}

impl StaticPlatformRegion {
    pub fn new(code: Option<&str>) -> Self {
        Self {
            code: code.and_then(CountryCode::parse),
        }
    }
}

impl PlatformRegion for StaticPlatformRegion {
    fn country_code(&self) -> Option<CountryCode> {
        self.code.clone()
    }
}
