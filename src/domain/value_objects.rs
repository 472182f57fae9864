//! Value Objects - Immutable domain primitives
//!
//! Value objects are identified by their value rather than identity.
//! They are immutable and can be freely shared.

use serde::{Deserialize, Serialize};

/// Home region of the user, as reported by the region service.
///
/// Usually an ISO 3166-1 alpha-2 code, but the service is trusted as-is:
/// `"UK"` is accepted even though the ISO code is `GB`. The only
/// requirement is a non-empty value after trimming.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CountryCode(String);

impl CountryCode {
    /// Parse a country code, rejecting empty or whitespace-only input.
    ///
    /// # Examples
    /// ```
    /// use region_client::CountryCode;
    ///
    /// assert_eq!(CountryCode::parse(" FR ").unwrap().as_str(), "FR");
    /// assert!(CountryCode::parse("").is_none());
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for CountryCode {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| "empty country code".to_string())
    }
}

impl From<CountryCode> for String {
    fn from(code: CountryCode) -> Self {
        code.0
    }
}

impl std::fmt::Display for CountryCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Telemetry classification of a region fetch.
///
/// Exactly one of these is recorded for every `fetch_region` call that
/// reaches the network and runs to completion. The discriminants are the
/// histogram buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchResult {
    Success = 0,
    NoResult = 1,
    Timeout = 2,
}

impl FetchResult {
    pub const ALL: [FetchResult; 3] = [Self::Success, Self::NoResult, Self::Timeout];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::NoResult => "NO_RESULT",
            Self::Timeout => "TIMEOUT",
        }
    }

    pub fn bucket(&self) -> usize {
        *self as usize
    }
}

impl std::fmt::Display for FetchResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What a single `fetch_region` call ended with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// A code was fetched; `home` now holds it.
    Success(CountryCode),
    /// Every attempt failed; the last failure's classification.
    Failed(FetchResult),
    /// The update interval has not elapsed since the last success.
    Skipped,
    /// The resolver was cancelled while the fetch was running.
    Cancelled,
}

impl FetchOutcome {
    /// Telemetry bucket for this outcome, if it is one that gets recorded.
    pub fn fetch_result(&self) -> Option<FetchResult> {
        match self {
            Self::Success(_) => Some(FetchResult::Success),
            Self::Failed(result) => Some(*result),
            Self::Skipped | Self::Cancelled => None,
        }
    }

    pub fn region(&self) -> Option<&CountryCode> {
        match self {
            Self::Success(code) => Some(code),
            _ => None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_country_code_parse_trims() {
        let code = CountryCode::parse("  DE\n").unwrap();
        assert_eq!(code.as_str(), "DE");
        assert_eq!(format!("{}", code), "DE");
    }

    #[test]
    fn test_country_code_rejects_blank() {
        for input in ["", "   ", "\t\n"] {
            assert!(CountryCode::parse(input).is_none(), "accepted {:?}", input);
        }
    }

    #[test]
    fn test_country_code_keeps_non_iso_values() {
        // The service answers "UK" for the United Kingdom.
        assert_eq!(CountryCode::parse("UK").unwrap().as_str(), "UK");
    }

    #[test]
    fn test_country_code_deserialize_rejects_empty() {
        let ok: CountryCode = serde_json::from_str("\"AU\"").unwrap();
        assert_eq!(ok.as_str(), "AU");

        let err = serde_json::from_str::<CountryCode>("\"\"");
        assert!(err.is_err());
    }

    #[test]
    fn test_fetch_result_buckets() {
        assert_eq!(FetchResult::Success.bucket(), 0);
        assert_eq!(FetchResult::NoResult.bucket(), 1);
        assert_eq!(FetchResult::Timeout.bucket(), 2);
    }

    #[test]
    fn test_fetch_result_display() {
        assert_eq!(FetchResult::Success.to_string(), "SUCCESS");
        assert_eq!(FetchResult::NoResult.to_string(), "NO_RESULT");
        assert_eq!(FetchResult::Timeout.to_string(), "TIMEOUT");
    }

    #[test]
    fn test_outcome_fetch_result() {
        let uk = CountryCode::parse("UK").unwrap();
        assert_eq!(
            FetchOutcome::Success(uk.clone()).fetch_result(),
            Some(FetchResult::Success)
        );
        assert_eq!(
            FetchOutcome::Failed(FetchResult::Timeout).fetch_result(),
            Some(FetchResult::Timeout)
        );
        assert_eq!(FetchOutcome::Skipped.fetch_result(), None);
        assert_eq!(FetchOutcome::Cancelled.fetch_result(), None);

        assert_eq!(FetchOutcome::Success(uk.clone()).region(), Some(&uk));
        assert!(FetchOutcome::Skipped.region().is_none());
    }
}
