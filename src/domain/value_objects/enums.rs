//! # Domain Enums
//!
//! Enumeration types for domain concepts.
//!
//! - [`OfferStatus`] - Lifecycle status of a provider offer
//! - [`MaritalStatus`] - Applicant marital status
//!
//! Both serialize as the upper-case strings providers and clients exchange.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error returned when a string does not name a known enum value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseEnumError {
    /// The value is not one of the accepted variants.
    #[error("invalid {0} value: {1}")]
    InvalidValue(&'static str, String),
}

/// Lifecycle status of an offer.
///
/// `Draft` is the initial state, `Processed` and `Declined` are terminal.
/// Any other string a provider reports is kept verbatim in `Other` and
/// treated as not yet final.
///
/// # Examples
///
/// ```
/// use financing_aggregator::domain::value_objects::OfferStatus;
///
/// let status = OfferStatus::from_provider("processed");
/// assert_eq!(status, OfferStatus::Processed);
/// assert!(status.is_terminal());
///
/// let pending = OfferStatus::from_provider("IN_REVIEW");
/// assert!(!pending.is_terminal());
/// assert_eq!(pending.as_str(), "IN_REVIEW");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum OfferStatus {
    /// Awaiting the provider's decision.
    #[default]
    Draft,
    /// Provider returned a completed offer.
    Processed,
    /// Provider declined (zero payments).
    Declined,
    /// Provider-specific intermediate status.
    Other(String),
}

impl OfferStatus {
    /// Normalizes a provider-reported status string.
    #[must_use]
    pub fn from_provider(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case("DRAFT") {
            Self::Draft
        } else if trimmed.eq_ignore_ascii_case("PROCESSED") {
            Self::Processed
        } else if trimmed.eq_ignore_ascii_case("DECLINED") {
            Self::Declined
        } else {
            Self::Other(trimmed.to_string())
        }
    }

    /// Returns the canonical string form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Draft => "DRAFT",
            Self::Processed => "PROCESSED",
            Self::Declined => "DECLINED",
            Self::Other(s) => s,
        }
    }

    /// Returns true for `Processed` and `Declined`.
    #[inline]
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Processed | Self::Declined)
    }
}

impl fmt::Display for OfferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for OfferStatus {
    fn from(value: String) -> Self {
        Self::from_provider(&value)
    }
}

impl From<OfferStatus> for String {
    fn from(value: OfferStatus) -> Self {
        value.as_str().to_string()
    }
}

/// Applicant marital status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MaritalStatus {
    /// Single.
    Single,
    /// Married.
    Married,
    /// Divorced.
    Divorced,
    /// Living with a partner.
    Cohabiting,
}

impl MaritalStatus {
    /// Returns the canonical string form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Single => "SINGLE",
            Self::Married => "MARRIED",
            Self::Divorced => "DIVORCED",
            Self::Cohabiting => "COHABITING",
        }
    }
}

impl fmt::Display for MaritalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MaritalStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "SINGLE" => Ok(Self::Single),
            "MARRIED" => Ok(Self::Married),
            "DIVORCED" => Ok(Self::Divorced),
            "COHABITING" => Ok(Self::Cohabiting),
            _ => Err(ParseEnumError::InvalidValue("MaritalStatus", s.to_string())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    mod offer_status {
        use super::*;

        #[test]
        fn known_values_are_case_insensitive() {
            assert_eq!(OfferStatus::from_provider("draft"), OfferStatus::Draft);
            assert_eq!(OfferStatus::from_provider(" Declined "), OfferStatus::Declined);
        }

        #[test]
        fn unknown_values_are_kept() {
            let status = OfferStatus::from_provider("PENDING_SIGNATURE");
            assert_eq!(status, OfferStatus::Other("PENDING_SIGNATURE".to_string()));
            assert_eq!(status.to_string(), "PENDING_SIGNATURE");
        }

        #[test]
        fn terminal_states() {
            assert!(!OfferStatus::Draft.is_terminal());
            assert!(OfferStatus::Processed.is_terminal());
            assert!(OfferStatus::Declined.is_terminal());
            assert!(!OfferStatus::Other("X".into()).is_terminal());
        }

        #[test]
        fn serde_uses_plain_strings() {
            let json = serde_json::to_string(&OfferStatus::Processed).unwrap();
            assert_eq!(json, "\"PROCESSED\"");
            let status: OfferStatus = serde_json::from_str("\"DRAFT\"").unwrap();
            assert_eq!(status, OfferStatus::Draft);
        }
    }

    mod marital_status {
        use super::*;

        #[test]
        fn parse() {
            assert_eq!(
                "married".parse::<MaritalStatus>().unwrap(),
                MaritalStatus::Married
            );
            assert!("WIDOWED".parse::<MaritalStatus>().is_err());
        }

        #[test]
        fn display() {
            assert_eq!(MaritalStatus::Cohabiting.to_string(), "COHABITING");
        }
    }
}
