//! # Application Entity
//!
//! One applicant's financing request.
//!
//! An [`Application`] is a snapshot of the applicant's financial facts at
//! submission time. It is created once, never mutated afterwards and owns
//! the [`Offer`]s that providers return for it.
//!
//! # Examples
//!
//! ```
//! use financing_aggregator::domain::entities::{Applicant, Application};
//! use financing_aggregator::domain::value_objects::MaritalStatus;
//! use rust_decimal::Decimal;
//!
//! let applicant = Applicant {
//!     phone: "+37122334455".to_string(),
//!     email: "anakin@skywalker.com".to_string(),
//!     monthly_income: Decimal::from(1000),
//!     monthly_expenses: Decimal::from(100),
//!     monthly_credit_liabilities: Decimal::ZERO,
//!     dependents: 0,
//!     marital_status: MaritalStatus::Single,
//!     agree_to_data_sharing: true,
//!     agree_to_be_scored: true,
//! };
//!
//! let application = Application::new(applicant, Decimal::from(100)).unwrap();
//! assert!(application.offers().is_empty());
//! ```

use crate::domain::entities::offer::Offer;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::value_objects::{ApplicationId, MaritalStatus};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Financial facts about the applicant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Applicant {
    /// Phone number in E.164 format.
    pub phone: String,
    /// Contact email.
    pub email: String,
    /// Net monthly income.
    pub monthly_income: Decimal,
    /// Monthly living expenses.
    pub monthly_expenses: Decimal,
    /// Monthly payments on existing credit.
    pub monthly_credit_liabilities: Decimal,
    /// Number of dependents.
    pub dependents: u32,
    /// Marital status.
    pub marital_status: MaritalStatus,
    /// Consent to share data with providers.
    pub agree_to_data_sharing: bool,
    /// Consent to be credit scored.
    pub agree_to_be_scored: bool,
}

impl Applicant {
    fn validate(&self) -> DomainResult<()> {
        non_negative("monthly_income", self.monthly_income)?;
        non_negative("monthly_expenses", self.monthly_expenses)?;
        non_negative("monthly_credit_liabilities", self.monthly_credit_liabilities)
    }
}

/// A financing application submitted to every configured provider.
///
/// # Invariants
///
/// - Requested amount and all money fields are non-negative
/// - The identifier is assigned on creation and never changes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    id: ApplicationId,
    applicant: Applicant,
    amount: Decimal,
    submitted_at: DateTime<Utc>,
    offers: Vec<Offer>,
}

impl Application {
    /// Creates a new application with a generated identifier.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidValue` if the amount or any money field
    /// is negative.
    pub fn new(applicant: Applicant, amount: Decimal) -> DomainResult<Self> {
        non_negative("amount", amount)?;
        applicant.validate()?;

        Ok(Self {
            id: ApplicationId::new_v4(),
            applicant,
            amount,
            submitted_at: Utc::now(),
            offers: Vec::new(),
        })
    }

    /// Reconstructs an application from stored parts.
    #[must_use]
    pub fn from_parts(
        id: ApplicationId,
        applicant: Applicant,
        amount: Decimal,
        submitted_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            applicant,
            amount,
            submitted_at,
            offers: Vec::new(),
        }
    }

    /// Attaches the offers loaded alongside this application.
    #[must_use]
    pub fn with_offers(mut self, offers: Vec<Offer>) -> Self {
        self.offers = offers;
        self
    }

    /// Returns the application ID.
    #[inline]
    #[must_use]
    pub fn id(&self) -> ApplicationId {
        self.id
    }

    /// Returns the applicant details.
    #[inline]
    #[must_use]
    pub fn applicant(&self) -> &Applicant {
        &self.applicant
    }

    /// Returns the requested amount.
    #[inline]
    #[must_use]
    pub fn amount(&self) -> Decimal {
        self.amount
    }

    /// Returns when the application was submitted.
    #[inline]
    #[must_use]
    pub fn submitted_at(&self) -> DateTime<Utc> {
        self.submitted_at
    }

    /// Returns the offers loaded with this application.
    #[inline]
    #[must_use]
    pub fn offers(&self) -> &[Offer] {
        &self.offers
    }
}

impl fmt::Display for Application {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Application({}: amount={})", self.id, self.amount)
    }
}

fn non_negative(field: &'static str, value: Decimal) -> DomainResult<()> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(DomainError::invalid_value(field, "must not be negative"));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn applicant() -> Applicant {
        Applicant {
            phone: "+37122334455".to_string(),
            email: "anakin@skywalker.com".to_string(),
            monthly_income: Decimal::from(1000),
            monthly_expenses: Decimal::from(100),
            monthly_credit_liabilities: Decimal::ZERO,
            dependents: 1,
            marital_status: MaritalStatus::Married,
            agree_to_data_sharing: true,
            agree_to_be_scored: false,
        }
    }

    #[test]
    fn new_assigns_id_and_no_offers() {
        let a = Application::new(applicant(), Decimal::from(100)).unwrap();
        let b = Application::new(applicant(), Decimal::from(100)).unwrap();
        assert_ne!(a.id(), b.id());
        assert!(a.offers().is_empty());
        assert_eq!(a.amount(), Decimal::from(100));
    }

    #[test]
    fn zero_amount_is_allowed() {
        assert!(Application::new(applicant(), Decimal::ZERO).is_ok());
    }

    #[test]
    fn negative_amount_is_rejected() {
        let err = Application::new(applicant(), Decimal::from(-1)).unwrap_err();
        assert!(matches!(err, DomainError::InvalidValue { field: "amount", .. }));
    }

    #[test]
    fn negative_income_is_rejected() {
        let mut details = applicant();
        details.monthly_income = Decimal::from(-5);
        let err = Application::new(details, Decimal::from(100)).unwrap_err();
        assert!(matches!(
            err,
            DomainError::InvalidValue {
                field: "monthly_income",
                ..
            }
        ));
    }

    #[test]
    fn from_parts_keeps_identity() {
        let id = ApplicationId::new_v4();
        let now = Utc::now();
        let app = Application::from_parts(id, applicant(), Decimal::from(5), now);
        assert_eq!(app.id(), id);
        assert_eq!(app.submitted_at(), now);
    }
}
