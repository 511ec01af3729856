//! # Offer Entity
//!
//! One provider's response to one application.
//!
//! Offers are created once by the fan-out submitter in the `DRAFT` state
//! and afterwards only changed by reconciliation. Terms are whatever the
//! provider reported last.
//!
//! # State Machine
//!
//! ```text
//! DRAFT ──► PROCESSED
//!   │  ▲
//!   ▼  │
//! <provider intermediate> ──► DECLINED
//! ```
//!
//! `PROCESSED` and `DECLINED` are terminal. A reported schedule with zero
//! payments always lands in `DECLINED`, whatever status the provider gave.

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::value_objects::{ApplicationId, OfferId, OfferStatus, ProviderId};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Repayment terms reported by a provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferTerms {
    /// Monthly installment.
    pub monthly_payment_amount: Decimal,
    /// Total amount repaid over the schedule.
    pub total_repayment_amount: Decimal,
    /// Number of installments. Zero means the provider declined.
    pub number_of_payments: u32,
    /// Annual percentage rate.
    pub annual_percentage_rate: Decimal,
    /// Date of the first installment, if the provider reported one.
    pub first_repayment_date: Option<NaiveDate>,
}

impl OfferTerms {
    /// Returns true when the schedule has no payments.
    #[inline]
    #[must_use]
    pub fn is_declined(&self) -> bool {
        self.number_of_payments == 0
    }
}

/// What a provider adapter returns from `submit` and `fetch_status`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderOffer {
    /// Provider that produced the response.
    pub provider_id: ProviderId,
    /// Provider-side identifier of the application.
    pub external_id: String,
    /// Status as reported by the provider.
    pub status: OfferStatus,
    /// Reported terms.
    pub terms: OfferTerms,
}

impl ProviderOffer {
    /// Status after applying the zero-payments rule.
    #[must_use]
    pub fn normalized_status(&self) -> OfferStatus {
        if self.terms.is_declined() {
            OfferStatus::Declined
        } else {
            self.status.clone()
        }
    }
}

/// Outcome of comparing a stored offer with a fresh provider response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconciliation {
    /// Provider reports the status already stored.
    Unchanged,
    /// The offer must be replaced by this record.
    Changed(Offer),
}

/// A persisted provider offer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Offer {
    id: OfferId,
    application_id: ApplicationId,
    provider_id: ProviderId,
    external_id: String,
    status: OfferStatus,
    terms: OfferTerms,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Offer {
    /// Creates the initial `DRAFT` offer for a provider's submit response.
    #[must_use]
    pub fn draft(application_id: ApplicationId, reported: ProviderOffer) -> Self {
        let now = Utc::now();
        Self {
            id: OfferId::new_v4(),
            application_id,
            provider_id: reported.provider_id,
            external_id: reported.external_id,
            status: OfferStatus::Draft,
            terms: reported.terms,
            created_at: now,
            updated_at: now,
        }
    }

    /// Reconstructs an offer from stored parts.
    #[allow(clippy::too_many_arguments)]
    #[must_use]
    pub fn from_parts(
        id: OfferId,
        application_id: ApplicationId,
        provider_id: ProviderId,
        external_id: String,
        status: OfferStatus,
        terms: OfferTerms,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            application_id,
            provider_id,
            external_id,
            status,
            terms,
            created_at,
            updated_at,
        }
    }

    /// Compares this offer with a fresh provider response.
    ///
    /// A reported status equal to the stored one is a no-op, terms
    /// included. Otherwise the returned record carries the reported terms
    /// and the normalized status.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidTransition` if this offer is already
    /// terminal.
    pub fn reconcile(&self, reported: &ProviderOffer) -> DomainResult<Reconciliation> {
        if self.status.is_terminal() {
            return Err(DomainError::invalid_transition(
                self.status.clone(),
                reported.status.clone(),
            ));
        }

        if reported.status == self.status {
            return Ok(Reconciliation::Unchanged);
        }

        let external_id = if reported.external_id.is_empty() {
            self.external_id.clone()
        } else {
            reported.external_id.clone()
        };

        Ok(Reconciliation::Changed(Self {
            id: self.id,
            application_id: self.application_id,
            provider_id: self.provider_id.clone(),
            external_id,
            status: reported.normalized_status(),
            terms: reported.terms.clone(),
            created_at: self.created_at,
            updated_at: Utc::now(),
        }))
    }

    /// Returns the offer ID.
    #[inline]
    #[must_use]
    pub fn id(&self) -> OfferId {
        self.id
    }

    /// Returns the owning application ID.
    #[inline]
    #[must_use]
    pub fn application_id(&self) -> ApplicationId {
        self.application_id
    }

    /// Returns the provider ID.
    #[inline]
    #[must_use]
    pub fn provider_id(&self) -> &ProviderId {
        &self.provider_id
    }

    /// Returns the provider-side identifier.
    #[inline]
    #[must_use]
    pub fn external_id(&self) -> &str {
        &self.external_id
    }

    /// Returns the current status.
    #[inline]
    #[must_use]
    pub fn status(&self) -> &OfferStatus {
        &self.status
    }

    /// Returns the current terms.
    #[inline]
    #[must_use]
    pub fn terms(&self) -> &OfferTerms {
        &self.terms
    }

    /// Returns when the offer was created.
    #[inline]
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns when the offer was last changed.
    #[inline]
    #[must_use]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

impl fmt::Display for Offer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Offer({}: {} {} [{}])",
            self.id, self.provider_id, self.external_id, self.status
        )
    }
}
