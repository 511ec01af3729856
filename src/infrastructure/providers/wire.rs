//! Response envelope shared by the bank providers.
//!
//! Both banks answer submit and status requests with the same shape:
//!
//! ```json
//! {
//!   "id": "ext-1",
//!   "status": "PROCESSED",
//!   "offer": {
//!     "monthlyPaymentAmount": 10.5,
//!     "totalRepaymentAmount": 126.0,
//!     "numberOfPayments": 12,
//!     "annualPercentageRate": 12.5,
//!     "firstRepaymentDate": "2026-01-15"
//!   }
//! }
//! ```

use crate::domain::entities::{OfferTerms, ProviderOffer};
use crate::domain::value_objects::{OfferStatus, ProviderId};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Application response returned by a bank.
#[derive(Debug, Clone, Deserialize)]
pub struct BankApplicationResponse {
    /// Bank-side application ID.
    #[serde(default)]
    pub id: String,
    /// Bank-side status string.
    #[serde(default)]
    pub status: String,
    /// Offer terms; absent while the bank has not decided.
    #[serde(default)]
    pub offer: BankOffer,
}

/// Offer terms as a bank encodes them.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BankOffer {
    /// Monthly installment.
    #[serde(default, with = "rust_decimal::serde::float")]
    pub monthly_payment_amount: Decimal,
    /// Total repayment.
    #[serde(default, with = "rust_decimal::serde::float")]
    pub total_repayment_amount: Decimal,
    /// Installment count.
    #[serde(default)]
    pub number_of_payments: u32,
    /// Annual percentage rate.
    #[serde(default, with = "rust_decimal::serde::float")]
    pub annual_percentage_rate: Decimal,
    /// First repayment date, `YYYY-MM-DD`.
    #[serde(default)]
    pub first_repayment_date: Option<String>,
}

impl BankApplicationResponse {
    /// Converts the wire response into the domain representation.
    ///
    /// An unparsable repayment date is dropped rather than treated as an
    /// error.
    #[must_use]
    pub fn into_provider_offer(self, provider_id: &ProviderId) -> ProviderOffer {
        let first_repayment_date = self
            .offer
            .first_repayment_date
            .as_deref()
            .and_then(|raw| NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).ok());

        ProviderOffer {
            provider_id: provider_id.clone(),
            external_id: self.id,
            status: OfferStatus::from_provider(&self.status),
            terms: OfferTerms {
                monthly_payment_amount: self.offer.monthly_payment_amount,
                total_repayment_amount: self.offer.total_repayment_amount,
                number_of_payments: self.offer.number_of_payments,
                annual_percentage_rate: self.offer.annual_percentage_rate,
                first_repayment_date,
            },
        }
    }
}
