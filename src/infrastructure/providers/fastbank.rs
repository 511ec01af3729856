//! # FastBank Adapter
//!
//! REST integration with FastBank.
//!
//! - `POST {base}/applications` submits, answering `200` or `201`
//! - `GET {base}/applications/{id}` reads the current state
//!
//! FastBank scores on income and existing credit liabilities and requires
//! consent to data sharing.

use crate::domain::entities::{Application, ProviderOffer};
use crate::domain::value_objects::ProviderId;
use crate::infrastructure::providers::error::ProviderResult;
use crate::infrastructure::providers::http_client::{HttpClient, endpoint, parse_base_url};
use crate::infrastructure::providers::traits::ProviderAdapter;
use crate::infrastructure::providers::wire::BankApplicationResponse;
use async_trait::async_trait;
use reqwest::Url;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

/// Registry key of the FastBank adapter.
pub const FASTBANK_ID: &str = "fastbank";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FastBankApplicationRequest<'a> {
    phone_number: &'a str,
    email: &'a str,
    #[serde(with = "rust_decimal::serde::float")]
    monthly_income_amount: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    monthly_credit_liabilities: Decimal,
    dependents: u32,
    agree_to_data_sharing: bool,
    #[serde(with = "rust_decimal::serde::float")]
    amount: Decimal,
}

impl<'a> From<&'a Application> for FastBankApplicationRequest<'a> {
    fn from(application: &'a Application) -> Self {
        let applicant = application.applicant();
        Self {
            phone_number: &applicant.phone,
            email: &applicant.email,
            monthly_income_amount: applicant.monthly_income,
            monthly_credit_liabilities: applicant.monthly_credit_liabilities,
            dependents: applicant.dependents,
            agree_to_data_sharing: applicant.agree_to_data_sharing,
            amount: application.amount(),
        }
    }
}

/// FastBank provider adapter.
#[derive(Debug, Clone)]
pub struct FastBankAdapter {
    provider_id: ProviderId,
    base_url: Url,
    http: HttpClient,
}

impl FastBankAdapter {
    /// Creates a FastBank adapter for the given base URL.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::Internal` if the base URL is invalid or the
    /// HTTP client cannot be built.
    pub fn new(base_url: impl AsRef<str>, timeout_ms: u64) -> ProviderResult<Self> {
        Ok(Self {
            provider_id: ProviderId::new(FASTBANK_ID),
            base_url: parse_base_url(base_url.as_ref())?,
            http: HttpClient::new(timeout_ms)?,
        })
    }
}

#[async_trait]
impl ProviderAdapter for FastBankAdapter {
    fn provider_id(&self) -> &ProviderId {
        &self.provider_id
    }

    fn timeout_ms(&self) -> u64 {
        self.http.timeout_ms()
    }

    async fn submit(&self, application: &Application) -> ProviderResult<ProviderOffer> {
        let url = endpoint(&self.base_url, &["applications"])?;
        debug!(provider = %self.provider_id, application_id = %application.id(), "submitting application");

        let response: BankApplicationResponse = self
            .http
            .post(url.as_str(), &FastBankApplicationRequest::from(application))
            .await?;
        Ok(response.into_provider_offer(&self.provider_id))
    }

    async fn fetch_status(&self, external_id: &str) -> ProviderResult<ProviderOffer> {
        let url = endpoint(&self.base_url, &["applications", external_id])?;
        let response: BankApplicationResponse = self.http.get(url.as_str()).await?;
        Ok(response.into_provider_offer(&self.provider_id))
    }
}
