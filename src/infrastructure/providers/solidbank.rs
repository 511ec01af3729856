//! # SolidBank Adapter
//!
//! REST integration with SolidBank, a legacy partner whose TLS certificate
//! does not validate. Its client is built with certificate checks off.

use crate::domain::entities::{Application, ProviderOffer};
use crate::domain::value_objects::{MaritalStatus, ProviderId};
use crate::infrastructure::providers::error::ProviderResult;
use crate::infrastructure::providers::http_client::{HttpClient, endpoint, parse_base_url};
use crate::infrastructure::providers::traits::ProviderAdapter;
use crate::infrastructure::providers::wire::BankApplicationResponse;
use async_trait::async_trait;
use reqwest::Url;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

/// Registry key of the SolidBank adapter.
pub const SOLIDBANK_ID: &str = "solidbank";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SolidBankApplicationRequest<'a> {
    phone: &'a str,
    email: &'a str,
    #[serde(with = "rust_decimal::serde::float")]
    monthly_income: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    monthly_expenses: Decimal,
    marital_status: MaritalStatus,
    agree_to_be_scored: bool,
    #[serde(with = "rust_decimal::serde::float")]
    amount: Decimal,
}

impl<'a> From<&'a Application> for SolidBankApplicationRequest<'a> {
    fn from(application: &'a Application) -> Self {
        let applicant = application.applicant();
        Self {
            phone: &applicant.phone,
            email: &applicant.email,
            monthly_income: applicant.monthly_income,
            monthly_expenses: applicant.monthly_expenses,
            marital_status: applicant.marital_status,
            agree_to_be_scored: applicant.agree_to_be_scored,
            amount: application.amount(),
        }
    }
}

/// SolidBank provider adapter.
#[derive(Debug, Clone)]
pub struct SolidBankAdapter {
    provider_id: ProviderId,
    base_url: Url,
    http: HttpClient,
}

impl SolidBankAdapter {
    /// Creates a SolidBank adapter for the given base URL.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::Internal` if the base URL is invalid or the
    /// HTTP client cannot be built.
    pub fn new(base_url: impl AsRef<str>, timeout_ms: u64) -> ProviderResult<Self> {
        Ok(Self {
            provider_id: ProviderId::new(SOLIDBANK_ID),
            base_url: parse_base_url(base_url.as_ref())?,
            http: HttpClient::insecure(timeout_ms)?,
        })
    }
}

#[async_trait]
impl ProviderAdapter for SolidBankAdapter {
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
            .post(url.as_str(), &SolidBankApplicationRequest::from(application))
            .await?;
        Ok(response.into_provider_offer(&self.provider_id))
    }

    async fn fetch_status(&self, external_id: &str) -> ProviderResult<ProviderOffer> {
        let url = endpoint(&self.base_url, &["applications", external_id])?;
        let response: BankApplicationResponse = self.http.get(url.as_str()).await?;
        Ok(response.into_provider_offer(&self.provider_id))
    }
}
