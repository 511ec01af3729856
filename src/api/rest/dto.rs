//! Request and response bodies.

use crate::domain::entities::{Applicant, Application, Offer};
use crate::domain::value_objects::{ApplicationId, MaritalStatus, OfferId, OfferStatus, ProviderId};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Country prefix every applicant phone number must carry.
pub const PHONE_PREFIX: &str = "+371";

/// Total length of a valid phone number including the `+`.
pub const PHONE_LENGTH: usize = 12;

/// Body of `POST /api/applications`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationRequest {
    /// E.164 phone number.
    pub phone: String,
    /// Contact email.
    pub email: String,
    /// Net monthly income.
    #[serde(with = "rust_decimal::serde::float")]
    pub monthly_income: Decimal,
    /// Monthly expenses.
    #[serde(with = "rust_decimal::serde::float")]
    pub monthly_expenses: Decimal,
    /// Monthly payments on existing credit.
    #[serde(with = "rust_decimal::serde::float")]
    pub monthly_credit_liabilities: Decimal,
    /// One of `SINGLE`, `MARRIED`, `DIVORCED`, `COHABITING`.
    pub marital_status: String,
    /// Number of dependents.
    pub dependents: i64,
    /// Consent to share data.
    #[serde(default)]
    pub agree_to_data_sharing: bool,
    /// Consent to be scored.
    #[serde(default)]
    pub agree_to_be_scored: bool,
    /// Requested amount.
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
}

impl ApplicationRequest {
    /// Validates every field and converts to the domain applicant.
    ///
    /// Returns the first problem found as a human-readable message.
    ///
    /// # Errors
    ///
    /// Returns the validation message for the first invalid field.
    pub fn into_applicant(self) -> Result<(Applicant, Decimal), String> {
        validate_phone(&self.phone)?;
        validate_email(&self.email)?;

        for (field, value) in [
            ("monthlyIncome", self.monthly_income),
            ("monthlyExpenses", self.monthly_expenses),
            ("monthlyCreditLiabilities", self.monthly_credit_liabilities),
            ("amount", self.amount),
        ] {
            if value.is_sign_negative() && !value.is_zero() {
                return Err(format!("{field} must be greater than or equal to 0"));
            }
        }

        let dependents = u32::try_from(self.dependents)
            .map_err(|_| "dependents must be greater than or equal to 0".to_string())?;

        let marital_status = match self.marital_status.as_str() {
            "SINGLE" => MaritalStatus::Single,
            "MARRIED" => MaritalStatus::Married,
            "DIVORCED" => MaritalStatus::Divorced,
            "COHABITING" => MaritalStatus::Cohabiting,
            other => {
                return Err(format!(
                    "maritalStatus must be one of SINGLE MARRIED DIVORCED COHABITING, got '{other}'"
                ));
            }
        };

        let applicant = Applicant {
            phone: self.phone,
            email: self.email,
            monthly_income: self.monthly_income,
            monthly_expenses: self.monthly_expenses,
            monthly_credit_liabilities: self.monthly_credit_liabilities,
            dependents,
            marital_status,
            agree_to_data_sharing: self.agree_to_data_sharing,
            agree_to_be_scored: self.agree_to_be_scored,
        };
        Ok((applicant, self.amount))
    }
}

fn validate_phone(phone: &str) -> Result<(), String> {
    let digits_only = phone
        .strip_prefix('+')
        .is_some_and(|rest| !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()));

    if !digits_only || !phone.starts_with(PHONE_PREFIX) || phone.len() != PHONE_LENGTH {
        return Err(format!(
            "phone must be an E.164 number starting with {PHONE_PREFIX} and {PHONE_LENGTH} characters long"
        ));
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<(), String> {
    let invalid = || format!("email '{email}' is not a valid address");

    if email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    let Some((local, domain)) = email.split_once('@') else {
        return Err(invalid());
    };
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }
    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 || labels.iter().any(|label| label.is_empty()) {
        return Err(invalid());
    }
    Ok(())
}

/// An offer as returned to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferResponse {
    /// Offer ID.
    pub id: OfferId,
    /// Provider name.
    pub provider: ProviderId,
    /// Current status.
    pub status: OfferStatus,
    /// Monthly installment.
    #[serde(with = "rust_decimal::serde::float")]
    pub monthly_payment_amount: Decimal,
    /// Total repayment.
    #[serde(with = "rust_decimal::serde::float")]
    pub total_repayment_amount: Decimal,
    /// Installment count.
    pub number_of_payments: u32,
    /// Annual percentage rate.
    #[serde(with = "rust_decimal::serde::float")]
    pub annual_percentage_rate: Decimal,
    /// First repayment date.
    pub first_repayment_date: Option<NaiveDate>,
}

impl From<&Offer> for OfferResponse {
    fn from(offer: &Offer) -> Self {
        let terms = offer.terms();
        Self {
            id: offer.id(),
            provider: offer.provider_id().clone(),
            status: offer.status().clone(),
            monthly_payment_amount: terms.monthly_payment_amount,
            total_repayment_amount: terms.total_repayment_amount,
            number_of_payments: terms.number_of_payments,
            annual_percentage_rate: terms.annual_percentage_rate,
            first_repayment_date: terms.first_repayment_date,
        }
    }
}

/// An application as returned to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationResponse {
    /// Application ID.
    pub id: ApplicationId,
    /// Phone number.
    pub phone: String,
    /// Email.
    pub email: String,
    /// Net monthly income.
    #[serde(with = "rust_decimal::serde::float")]
    pub monthly_income: Decimal,
    /// Monthly expenses.
    #[serde(with = "rust_decimal::serde::float")]
    pub monthly_expenses: Decimal,
    /// Monthly payments on existing credit.
    #[serde(with = "rust_decimal::serde::float")]
    pub monthly_credit_liabilities: Decimal,
    /// Marital status.
    pub marital_status: MaritalStatus,
    /// Number of dependents.
    pub dependents: u32,
    /// Consent to share data.
    pub agree_to_data_sharing: bool,
    /// Consent to be scored.
    pub agree_to_be_scored: bool,
    /// Requested amount.
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    /// Offers matching the query.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub offers: Vec<OfferResponse>,
}

impl From<&Application> for ApplicationResponse {
    fn from(application: &Application) -> Self {
        let applicant = application.applicant();
        Self {
            id: application.id(),
            phone: applicant.phone.clone(),
            email: applicant.email.clone(),
            monthly_income: applicant.monthly_income,
            monthly_expenses: applicant.monthly_expenses,
            monthly_credit_liabilities: applicant.monthly_credit_liabilities,
            marital_status: applicant.marital_status,
            dependents: applicant.dependents,
            agree_to_data_sharing: applicant.agree_to_data_sharing,
            agree_to_be_scored: applicant.agree_to_be_scored,
            amount: application.amount(),
            offers: application.offers().iter().map(OfferResponse::from).collect(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(overrides: serde_json::Value) -> ApplicationRequest {
        let mut body = json!({
            "phone": "+37126000000",
            "email": "john@doe.lv",
            "monthlyIncome": 1500.0,
            "monthlyExpenses": 400.0,
            "monthlyCreditLiabilities": 0,
            "maritalStatus": "MARRIED",
            "dependents": 2,
            "agreeToDataSharing": true,
            "agreeToBeScored": false,
            "amount": 2500.5
        });
        if let (Some(target), Some(patch)) = (body.as_object_mut(), overrides.as_object()) {
            for (k, v) in patch {
                target.insert(k.clone(), v.clone());
            }
        }
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn valid_request_converts() {
        let (applicant, amount) = request(json!({})).into_applicant().unwrap();
        assert_eq!(applicant.marital_status, MaritalStatus::Married);
        assert_eq!(applicant.dependents, 2);
        assert_eq!(amount, Decimal::new(25005, 1));
    }

    #[test]
    fn phone_rules() {
        for phone in ["+37126000", "37126000000", "+3712600000a", "+44126000000", "+371260000000"] {
            let err = request(json!({ "phone": phone })).into_applicant().unwrap_err();
            assert!(err.starts_with("phone"), "{phone}: {err}");
        }
    }

    #[test]
    fn email_rules() {
        for email in ["", "john", "john@", "@doe.lv", "john@doe", "jo hn@doe.lv", "a@b@c.lv", "john@doe."] {
            let err = request(json!({ "email": email })).into_applicant().unwrap_err();
            assert!(err.starts_with("email"), "{email}: {err}");
        }
    }

    #[test]
    fn negative_values_rejected() {
        let err = request(json!({ "monthlyExpenses": -1 })).into_applicant().unwrap_err();
        assert!(err.contains("monthlyExpenses"));

        let err = request(json!({ "dependents": -1 })).into_applicant().unwrap_err();
        assert!(err.contains("dependents"));
    }

    #[test]
    fn marital_status_must_be_exact() {
        let err = request(json!({ "maritalStatus": "single" })).into_applicant().unwrap_err();
        assert!(err.contains("maritalStatus"));
    }

    #[test]
    fn response_omits_empty_offers() {
        let (applicant, amount) = request(json!({})).into_applicant().unwrap();
        let application = Application::new(applicant, amount).unwrap();
        let json = serde_json::to_value(ApplicationResponse::from(&application)).unwrap();
        assert!(json.get("offers").is_none());
        assert_eq!(json["maritalStatus"], json!("MARRIED"));
        assert_eq!(json["amount"], json!(2500.5));
    }
}
