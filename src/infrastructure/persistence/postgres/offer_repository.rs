//! # PostgreSQL Offer Repository

use crate::domain::entities::{Offer, OfferTerms};
use crate::domain::value_objects::{ApplicationId, OfferId, OfferStatus, ProviderId};
use crate::infrastructure::persistence::postgres::map_sqlx_error;
use crate::infrastructure::persistence::traits::{
    OfferFilter, OfferRepository, RepositoryError, RepositoryResult,
};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

pub(crate) const OFFER_COLUMNS: &str = "id, application_id, provider_id, external_id, status, \
     monthly_payment_amount, total_repayment_amount, number_of_payments, \
     annual_percentage_rate, first_repayment_date, created_at, updated_at";

/// PostgreSQL implementation of [`OfferRepository`].
///
/// Relies on the `offers_application_provider_key` unique constraint for
/// the one-offer-per-provider rule.
#[derive(Debug, Clone)]
pub struct PostgresOfferRepository {
    pool: PgPool,
}

impl PostgresOfferRepository {
    /// Creates a new PostgreSQL offer repository.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Appends ` AND <status condition>` for `filter`.
pub(crate) fn push_status_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &OfferFilter) {
    match filter {
        OfferFilter::All => {}
        OfferFilter::Status(status) => {
            builder
                .push(" AND status = ")
                .push_bind(status.as_str().to_string());
        }
        OfferFilter::NonFinal => {
            builder.push(" AND status NOT IN ('PROCESSED', 'DECLINED')");
        }
    }
}

#[async_trait]
impl OfferRepository for PostgresOfferRepository {
    async fn create(&self, offer: &Offer) -> RepositoryResult<()> {
        let terms = offer.terms();
        sqlx::query(
            r#"
            INSERT INTO offers (
                id, application_id, provider_id, external_id, status,
                monthly_payment_amount, total_repayment_amount, number_of_payments,
                annual_percentage_rate, first_repayment_date, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(offer.id().get())
        .bind(offer.application_id().get())
        .bind(offer.provider_id().as_str())
        .bind(offer.external_id())
        .bind(offer.status().as_str())
        .bind(terms.monthly_payment_amount)
        .bind(terms.total_repayment_amount)
        .bind(payments_to_db(terms.number_of_payments)?)
        .bind(terms.annual_percentage_rate)
        .bind(terms.first_repayment_date)
        .bind(offer.created_at())
        .bind(offer.updated_at())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            map_sqlx_error(
                "Offer",
                format!("{}/{}", offer.application_id(), offer.provider_id()),
                e,
            )
        })?;

        Ok(())
    }

    async fn list(&self, filter: &OfferFilter) -> RepositoryResult<Vec<Offer>> {
        let mut builder = QueryBuilder::new(format!("SELECT {OFFER_COLUMNS} FROM offers WHERE TRUE"));
        push_status_filter(&mut builder, filter);
        builder.push(" ORDER BY created_at ASC, id ASC");

        let rows: Vec<OfferRow> = builder
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepositoryError::query(e.to_string()))?;

        rows.into_iter().map(OfferRow::try_into_offer).collect()
    }

    async fn update(&self, id: OfferId, offer: &Offer) -> RepositoryResult<()> {
        let terms = offer.terms();
        let result = sqlx::query(
            r#"
            UPDATE offers SET
                external_id = $2,
                status = $3,
                monthly_payment_amount = $4,
                total_repayment_amount = $5,
                number_of_payments = $6,
                annual_percentage_rate = $7,
                first_repayment_date = $8,
                updated_at = $9
            WHERE id = $1
            "#,
        )
        .bind(id.get())
        .bind(offer.external_id())
        .bind(offer.status().as_str())
        .bind(terms.monthly_payment_amount)
        .bind(terms.total_repayment_amount)
        .bind(payments_to_db(terms.number_of_payments)?)
        .bind(terms.annual_percentage_rate)
        .bind(terms.first_repayment_date)
        .bind(offer.updated_at())
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("Offer", id.to_string(), e))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found("Offer", id.to_string()));
        }
        Ok(())
    }
}

fn payments_to_db(payments: u32) -> RepositoryResult<i32> {
    i32::try_from(payments)
        .map_err(|_| RepositoryError::serialization(format!("payment count {payments} too large")))
}

/// Database row for an offer.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct OfferRow {
    id: Uuid,
    application_id: Uuid,
    provider_id: String,
    external_id: String,
    status: String,
    monthly_payment_amount: Decimal,
    total_repayment_amount: Decimal,
    number_of_payments: i32,
    annual_percentage_rate: Decimal,
    first_repayment_date: Option<NaiveDate>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl OfferRow {
    /// Converts the row into an Offer.
    pub(crate) fn try_into_offer(self) -> RepositoryResult<Offer> {
        let number_of_payments = u32::try_from(self.number_of_payments).map_err(|_| {
            RepositoryError::serialization(format!(
                "negative payment count {} on offer {}",
                self.number_of_payments, self.id
            ))
        })?;

        Ok(Offer::from_parts(
            OfferId::from_uuid(self.id),
            ApplicationId::from_uuid(self.application_id),
            ProviderId::new(self.provider_id),
            self.external_id,
            OfferStatus::from_provider(&self.status),
            OfferTerms {
                monthly_payment_amount: self.monthly_payment_amount,
                total_repayment_amount: self.total_repayment_amount,
                number_of_payments,
                annual_percentage_rate: self.annual_percentage_rate,
                first_repayment_date: self.first_repayment_date,
            },
            self.created_at,
            self.updated_at,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_sql() {
        let mut builder: QueryBuilder<'_, Postgres> = QueryBuilder::new("SELECT 1 WHERE TRUE");
        push_status_filter(&mut builder, &OfferFilter::NonFinal);
        assert_eq!(
            builder.sql(),
            "SELECT 1 WHERE TRUE AND status NOT IN ('PROCESSED', 'DECLINED')"
        );

        let mut builder: QueryBuilder<'_, Postgres> = QueryBuilder::new("SELECT 1 WHERE TRUE");
        push_status_filter(&mut builder, &OfferFilter::Status(OfferStatus::Processed));
        assert_eq!(builder.sql(), "SELECT 1 WHERE TRUE AND status = $1");

        let mut builder: QueryBuilder<'_, Postgres> = QueryBuilder::new("SELECT 1 WHERE TRUE");
        push_status_filter(&mut builder, &OfferFilter::All);
        assert_eq!(builder.sql(), "SELECT 1 WHERE TRUE");
    }

    #[test]
    fn payment_count_bounds() {
        assert_eq!(payments_to_db(12).ok(), Some(12));
        assert!(payments_to_db(u32::MAX).is_err());
    }
}
