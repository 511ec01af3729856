//! # PostgreSQL Application Repository

use crate::domain::entities::{Applicant, Application};
use crate::domain::value_objects::{ApplicationId, MaritalStatus};
use crate::infrastructure::persistence::postgres::map_sqlx_error;
use crate::infrastructure::persistence::postgres::offer_repository::{
    OFFER_COLUMNS, OfferRow, push_status_filter,
};
use crate::infrastructure::persistence::traits::{
    ApplicationRepository, OfferFilter, RepositoryError, RepositoryResult,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, QueryBuilder};
use uuid::Uuid;

/// PostgreSQL implementation of [`ApplicationRepository`].
///
/// # Examples
///
/// ```ignore
/// use sqlx::PgPool;
/// use financing_aggregator::infrastructure::persistence::postgres::PostgresApplicationRepository;
///
/// let pool = PgPool::connect("postgres://...").await?;
/// let repo = PostgresApplicationRepository::new(pool);
/// ```
#[derive(Debug, Clone)]
pub struct PostgresApplicationRepository {
    pool: PgPool,
}

impl PostgresApplicationRepository {
    /// Creates a new PostgreSQL application repository.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ApplicationRepository for PostgresApplicationRepository {
    async fn create(&self, application: &Application) -> RepositoryResult<()> {
        let applicant = application.applicant();
        let dependents = i32::try_from(applicant.dependents).map_err(|_| {
            RepositoryError::serialization(format!("dependents {} too large", applicant.dependents))
        })?;

        sqlx::query(
            r#"
            INSERT INTO applications (
                id, phone, email, monthly_income, monthly_expenses,
                monthly_credit_liabilities, dependents, marital_status,
                agree_to_data_sharing, agree_to_be_scored, amount, submitted_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(application.id().get())
        .bind(&applicant.phone)
        .bind(&applicant.email)
        .bind(applicant.monthly_income)
        .bind(applicant.monthly_expenses)
        .bind(applicant.monthly_credit_liabilities)
        .bind(dependents)
        .bind(applicant.marital_status.as_str())
        .bind(applicant.agree_to_data_sharing)
        .bind(applicant.agree_to_be_scored)
        .bind(application.amount())
        .bind(application.submitted_at())
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("Application", application.id().to_string(), e))?;

        Ok(())
    }

    async fn get_with_offers(
        &self,
        id: ApplicationId,
        filter: &OfferFilter,
    ) -> RepositoryResult<Application> {
        let row: ApplicationRow = sqlx::query_as(
            r#"
            SELECT id, phone, email, monthly_income, monthly_expenses,
                   monthly_credit_liabilities, dependents, marital_status,
                   agree_to_data_sharing, agree_to_be_scored, amount, submitted_at
            FROM applications
            WHERE id = $1
            "#,
        )
        .bind(id.get())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("Application", id.to_string(), e))?
        .ok_or_else(|| RepositoryError::not_found("Application", id.to_string()))?;

        let mut builder = QueryBuilder::new(format!(
            "SELECT {OFFER_COLUMNS} FROM offers WHERE application_id = "
        ));
        builder.push_bind(id.get());
        push_status_filter(&mut builder, filter);
        builder.push(" ORDER BY created_at ASC, id ASC");

        let offer_rows: Vec<OfferRow> = builder
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepositoryError::query(e.to_string()))?;

        let offers = offer_rows
            .into_iter()
            .map(OfferRow::try_into_offer)
            .collect::<RepositoryResult<Vec<_>>>()?;

        Ok(row.try_into_application()?.with_offers(offers))
    }
}

/// Database row for an application.
#[derive(Debug, sqlx::FromRow)]
struct ApplicationRow {
    id: Uuid,
    phone: String,
    email: String,
    monthly_income: Decimal,
    monthly_expenses: Decimal,
    monthly_credit_liabilities: Decimal,
    dependents: i32,
    marital_status: String,
    agree_to_data_sharing: bool,
    agree_to_be_scored: bool,
    amount: Decimal,
    submitted_at: DateTime<Utc>,
}

impl ApplicationRow {
    fn try_into_application(self) -> RepositoryResult<Application> {
        let marital_status: MaritalStatus = self
            .marital_status
            .parse()
            .map_err(|e: crate::domain::value_objects::ParseEnumError| {
                RepositoryError::serialization(e.to_string())
            })?;
        let dependents = u32::try_from(self.dependents).map_err(|_| {
            RepositoryError::serialization(format!("negative dependents on {}", self.id))
        })?;

        Ok(Application::from_parts(
            ApplicationId::from_uuid(self.id),
            Applicant {
                phone: self.phone,
                email: self.email,
                monthly_income: self.monthly_income,
                monthly_expenses: self.monthly_expenses,
                monthly_credit_liabilities: self.monthly_credit_liabilities,
                dependents,
                marital_status,
                agree_to_data_sharing: self.agree_to_data_sharing,
                agree_to_be_scored: self.agree_to_be_scored,
            },
            self.amount,
            self.submitted_at,
        ))
    }
}
