use async_trait::async_trait;
use sqlx::{PgPool, Row};

use super::{SchemeStore, StoreError};
use crate::types::{LoanType, RateValue, SchemeId, SchemeRecord};

/// Postgres-backed scheme store: one `schemes` table keyed by the
/// deterministic URL-derived id.
pub struct PostgresSchemeStore {
    pool: PgPool,
}

impl PostgresSchemeStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_record(row: sqlx::postgres::PgRow) -> Result<SchemeRecord, StoreError> {
        let id: String = row.get("id");
        let loan_type: String = row.get("loan_type");
        let loan_type = loan_type
            .parse::<LoanType>()
            .map_err(|e| StoreError::Corrupt {
                id: id.clone(),
                reason: e.to_string(),
            })?;
        let interest_rate: RateValue = serde_json::from_value(row.get("interest_rate"))
            .map_err(|e| StoreError::Corrupt {
                id: id.clone(),
                reason: e.to_string(),
            })?;

        Ok(SchemeRecord {
            id: SchemeId(id),
            title: row.get("title"),
            provider: row.get("provider"),
            loan_type,
            sub_category: row.get("sub_category"),
            interest_rate,
            url: row.get("url"),
            details: row.get("details"),
            last_scraped_at: row.get("last_scraped_at"),
        })
    }
}

#[async_trait]
impl SchemeStore for PostgresSchemeStore {
    async fn upsert(&self, record: &SchemeRecord) -> Result<(), StoreError> {
        // Every column is replaced on conflict: the row is always the
        // output of exactly one scrape, never a merge of two.
        sqlx::query(
            r#"
            INSERT INTO schemes (
                id, title, provider, loan_type, sub_category,
                interest_rate, url, details, last_scraped_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (id) DO UPDATE SET
                title = EXCLUDED.title,
                provider = EXCLUDED.provider,
                loan_type = EXCLUDED.loan_type,
                sub_category = EXCLUDED.sub_category,
                interest_rate = EXCLUDED.interest_rate,
                url = EXCLUDED.url,
                details = EXCLUDED.details,
                last_scraped_at = EXCLUDED.last_scraped_at
            "#,
        )
        .bind(record.id.as_str())
        .bind(&record.title)
        .bind(&record.provider)
        .bind(record.loan_type.as_str())
        .bind(&record.sub_category)
        .bind(serde_json::to_value(&record.interest_rate).map_err(|e| {
            StoreError::Corrupt {
                id: record.id.to_string(),
                reason: e.to_string(),
            }
        })?)
        .bind(&record.url)
        .bind(&record.details)
        .bind(record.last_scraped_at)
        .execute(&self.pool)
        .await?;

        tracing::debug!(id = %record.id, url = %record.url, "Upserted scheme");
        Ok(())
    }

    async fn get(&self, id: &SchemeId) -> Result<Option<SchemeRecord>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, title, provider, loan_type, sub_category,
                   interest_rate, url, details, last_scraped_at
            FROM schemes
            WHERE id = $1
            "#,
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_record).transpose()
    }

    async fn list_all(&self) -> Result<Vec<SchemeRecord>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, title, provider, loan_type, sub_category,
                   interest_rate, url, details, last_scraped_at
            FROM schemes
            ORDER BY loan_type, sub_category, provider
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_record).collect()
    }

    async fn count_for_url(&self, url: &str) -> Result<u64, StoreError> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM schemes WHERE url = $1")
            .bind(url)
            .fetch_one(&self.pool)
            .await?;
        let n: i64 = row.get("n");
        Ok(n as u64)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
