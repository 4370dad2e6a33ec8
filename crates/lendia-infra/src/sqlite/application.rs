//! SQLite application store implementation.
//!
//! Implements `ApplicationStore` from `lendia-core` using sqlx with split
//! read/write pools: raw queries, a private Row struct, reader pool for
//! SELECTs and writer pool for upserts.

use chrono::{DateTime, Utc};
use sqlx::Row;
use uuid::Uuid;

use lendia_core::persistence::ApplicationStore;
use lendia_types::application::{
    ApplicationStatus, Decision, EligibilityResult, StoredApplication,
};
use lendia_types::error::StoreError;
use lendia_types::loan::LoanType;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `ApplicationStore`.
pub struct SqliteApplicationStore {
    pool: DatabasePool,
}

impl SqliteApplicationStore {
    /// Create a new store backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

/// Internal row type for mapping SQLite rows to domain StoredApplication.
struct ApplicationRow {
    id: String,
    loan_type: String,
    status: String,
    fields: String,
    decision: String,
    approved_amount: f64,
    annual_rate_percent: f64,
    emi: f64,
    reasons: String,
    created_at: String,
    persisted_at: String,
}

impl ApplicationRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            loan_type: row.try_get("loan_type")?,
            status: row.try_get("status")?,
            fields: row.try_get("fields")?,
            decision: row.try_get("decision")?,
            approved_amount: row.try_get("approved_amount")?,
            annual_rate_percent: row.try_get("annual_rate_percent")?,
            emi: row.try_get("emi")?,
            reasons: row.try_get("reasons")?,
            created_at: row.try_get("created_at")?,
            persisted_at: row.try_get("persisted_at")?,
        })
    }

    fn into_application(self) -> Result<StoredApplication, StoreError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| StoreError::Query(format!("invalid application id: {e}")))?;
        let loan_type: LoanType = self.loan_type.parse().map_err(StoreError::Query)?;
        let status: ApplicationStatus = self.status.parse().map_err(StoreError::Query)?;
        let decision: Decision = self.decision.parse().map_err(StoreError::Query)?;
        let fields = serde_json::from_str(&self.fields)
            .map_err(|e| StoreError::Serialization(format!("invalid fields json: {e}")))?;
        let reasons = serde_json::from_str(&self.reasons)
            .map_err(|e| StoreError::Serialization(format!("invalid reasons json: {e}")))?;
        let created_at = parse_datetime(&self.created_at)?;
        let persisted_at = parse_datetime(&self.persisted_at)?;

        Ok(StoredApplication {
            record: lendia_types::application::ApplicationRecord {
                id,
                loan_type,
                fields,
                created_at,
                status,
            },
            result: EligibilityResult {
                decision,
                approved_amount: self.approved_amount,
                annual_rate_percent: self.annual_rate_percent,
                emi: self.emi,
                reasons,
            },
            persisted_at,
        })
    }
}

fn parse_datetime(raw: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StoreError::Query(format!("invalid datetime '{raw}': {e}")))
}

fn map_sqlx(err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
            StoreError::Connection(err.to_string())
        }
        _ => StoreError::Query(err.to_string()),
    }
}

impl ApplicationStore for SqliteApplicationStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn write(&self, application: &StoredApplication) -> Result<(), StoreError> {
        let fields = serde_json::to_string(&application.record.fields)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        let reasons = serde_json::to_string(&application.result.reasons)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT OR REPLACE INTO applications
                (id, loan_type, status, fields, decision, approved_amount,
                 annual_rate_percent, emi, reasons, created_at, persisted_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(application.record.id.to_string())
        .bind(application.record.loan_type.to_string())
        .bind(application.record.status.to_string())
        .bind(fields)
        .bind(application.result.decision.to_string())
        .bind(application.result.approved_amount)
        .bind(application.result.annual_rate_percent)
        .bind(application.result.emi)
        .bind(reasons)
        .bind(application.record.created_at.to_rfc3339())
        .bind(application.persisted_at.to_rfc3339())
        .execute(&self.pool.writer)
        .await
        .map_err(map_sqlx)?;

        Ok(())
    }

    async fn read(&self, id: &Uuid) -> Result<Option<StoredApplication>, StoreError> {
        let row = sqlx::query("SELECT * FROM applications WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(map_sqlx)?;

        match row {
            Some(row) => {
                let parsed = ApplicationRow::from_row(&row).map_err(map_sqlx)?;
                Ok(Some(parsed.into_application()?))
            }
            None => Ok(None),
        }
    }

    async fn list(
        &self,
        loan_type: Option<LoanType>,
    ) -> Result<Vec<StoredApplication>, StoreError> {
        let rows = match loan_type {
            Some(loan_type) => {
                sqlx::query(
                    "SELECT * FROM applications WHERE loan_type = ? ORDER BY created_at DESC",
                )
                .bind(loan_type.to_string())
                .fetch_all(&self.pool.reader)
                .await
            }
            None => {
                sqlx::query("SELECT * FROM applications ORDER BY created_at DESC")
                    .fetch_all(&self.pool.reader)
                    .await
            }
        }
        .map_err(map_sqlx)?;

        rows.iter()
            .map(|row| {
                ApplicationRow::from_row(row)
                    .map_err(map_sqlx)
                    .and_then(ApplicationRow::into_application)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lendia_types::application::ApplicationRecord;
    use lendia_types::loan::FieldValue;

    async fn store(dir: &tempfile::TempDir) -> SqliteApplicationStore {
        let url = format!(
            "sqlite://{}?mode=rwc",
            dir.path().join("lendia.db").display()
        );
        SqliteApplicationStore::new(DatabasePool::new(&url).await.unwrap())
    }

    fn sample(loan_type: LoanType) -> StoredApplication {
        let mut record = ApplicationRecord::new(loan_type);
        record
            .fields
            .insert("Customer_Name".to_string(), FieldValue::Text("Riya".into()));
        record
            .fields
            .insert("CIBIL_Score".to_string(), FieldValue::Number(760.0));
        record.status = ApplicationStatus::Scored;

        StoredApplication {
            record,
            result: EligibilityResult {
                decision: Decision::Approved,
                approved_amount: 800_000.0,
                annual_rate_percent: 9.5,
                emi: 16_801.0,
                reasons: vec!["within capacity".to_string()],
            },
            persisted_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_write_read_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir).await;
        let application = sample(LoanType::Education);

        store.write(&application).await.unwrap();
        let loaded = store.read(&application.record.id).await.unwrap().unwrap();

        assert_eq!(loaded.record.id, application.record.id);
        assert_eq!(loaded.record.loan_type, LoanType::Education);
        assert_eq!(loaded.record.status, ApplicationStatus::Scored);
        assert_eq!(loaded.record.number("CIBIL_Score"), 760.0);
        assert_eq!(loaded.result.decision, Decision::Approved);
        assert_eq!(loaded.result.reasons, vec!["within capacity".to_string()]);
    }

    #[tokio::test]
    async fn test_read_missing_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir).await;
        assert!(store.read(&Uuid::now_v7()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_rewrite_same_id_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir).await;
        let application = sample(LoanType::Gold);

        store.write(&application).await.unwrap();
        store.write(&application).await.unwrap();

        let all = store.list(None).await.unwrap();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn test_list_filters_by_loan_type() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir).await;
        store.write(&sample(LoanType::Education)).await.unwrap();
        store.write(&sample(LoanType::Education)).await.unwrap();
        store.write(&sample(LoanType::Car)).await.unwrap();

        let education = store.list(Some(LoanType::Education)).await.unwrap();
        assert_eq!(education.len(), 2);
        let gold = store.list(Some(LoanType::Gold)).await.unwrap();
        assert!(gold.is_empty());
        let all = store.list(None).await.unwrap();
        assert_eq!(all.len(), 3);
    }
}
