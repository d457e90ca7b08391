use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::application::{ApplicationRecord, ApplicationStatus};
use crate::store::{ApplicationStore, Mutator};

const SELECT_COLUMNS: &str = "id, application_type, applicant_id, applicant_display_name, \
     avatar_url, minecraft_username, minecraft_uuid, answers, status, submitted_at, \
     reviewed_at, reviewed_by, notification_message_id";

/// Postgres backing. Per-id atomicity comes from a `SELECT ... FOR UPDATE`
/// transaction around each update.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS applications (
                id UUID PRIMARY KEY,
                application_type TEXT NOT NULL,
                applicant_id TEXT NOT NULL,
                applicant_display_name TEXT NOT NULL,
                avatar_url TEXT NOT NULL,
                minecraft_username TEXT NOT NULL,
                minecraft_uuid TEXT NOT NULL,
                answers JSONB NOT NULL,
                status TEXT NOT NULL,
                submitted_at TIMESTAMPTZ NOT NULL,
                reviewed_at TIMESTAMPTZ,
                reviewed_by TEXT,
                notification_message_id TEXT
            )
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl ApplicationStore for PgStore {
    async fn create(&self, record: ApplicationRecord) -> Result<ApplicationRecord> {
        let result = sqlx::query(
            r#"
            INSERT INTO applications (id, application_type, applicant_id,
                applicant_display_name, avatar_url, minecraft_username,
                minecraft_uuid, answers, status, submitted_at, reviewed_at,
                reviewed_by, notification_message_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(record.id)
        .bind(&record.application_type)
        .bind(&record.applicant_id)
        .bind(&record.applicant_display_name)
        .bind(&record.avatar_url)
        .bind(&record.minecraft_username)
        .bind(&record.minecraft_uuid)
        .bind(serde_json::to_value(&record.answers)?)
        .bind(record.status.as_str())
        .bind(record.submitted_at)
        .bind(record.reviewed_at)
        .bind(record.reviewed_by.as_deref())
        .bind(record.notification_message_id.as_deref())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(record),
            Err(err)
                if err
                    .as_database_error()
                    .map_or(false, |db| db.is_unique_violation()) =>
            {
                Err(Error::Conflict(format!(
                    "Application {} already exists",
                    record.id
                )))
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn get(&self, id: Uuid) -> Result<ApplicationRecord> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM applications WHERE id = $1",
            SELECT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Application {} not found", id)))?;

        map_record(&row)
    }

    async fn update(&self, id: Uuid, mutate: Mutator<'_>) -> Result<ApplicationRecord> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(&format!(
            "SELECT {} FROM applications WHERE id = $1 FOR UPDATE",
            SELECT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Application {} not found", id)))?;

        let mut record = map_record(&row)?;
        mutate(&mut record)?;

        sqlx::query(
            r#"
            UPDATE applications
            SET status = $1, answers = $2, reviewed_at = $3, reviewed_by = $4,
                notification_message_id = $5
            WHERE id = $6
            "#,
        )
        .bind(record.status.as_str())
        .bind(serde_json::to_value(&record.answers)?)
        .bind(record.reviewed_at)
        .bind(record.reviewed_by.as_deref())
        .bind(record.notification_message_id.as_deref())
        .bind(id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(record)
    }
}

fn map_record(row: &PgRow) -> Result<ApplicationRecord> {
    let status_raw: String = row.try_get("status").map_err(Error::Database)?;
    let status: ApplicationStatus = status_raw
        .parse()
        .map_err(|e: String| Error::Internal(e))?;
    let answers_raw: serde_json::Value = row.try_get("answers").map_err(Error::Database)?;

    Ok(ApplicationRecord {
        id: row.try_get("id").map_err(Error::Database)?,
        application_type: row.try_get("application_type").map_err(Error::Database)?,
        applicant_id: row.try_get("applicant_id").map_err(Error::Database)?,
        applicant_display_name: row
            .try_get("applicant_display_name")
            .map_err(Error::Database)?,
        avatar_url: row.try_get("avatar_url").map_err(Error::Database)?,
        minecraft_username: row.try_get("minecraft_username").map_err(Error::Database)?,
        minecraft_uuid: row.try_get("minecraft_uuid").map_err(Error::Database)?,
        answers: serde_json::from_value(answers_raw)?,
        status,
        submitted_at: row
            .try_get::<DateTime<Utc>, _>("submitted_at")
            .map_err(Error::Database)?,
        reviewed_at: row.try_get("reviewed_at").map_err(Error::Database)?,
        reviewed_by: row.try_get("reviewed_by").map_err(Error::Database)?,
        notification_message_id: row
            .try_get("notification_message_id")
            .map_err(Error::Database)?,
    })
}
