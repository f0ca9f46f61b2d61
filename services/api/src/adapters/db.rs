//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete
//! implementation of the `DatabaseService` port from the `core` crate. It
//! handles all interactions with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use summarizer_core::domain::{
    Highlights, HistoryRecord, NewHistoryRecord, SummaryType, Tone, User, UserCredentials,
};
use summarizer_core::ports::{DatabaseService, PortError, PortResult};
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `DatabaseService` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct UserRecord {
    user_id: Uuid,
    email: String,
}
impl UserRecord {
    fn to_domain(self) -> User {
        User {
            user_id: self.user_id,
            email: Some(self.email),
        }
    }
}

#[derive(FromRow)]
struct UserCredentialsRecord {
    user_id: Uuid,
    email: String,
    hashed_password: String,
}
impl UserCredentialsRecord {
    fn to_domain(self) -> UserCredentials {
        UserCredentials {
            user_id: self.user_id,
            email: self.email,
            hashed_password: self.hashed_password,
        }
    }
}

#[derive(FromRow)]
struct AuthSessionRecord {
    user_id: Uuid,
    expires_at: DateTime<Utc>,
}

#[derive(FromRow)]
struct SummaryRecord {
    id: Uuid,
    user_id: Uuid,
    file_name: String,
    file_size: i64,
    file_type: String,
    original_text: String,
    summary: String,
    summary_type: String,
    tone: String,
    custom_length: Option<i32>,
    original_word_count: i32,
    summary_word_count: i32,
    compression_ratio: i32,
    keywords: Vec<String>,
    names: Vec<String>,
    dates: Vec<String>,
    created_at: DateTime<Utc>,
}

impl SummaryRecord {
    fn to_domain(self) -> PortResult<HistoryRecord> {
        let summary_type = self
            .summary_type
            .parse::<SummaryType>()
            .map_err(PortError::Unexpected)?;
        let tone = self.tone.parse::<Tone>().map_err(PortError::Unexpected)?;
        Ok(HistoryRecord {
            id: self.id,
            user_id: self.user_id,
            file_name: self.file_name,
            file_size: self.file_size as u64,
            file_type: self.file_type,
            original_text: self.original_text,
            summary: self.summary,
            summary_type,
            tone,
            custom_length: self.custom_length.map(|n| n as u32),
            original_word_count: self.original_word_count as usize,
            summary_word_count: self.summary_word_count as usize,
            compression_ratio: self.compression_ratio,
            highlights: Highlights {
                keywords: self.keywords,
                names: self.names,
                dates: self.dates,
            },
            created_at: self.created_at,
        })
    }
}

const SUMMARY_COLUMNS: &str = "id, user_id, file_name, file_size, file_type, original_text, \
     summary, summary_type, tone, custom_length, original_word_count, summary_word_count, \
     compression_ratio, keywords, names, dates, created_at";

//=========================================================================================
// `DatabaseService` Trait Implementation
//=========================================================================================

#[async_trait]
impl DatabaseService for DbAdapter {
    async fn create_user_with_email(
        &self,
        email: &str,
        hashed_password: &str,
    ) -> PortResult<User> {
        let record = sqlx::query_as::<_, UserRecord>(
            "INSERT INTO users (user_id, email, hashed_password) VALUES ($1, $2, $3) \
             RETURNING user_id, email",
        )
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(hashed_password)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;

        Ok(record.to_domain())
    }

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials> {
        let record = sqlx::query_as::<_, UserCredentialsRecord>(
            "SELECT user_id, email, hashed_password FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => PortError::NotFound(format!("User {} not found", email)),
            _ => PortError::Unexpected(e.to_string()),
        })?;

        Ok(record.to_domain())
    }

    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        sqlx::query("INSERT INTO auth_sessions (id, user_id, expires_at) VALUES ($1, $2, $3)")
            .bind(session_id)
            .bind(user_id)
            .bind(expires_at)
            .execute(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(())
    }

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid> {
        let record = sqlx::query_as::<_, AuthSessionRecord>(
            "SELECT user_id, expires_at FROM auth_sessions WHERE id = $1",
        )
        .bind(session_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => PortError::Unauthorized,
            _ => PortError::Unexpected(e.to_string()),
        })?;

        if record.expires_at < Utc::now() {
            return Err(PortError::Unauthorized);
        }
        Ok(record.user_id)
    }

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()> {
        sqlx::query("DELETE FROM auth_sessions WHERE id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(())
    }

    async fn save_history_record(&self, record: NewHistoryRecord) -> PortResult<HistoryRecord> {
        let query = format!(
            "INSERT INTO summaries (id, user_id, file_name, file_size, file_type, \
             original_text, summary, summary_type, tone, custom_length, \
             original_word_count, summary_word_count, compression_ratio, \
             keywords, names, dates) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16) \
             RETURNING {}",
            SUMMARY_COLUMNS
        );
        let row = sqlx::query_as::<_, SummaryRecord>(&query)
            .bind(Uuid::new_v4())
            .bind(record.user_id)
            .bind(&record.file_name)
            .bind(record.file_size as i64)
            .bind(&record.file_type)
            .bind(&record.original_text)
            .bind(&record.result.summary)
            .bind(record.summary_type.as_str())
            .bind(record.tone.as_str())
            .bind(record.custom_length.map(|n| n as i32))
            .bind(record.result.original_word_count as i32)
            .bind(record.result.summary_word_count as i32)
            .bind(record.result.compression_ratio)
            .bind(&record.result.highlights.keywords)
            .bind(&record.result.highlights.names)
            .bind(&record.result.highlights.dates)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        row.to_domain()
    }

    async fn get_history_for_user(&self, user_id: Uuid) -> PortResult<Vec<HistoryRecord>> {
        let query = format!(
            "SELECT {} FROM summaries WHERE user_id = $1 ORDER BY created_at DESC",
            SUMMARY_COLUMNS
        );
        let rows = sqlx::query_as::<_, SummaryRecord>(&query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        rows.into_iter().map(|r| r.to_domain()).collect()
    }

    async fn get_history_record(
        &self,
        user_id: Uuid,
        record_id: Uuid,
    ) -> PortResult<HistoryRecord> {
        let query = format!(
            "SELECT {} FROM summaries WHERE id = $1 AND user_id = $2",
            SUMMARY_COLUMNS
        );
        let row = sqlx::query_as::<_, SummaryRecord>(&query)
            .bind(record_id)
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::RowNotFound => {
                    PortError::NotFound(format!("Summary {} not found", record_id))
                }
                _ => PortError::Unexpected(e.to_string()),
            })?;

        row.to_domain()
    }

    async fn delete_history_record(&self, user_id: Uuid, record_id: Uuid) -> PortResult<()> {
        let result = sqlx::query("DELETE FROM summaries WHERE id = $1 AND user_id = $2")
            .bind(record_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!(
                "Summary {} not found",
                record_id
            )));
        }
        Ok(())
    }
}
