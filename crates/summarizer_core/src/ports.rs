//! crates/summarizer_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the
//! core to be independent of specific external implementations like databases
//! or hosted AI models.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{
    DocumentKind, HistoryRecord, Highlights, NewHistoryRecord, SummaryOptions, User,
    UserCredentials,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services
/// (e.g., database, AI model, document converter).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    /// The caller supplied input the operation cannot work with
    /// (e.g., a document with no extractable text). Maps to a 400.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
    #[error("Unauthorized")]
    Unauthorized,
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait DatabaseService: Send + Sync {
    // --- Auth Methods ---
    async fn create_user_with_email(
        &self,
        email: &str,
        hashed_password: &str,
    ) -> PortResult<User>;

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials>;

    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()>;

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid>;

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()>;

    // --- History Management ---
    async fn save_history_record(&self, record: NewHistoryRecord) -> PortResult<HistoryRecord>;

    /// All of a user's records, newest first.
    async fn get_history_for_user(&self, user_id: Uuid) -> PortResult<Vec<HistoryRecord>>;

    async fn get_history_record(
        &self,
        user_id: Uuid,
        record_id: Uuid,
    ) -> PortResult<HistoryRecord>;

    async fn delete_history_record(&self, user_id: Uuid, record_id: Uuid) -> PortResult<()>;
}

#[async_trait]
pub trait TextExtractionService: Send + Sync {
    /// Converts a document's raw bytes into plain text. The result is
    /// uncapped; callers apply the shared length cap.
    async fn extract_text(&self, data: &[u8], kind: DocumentKind) -> PortResult<String>;
}

#[async_trait]
pub trait SummarizationService: Send + Sync {
    /// Generates a summary of `text` according to the given options.
    /// The requested length and structure are advisory to the model,
    /// not enforced here.
    async fn summarize(&self, text: &str, options: &SummaryOptions) -> PortResult<String>;
}

#[async_trait]
pub trait HighlightExtractionService: Send + Sync {
    /// Extracts keywords, names, and dates from `text`. A response the
    /// model formats badly degrades to empty sets rather than an error;
    /// only transport failures surface as `Err`.
    async fn extract_highlights(&self, text: &str) -> PortResult<Highlights>;
}
