//! crates/summarizer_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or HTTP framework.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The style of summary requested by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryType {
    Short,
    Bullet,
    Custom,
}

impl SummaryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SummaryType::Short => "short",
            SummaryType::Bullet => "bullet",
            SummaryType::Custom => "custom",
        }
    }
}

impl std::str::FromStr for SummaryType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "short" => Ok(SummaryType::Short),
            "bullet" => Ok(SummaryType::Bullet),
            "custom" => Ok(SummaryType::Custom),
            other => Err(format!("unknown summary type '{}'", other)),
        }
    }
}

/// The tone the generated summary should be written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Neutral,
    Professional,
    Casual,
    Academic,
}

impl Tone {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::Neutral => "neutral",
            Tone::Professional => "professional",
            Tone::Casual => "casual",
            Tone::Academic => "academic",
        }
    }
}

impl std::str::FromStr for Tone {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "neutral" => Ok(Tone::Neutral),
            "professional" => Ok(Tone::Professional),
            "casual" => Ok(Tone::Casual),
            "academic" => Ok(Tone::Academic),
            other => Err(format!("unknown tone '{}'", other)),
        }
    }
}

/// User-chosen configuration for a single summarization request.
/// Not persisted beyond the request except as part of a [`HistoryRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummaryOptions {
    pub summary_type: SummaryType,
    /// Word-count target, only meaningful when `summary_type` is `Custom`.
    /// Bounded to [50, 1000] by the prompt builder; defaults to 200.
    pub custom_length: Option<u32>,
    pub tone: Tone,
}

/// The kind of document the service knows how to extract text from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Docx,
    PlainText,
}

impl DocumentKind {
    /// Classifies an upload by its declared media type, falling back to the
    /// file extension when the media type is missing or generic
    /// (e.g. `application/octet-stream`).
    pub fn from_mime_and_extension(mime: Option<&str>, extension: Option<&str>) -> Option<Self> {
        match mime {
            Some("application/vnd.openxmlformats-officedocument.wordprocessingml.document") => {
                return Some(DocumentKind::Docx)
            }
            Some("text/plain") => return Some(DocumentKind::PlainText),
            _ => {}
        }
        match extension.map(|e| e.to_ascii_lowercase()).as_deref() {
            Some("docx") => Some(DocumentKind::Docx),
            Some("txt") => Some(DocumentKind::PlainText),
            _ => None,
        }
    }

    pub fn as_mime(&self) -> &'static str {
        match self {
            DocumentKind::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            DocumentKind::PlainText => "text/plain",
        }
    }
}

/// Plain text derived from an uploaded document, plus its source metadata.
/// Held by the caller until a summarization consumes it.
#[derive(Debug, Clone)]
pub struct ExtractedText {
    pub text: String,
    pub word_count: usize,
    pub file_type: String,
    pub file_name: String,
    pub file_size: u64,
}

/// The three highlight categories surfaced alongside a summary.
/// Unordered, with no uniqueness guarantee.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Highlights {
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub names: Vec<String>,
    #[serde(default)]
    pub dates: Vec<String>,
}

/// The outcome of one summarization call. Transient until persisted.
#[derive(Debug, Clone)]
pub struct SummaryResult {
    pub summary: String,
    pub highlights: Highlights,
    pub original_word_count: usize,
    pub summary_word_count: usize,
    /// Integer percentage reduction in word count; negative when the
    /// summary is longer than the input.
    pub compression_ratio: i32,
}

/// A completed summarization as submitted for persistence. The store
/// assigns the id and creation timestamp.
#[derive(Debug, Clone)]
pub struct NewHistoryRecord {
    pub user_id: Uuid,
    pub file_name: String,
    pub file_size: u64,
    pub file_type: String,
    /// Excerpt of the source text, capped at 1,000 characters.
    pub original_text: String,
    pub result: SummaryResult,
    pub summary_type: SummaryType,
    pub tone: Tone,
    pub custom_length: Option<u32>,
}

/// A persisted, user-scoped summarization result. Immutable after creation
/// except for deletion; there is no update operation.
#[derive(Debug, Clone)]
pub struct HistoryRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub file_name: String,
    pub file_size: u64,
    pub file_type: String,
    pub original_text: String,
    pub summary: String,
    pub summary_type: SummaryType,
    pub tone: Tone,
    pub custom_length: Option<u32>,
    pub original_word_count: usize,
    pub summary_word_count: usize,
    pub compression_ratio: i32,
    pub highlights: Highlights,
    pub created_at: DateTime<Utc>,
}

// Represents a user - used throughout the app
#[derive(Debug, Clone)]
pub struct User {
    pub user_id: Uuid,
    pub email: Option<String>,
}

// Only used internally for login/signup - contains sensitive data
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user_id: Uuid,
    pub email: String,
    pub hashed_password: String,
}

// Represents a browser login session (auth cookie)
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub id: String,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
}
