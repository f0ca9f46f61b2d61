//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use summarizer_core::domain::{
    DocumentKind, ExtractedText, Highlights, HistoryRecord, NewHistoryRecord, SummaryOptions,
    SummaryResult, SummaryType, Tone,
};
use summarizer_core::ports::PortError;
use summarizer_core::text::{
    cap_extracted_text, compression_ratio, history_excerpt, matches_history_query, word_count,
};
use tracing::error;
use utoipa::{IntoParams, OpenApi, ToSchema};
use uuid::Uuid;

use crate::web::state::AppState;

/// Uploads larger than this are rejected with a 400.
pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// File metadata reported when a pre-extracted text short-circuits the
/// upload without an accompanying file part.
const PLACEHOLDER_FILE_NAME: &str = "extracted.txt";
const PLACEHOLDER_FILE_TYPE: &str = "text/plain";

const NO_TEXT_MESSAGE: &str = "No text could be extracted from the file.";

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        upload_handler,
        summarize_handler,
        list_history_handler,
        get_history_handler,
        delete_history_handler,
        crate::web::auth::signup_handler,
        crate::web::auth::login_handler,
        crate::web::auth::logout_handler,
    ),
    components(schemas(
        ErrorResponse,
        UploadResponse,
        SummarizeRequest,
        SummarizeResponse,
        HighlightSet,
        HistoryRecordResponse,
        crate::web::auth::SignupRequest,
        crate::web::auth::LoginRequest,
        crate::web::auth::AuthResponse,
    )),
    tags(
        (name = "Document Summarizer API", description = "API endpoints for document upload, AI summarization, and history.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

/// The body of every non-2xx response.
#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

/// The extracted text and source metadata returned by a successful upload.
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub text: String,
    pub word_count: usize,
    pub file_type: String,
    pub file_name: String,
    pub file_size: u64,
}

impl From<ExtractedText> for UploadResponse {
    fn from(extracted: ExtractedText) -> Self {
        Self {
            text: extracted.text,
            word_count: extracted.word_count,
            file_type: extracted.file_type,
            file_name: extracted.file_name,
            file_size: extracted.file_size,
        }
    }
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SummarizeRequest {
    pub text: String,
    #[schema(value_type = String)]
    pub summary_type: SummaryType,
    pub custom_length: Option<u32>,
    #[schema(value_type = String)]
    pub tone: Tone,
    /// Source metadata from the upload response, echoed back so the
    /// persisted history record can carry it. Placeholders when absent.
    pub file_name: Option<String>,
    pub file_type: Option<String>,
    pub file_size: Option<u64>,
}

/// The three highlight categories surfaced alongside a summary.
#[derive(Serialize, ToSchema)]
pub struct HighlightSet {
    pub keywords: Vec<String>,
    pub names: Vec<String>,
    pub dates: Vec<String>,
}

impl From<Highlights> for HighlightSet {
    fn from(h: Highlights) -> Self {
        Self {
            keywords: h.keywords,
            names: h.names,
            dates: h.dates,
        }
    }
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SummarizeResponse {
    pub summary: String,
    pub highlights: HighlightSet,
    pub original_word_count: usize,
    pub summary_word_count: usize,
    pub compression_ratio: i32,
}

/// One persisted summarization, as returned by the history endpoints.
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRecordResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub file_name: String,
    pub file_size: u64,
    pub file_type: String,
    pub original_text: String,
    pub summary: String,
    pub summary_type: String,
    pub tone: String,
    pub custom_length: Option<u32>,
    pub original_word_count: usize,
    pub summary_word_count: usize,
    pub compression_ratio: i32,
    pub highlights: HighlightSet,
    pub created_at: DateTime<Utc>,
}

impl From<HistoryRecord> for HistoryRecordResponse {
    fn from(record: HistoryRecord) -> Self {
        Self {
            id: record.id,
            user_id: record.user_id,
            file_name: record.file_name,
            file_size: record.file_size,
            file_type: record.file_type,
            original_text: record.original_text,
            summary: record.summary,
            summary_type: record.summary_type.as_str().to_string(),
            tone: record.tone.as_str().to_string(),
            custom_length: record.custom_length,
            original_word_count: record.original_word_count,
            summary_word_count: record.summary_word_count,
            compression_ratio: record.compression_ratio,
            highlights: record.highlights.into(),
            created_at: record.created_at,
        }
    }
}

#[derive(Deserialize, IntoParams)]
pub struct HistoryQuery {
    /// Case-insensitive substring filter over file name and summary text.
    pub q: Option<String>,
}

type HandlerError = (StatusCode, Json<ErrorResponse>);

fn bad_request(message: impl Into<String>) -> HandlerError {
    (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(message)))
}

fn internal_error(message: impl Into<String>) -> HandlerError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::new(message)),
    )
}

fn port_error_response(e: PortError) -> HandlerError {
    match e {
        PortError::NotFound(message) => (StatusCode::NOT_FOUND, Json(ErrorResponse::new(message))),
        PortError::InvalidInput(message) => bad_request(message),
        PortError::Unauthorized => (
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse::new("Unauthorized")),
        ),
        PortError::Unexpected(message) => {
            error!("Port operation failed: {}", message);
            internal_error("An internal error occurred")
        }
    }
}

//=========================================================================================
// Upload
//=========================================================================================

struct UploadedFile {
    file_name: String,
    content_type: Option<String>,
    data: Bytes,
}

/// Extract plain text from an uploaded document.
///
/// Accepts a multipart/form-data request with a `file` part and an
/// optional `extractedText` part. When `extractedText` is present the
/// conversion step is skipped and the provided text is capped and counted
/// as-is; file metadata is taken from the `file` part when one
/// accompanies it.
#[utoipa::path(
    post,
    path = "/upload",
    request_body(content_type = "multipart/form-data", description = "The document to extract text from."),
    responses(
        (status = 200, description = "Text extracted successfully", body = UploadResponse),
        (status = 400, description = "Unsupported type, oversized file, or no extractable text", body = ErrorResponse),
        (status = 500, description = "Document conversion failed", body = ErrorResponse)
    )
)]
pub async fn upload_handler(
    State(app_state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, HandlerError> {
    let mut file: Option<UploadedFile> = None;
    let mut extracted_text: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        error!("Failed to read multipart data: {}", e);
        internal_error("Failed to read multipart data")
    })? {
        match field.name() {
            Some("file") => {
                let file_name = field.file_name().unwrap_or("untitled").to_string();
                let content_type = field.content_type().map(str::to_owned);
                let data = field.bytes().await.map_err(|e| {
                    error!("Failed to read file bytes: {}", e);
                    internal_error("Failed to read file bytes")
                })?;
                file = Some(UploadedFile {
                    file_name,
                    content_type,
                    data,
                });
            }
            Some("extractedText") => {
                let text = field.text().await.map_err(|e| {
                    error!("Failed to read extractedText field: {}", e);
                    internal_error("Failed to read multipart data")
                })?;
                extracted_text = Some(text);
            }
            _ => {}
        }
    }

    // Pre-extracted text short-circuits conversion entirely. Real file
    // metadata is threaded through when the client also sent the file.
    if let Some(text) = extracted_text {
        if text.trim().is_empty() {
            return Err(bad_request(NO_TEXT_MESSAGE));
        }
        let capped = cap_extracted_text(&text);
        let words = word_count(&capped);
        let (file_type, file_name, file_size) = match &file {
            Some(f) => (
                f.content_type
                    .clone()
                    .unwrap_or_else(|| PLACEHOLDER_FILE_TYPE.to_string()),
                f.file_name.clone(),
                f.data.len() as u64,
            ),
            None => (
                PLACEHOLDER_FILE_TYPE.to_string(),
                PLACEHOLDER_FILE_NAME.to_string(),
                0,
            ),
        };
        return Ok(Json(
            ExtractedText {
                text: capped,
                word_count: words,
                file_type,
                file_name,
                file_size,
            }
            .into(),
        ));
    }

    let file = file.ok_or_else(|| bad_request("Multipart form must include a file"))?;

    if file.data.len() as u64 > MAX_UPLOAD_BYTES {
        return Err(bad_request("File too large. Maximum size is 10MB."));
    }

    let extension = file.file_name.rsplit_once('.').map(|(_, ext)| ext);
    let kind = DocumentKind::from_mime_and_extension(file.content_type.as_deref(), extension)
        .ok_or_else(|| {
            bad_request("Unsupported file type. Only .txt and .docx files are accepted.")
        })?;

    let text = app_state
        .extractor
        .extract_text(&file.data, kind)
        .await
        .map_err(|e| match e {
            PortError::InvalidInput(message) => bad_request(message),
            other => {
                error!("Document conversion failed: {}", other);
                internal_error("Failed to extract text from the document.")
            }
        })?;

    let capped = cap_extracted_text(&text);
    let words = word_count(&capped);
    Ok(Json(
        ExtractedText {
            text: capped,
            word_count: words,
            file_type: kind.as_mime().to_string(),
            file_name: file.file_name,
            file_size: file.data.len() as u64,
        }
        .into(),
    ))
}

//=========================================================================================
// Summarize
//=========================================================================================

/// Generate a summary and highlights for a block of extracted text.
///
/// The summary and highlight calls run concurrently; a highlight failure
/// degrades to empty sets without failing the request. On success a
/// history record is persisted best-effort in the background.
#[utoipa::path(
    post,
    path = "/summarize",
    request_body = SummarizeRequest,
    responses(
        (status = 200, description = "Summary generated", body = SummarizeResponse),
        (status = 400, description = "No text provided", body = ErrorResponse),
        (status = 500, description = "Summary generation failed", body = ErrorResponse)
    )
)]
pub async fn summarize_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Json(req): Json<SummarizeRequest>,
) -> Result<Json<SummarizeResponse>, HandlerError> {
    if req.text.trim().is_empty() {
        return Err(bad_request("No text provided for summarization."));
    }

    let options = SummaryOptions {
        summary_type: req.summary_type,
        custom_length: req.custom_length,
        tone: req.tone,
    };

    // The two model calls are independent given the same input, so they
    // are dispatched concurrently and joined.
    let (summary_result, highlights_result) = tokio::join!(
        app_state.summarizer.summarize(&req.text, &options),
        app_state.highlighter.extract_highlights(&req.text),
    );

    let summary = summary_result.map_err(|e| {
        error!("Summary generation failed: {}", e);
        internal_error("Failed to generate summary.")
    })?;

    let highlights = highlights_result.unwrap_or_else(|e| {
        error!("Highlight extraction failed, continuing with empty highlights: {}", e);
        Highlights::default()
    });

    let original_word_count = word_count(&req.text);
    let summary_word_count = word_count(&summary);
    let ratio = compression_ratio(original_word_count, summary_word_count);

    // Best-effort persistence: fire-and-forget, failure is logged and
    // never surfaced to the caller.
    let record = NewHistoryRecord {
        user_id,
        file_name: req
            .file_name
            .unwrap_or_else(|| PLACEHOLDER_FILE_NAME.to_string()),
        file_size: req.file_size.unwrap_or(0),
        file_type: req
            .file_type
            .unwrap_or_else(|| PLACEHOLDER_FILE_TYPE.to_string()),
        original_text: history_excerpt(&req.text),
        result: SummaryResult {
            summary: summary.clone(),
            highlights: highlights.clone(),
            original_word_count,
            summary_word_count,
            compression_ratio: ratio,
        },
        summary_type: req.summary_type,
        tone: req.tone,
        custom_length: req.custom_length,
    };
    let db = Arc::clone(&app_state.db);
    tokio::spawn(async move {
        if let Err(e) = db.save_history_record(record).await {
            error!("Failed to persist summary history: {}", e);
        }
    });

    Ok(Json(SummarizeResponse {
        summary,
        highlights: highlights.into(),
        original_word_count,
        summary_word_count,
        compression_ratio: ratio,
    }))
}

//=========================================================================================
// History
//=========================================================================================

/// List the caller's summarization history, newest first.
///
/// The optional `q` parameter filters by case-insensitive substring over
/// file name and summary text, applied in memory after the user-scoped
/// fetch.
#[utoipa::path(
    get,
    path = "/history",
    params(HistoryQuery),
    responses(
        (status = 200, description = "History records", body = [HistoryRecordResponse]),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    )
)]
pub async fn list_history_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<HistoryRecordResponse>>, HandlerError> {
    let mut records = app_state
        .db
        .get_history_for_user(user_id)
        .await
        .map_err(port_error_response)?;

    if let Some(q) = query.q.as_deref() {
        records.retain(|r| matches_history_query(&r.file_name, &r.summary, q));
    }

    Ok(Json(records.into_iter().map(Into::into).collect()))
}

/// Fetch a single history record owned by the caller.
#[utoipa::path(
    get,
    path = "/history/{id}",
    params(("id" = Uuid, Path, description = "The history record id")),
    responses(
        (status = 200, description = "The record", body = HistoryRecordResponse),
        (status = 404, description = "No such record for this user", body = ErrorResponse)
    )
)]
pub async fn get_history_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(id): Path<Uuid>,
) -> Result<Json<HistoryRecordResponse>, HandlerError> {
    let record = app_state
        .db
        .get_history_record(user_id, id)
        .await
        .map_err(port_error_response)?;
    Ok(Json(record.into()))
}

/// Delete a single history record owned by the caller.
#[utoipa::path(
    delete,
    path = "/history/{id}",
    params(("id" = Uuid, Path, description = "The history record id")),
    responses(
        (status = 204, description = "Record deleted"),
        (status = 404, description = "No such record for this user", body = ErrorResponse)
    )
)]
pub async fn delete_history_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HandlerError> {
    app_state
        .db
        .delete_history_record(user_id, id)
        .await
        .map_err(port_error_response)?;
    Ok(StatusCode::NO_CONTENT)
}
