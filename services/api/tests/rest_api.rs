//! HTTP-level tests for the REST handlers, using mock port
//! implementations in place of Postgres and the hosted model.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use api_lib::adapters::extract::DocumentExtractAdapter;
use api_lib::config::Config;
use api_lib::web::rest::{
    delete_history_handler, get_history_handler, list_history_handler, summarize_handler,
    upload_handler,
};
use api_lib::web::state::AppState;
use async_trait::async_trait;
use axum::{
    body::Body,
    extract::DefaultBodyLimit,
    http::{header, Request, StatusCode},
    routing::{get, post},
    Extension, Router,
};
use chrono::{DateTime, Utc};
use http_body_util::BodyExt;
use summarizer_core::domain::{
    Highlights, HistoryRecord, NewHistoryRecord, SummaryOptions, User, UserCredentials,
};
use summarizer_core::ports::{
    DatabaseService, HighlightExtractionService, PortError, PortResult, SummarizationService,
};
use tower::ServiceExt;
use tracing::Level;
use uuid::Uuid;

//=========================================================================================
// Mock Ports
//=========================================================================================

#[derive(Default)]
struct MockDb {
    records: Mutex<Vec<HistoryRecord>>,
}

#[async_trait]
impl DatabaseService for MockDb {
    async fn create_user_with_email(
        &self,
        _email: &str,
        _hashed_password: &str,
    ) -> PortResult<User> {
        Err(PortError::Unexpected("not used in these tests".to_string()))
    }

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials> {
        Err(PortError::NotFound(email.to_string()))
    }

    async fn create_auth_session(
        &self,
        _session_id: &str,
        _user_id: Uuid,
        _expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        Ok(())
    }

    async fn validate_auth_session(&self, _session_id: &str) -> PortResult<Uuid> {
        Err(PortError::Unauthorized)
    }

    async fn delete_auth_session(&self, _session_id: &str) -> PortResult<()> {
        Ok(())
    }

    async fn save_history_record(&self, record: NewHistoryRecord) -> PortResult<HistoryRecord> {
        let stored = HistoryRecord {
            id: Uuid::new_v4(),
            user_id: record.user_id,
            file_name: record.file_name,
            file_size: record.file_size,
            file_type: record.file_type,
            original_text: record.original_text,
            summary: record.result.summary,
            summary_type: record.summary_type,
            tone: record.tone,
            custom_length: record.custom_length,
            original_word_count: record.result.original_word_count,
            summary_word_count: record.result.summary_word_count,
            compression_ratio: record.result.compression_ratio,
            highlights: record.result.highlights,
            created_at: Utc::now(),
        };
        self.records.lock().unwrap().push(stored.clone());
        Ok(stored)
    }

    async fn get_history_for_user(&self, user_id: Uuid) -> PortResult<Vec<HistoryRecord>> {
        let mut records: Vec<HistoryRecord> = self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }

    async fn get_history_record(
        &self,
        user_id: Uuid,
        record_id: Uuid,
    ) -> PortResult<HistoryRecord> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == record_id && r.user_id == user_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("Summary {} not found", record_id)))
    }

    async fn delete_history_record(&self, user_id: Uuid, record_id: Uuid) -> PortResult<()> {
        let mut records = self.records.lock().unwrap();
        let before = records.len();
        records.retain(|r| !(r.id == record_id && r.user_id == user_id));
        if records.len() == before {
            return Err(PortError::NotFound(format!(
                "Summary {} not found",
                record_id
            )));
        }
        Ok(())
    }
}

struct MockSummarizer {
    summary: String,
}

#[async_trait]
impl SummarizationService for MockSummarizer {
    async fn summarize(&self, _text: &str, _options: &SummaryOptions) -> PortResult<String> {
        Ok(self.summary.clone())
    }
}

struct MockHighlighter {
    result: Result<Highlights, ()>,
}

#[async_trait]
impl HighlightExtractionService for MockHighlighter {
    async fn extract_highlights(&self, _text: &str) -> PortResult<Highlights> {
        match &self.result {
            Ok(h) => Ok(h.clone()),
            Err(()) => Err(PortError::Unexpected("model unavailable".to_string())),
        }
    }
}

//=========================================================================================
// Test Harness
//=========================================================================================

fn test_config() -> Config {
    Config {
        bind_address: "127.0.0.1:0".parse::<SocketAddr>().unwrap(),
        database_url: "postgres://unused".to_string(),
        log_level: Level::INFO,
        cors_origin: "http://localhost:3000".to_string(),
        openai_api_key: None,
        summary_model: "test-model".to_string(),
        highlight_model: "test-model".to_string(),
        llm_retry_attempts: 1,
        llm_retry_delay_ms: 0,
    }
}

struct Harness {
    app: Router,
    db: Arc<MockDb>,
    user_id: Uuid,
}

fn harness_with(summary: &str, highlighter: MockHighlighter) -> Harness {
    let db = Arc::new(MockDb::default());
    let user_id = Uuid::new_v4();
    let state = Arc::new(AppState {
        db: db.clone(),
        config: Arc::new(test_config()),
        extractor: Arc::new(DocumentExtractAdapter::new()),
        summarizer: Arc::new(MockSummarizer {
            summary: summary.to_string(),
        }),
        highlighter: Arc::new(highlighter),
    });
    // Auth middleware is exercised separately; tests inject the user id
    // the way the middleware would.
    let app = Router::new()
        .route("/upload", post(upload_handler))
        .route("/summarize", post(summarize_handler))
        .route("/history", get(list_history_handler))
        .route(
            "/history/{id}",
            get(get_history_handler).delete(delete_history_handler),
        )
        .layer(Extension(user_id))
        .layer(DefaultBodyLimit::max(12 * 1024 * 1024))
        .with_state(state);
    Harness { app, db, user_id }
}

fn harness() -> Harness {
    harness_with(
        "A concise summary.",
        MockHighlighter {
            result: Ok(Highlights {
                keywords: vec!["alpha".to_string()],
                names: vec!["Ada Lovelace".to_string()],
                dates: vec!["1843".to_string()],
            }),
        },
    )
}

const BOUNDARY: &str = "test-boundary-7MA4YWxkTrZu0gW";

fn multipart_part(name: &str, file: Option<(&str, &str)>, data: &[u8]) -> Vec<u8> {
    let mut part = Vec::new();
    part.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    match file {
        Some((filename, content_type)) => {
            part.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                    name, filename
                )
                .as_bytes(),
            );
            part.extend_from_slice(format!("Content-Type: {}\r\n", content_type).as_bytes());
        }
        None => {
            part.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{}\"\r\n", name).as_bytes(),
            );
        }
    }
    part.extend_from_slice(b"\r\n");
    part.extend_from_slice(data);
    part.extend_from_slice(b"\r\n");
    part
}

fn multipart_body(parts: Vec<Vec<u8>>) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(&part);
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

fn upload_request(body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

fn json_request(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn response_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// The persistence write is fire-and-forget; poll until it lands.
async fn wait_for_records(db: &MockDb, count: usize) {
    for _ in 0..100 {
        if db.records.lock().unwrap().len() >= count {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("history record was never persisted");
}

//=========================================================================================
// Upload
//=========================================================================================

#[tokio::test]
async fn upload_plain_text_returns_it_verbatim() {
    let h = harness();
    let body = multipart_body(vec![multipart_part(
        "file",
        Some(("notes.txt", "text/plain")),
        b"three little words",
    )]);
    let response = h.app.oneshot(upload_request(body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = response_json(response).await;
    assert_eq!(json["text"], "three little words");
    assert_eq!(json["wordCount"], 3);
    assert_eq!(json["fileType"], "text/plain");
    assert_eq!(json["fileName"], "notes.txt");
    assert_eq!(json["fileSize"], 18);
}

#[tokio::test]
async fn upload_whitespace_only_text_is_rejected() {
    let h = harness();
    let body = multipart_body(vec![multipart_part(
        "file",
        Some(("empty.txt", "text/plain")),
        b"   \n\t  ",
    )]);
    let response = h.app.oneshot(upload_request(body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = response_json(response).await;
    assert!(json["error"]
        .as_str()
        .unwrap()
        .contains("No text could be extracted"));
}

#[tokio::test]
async fn upload_unsupported_type_is_rejected() {
    let h = harness();
    let body = multipart_body(vec![multipart_part(
        "file",
        Some(("paper.pdf", "application/pdf")),
        b"%PDF-1.4",
    )]);
    let response = h.app.oneshot(upload_request(body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = response_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("Unsupported file type"));
}

#[tokio::test]
async fn upload_oversized_file_is_rejected() {
    let h = harness();
    let big = vec![b'a'; 10 * 1024 * 1024 + 1];
    let body = multipart_body(vec![multipart_part(
        "file",
        Some(("big.txt", "text/plain")),
        &big,
    )]);
    let response = h.app.oneshot(upload_request(body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = response_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("File too large"));
}

#[tokio::test]
async fn upload_without_file_is_rejected() {
    let h = harness();
    let body = multipart_body(vec![]);
    let response = h.app.oneshot(upload_request(body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn pre_extracted_text_short_circuits_with_placeholder_metadata() {
    let h = harness();
    let body = multipart_body(vec![multipart_part(
        "extractedText",
        None,
        b"already extracted content",
    )]);
    let response = h.app.oneshot(upload_request(body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = response_json(response).await;
    assert_eq!(json["text"], "already extracted content");
    assert_eq!(json["wordCount"], 3);
    assert_eq!(json["fileType"], "text/plain");
    assert_eq!(json["fileName"], "extracted.txt");
    assert_eq!(json["fileSize"], 0);
}

#[tokio::test]
async fn pre_extracted_text_keeps_real_metadata_when_file_is_present() {
    let h = harness();
    let body = multipart_body(vec![
        multipart_part("file", Some(("report.docx", "application/vnd.openxmlformats-officedocument.wordprocessingml.document")), b"binary-blob"),
        multipart_part("extractedText", None, b"client extracted this"),
    ]);
    let response = h.app.oneshot(upload_request(body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = response_json(response).await;
    assert_eq!(json["text"], "client extracted this");
    assert_eq!(json["fileName"], "report.docx");
    assert_eq!(json["fileSize"], 11);
}

#[tokio::test]
async fn whitespace_only_pre_extracted_text_is_rejected() {
    let h = harness();
    let body = multipart_body(vec![multipart_part("extractedText", None, b"  \n ")]);
    let response = h.app.oneshot(upload_request(body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = response_json(response).await;
    assert!(json["error"]
        .as_str()
        .unwrap()
        .contains("No text could be extracted"));
}

//=========================================================================================
// Summarize
//=========================================================================================

fn words(n: usize) -> String {
    vec!["word"; n].join(" ")
}

#[tokio::test]
async fn summarize_reports_counts_and_compression_ratio() {
    // 1000-word input, 100-word summary: ratio must be exactly 90.
    let h = harness_with(
        &words(100),
        MockHighlighter {
            result: Ok(Highlights::default()),
        },
    );
    let request = json_request(
        "/summarize",
        serde_json::json!({
            "text": words(1000),
            "summaryType": "short",
            "tone": "neutral",
        }),
    );
    let response = h.app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = response_json(response).await;
    assert_eq!(json["originalWordCount"], 1000);
    assert_eq!(json["summaryWordCount"], 100);
    assert_eq!(json["compressionRatio"], 90);
}

#[tokio::test]
async fn summarize_returns_highlights_from_the_model() {
    let h = harness();
    let request = json_request(
        "/summarize",
        serde_json::json!({
            "text": "Ada Lovelace wrote the first program in 1843.",
            "summaryType": "bullet",
            "tone": "professional",
        }),
    );
    let response = h.app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = response_json(response).await;
    assert_eq!(json["summary"], "A concise summary.");
    assert_eq!(json["highlights"]["names"][0], "Ada Lovelace");
    assert_eq!(json["highlights"]["dates"][0], "1843");
}

#[tokio::test]
async fn highlight_failure_degrades_to_empty_sets() {
    let h = harness_with("Still a fine summary.", MockHighlighter { result: Err(()) });
    let request = json_request(
        "/summarize",
        serde_json::json!({
            "text": "some document text",
            "summaryType": "short",
            "tone": "neutral",
        }),
    );
    let response = h.app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = response_json(response).await;
    assert_eq!(json["summary"], "Still a fine summary.");
    assert_eq!(json["highlights"]["keywords"].as_array().unwrap().len(), 0);
    assert_eq!(json["highlights"]["names"].as_array().unwrap().len(), 0);
    assert_eq!(json["highlights"]["dates"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn summarize_rejects_empty_text() {
    let h = harness();
    let request = json_request(
        "/summarize",
        serde_json::json!({
            "text": "   ",
            "summaryType": "short",
            "tone": "neutral",
        }),
    );
    let response = h.app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn summarize_persists_a_history_record_with_truncated_source() {
    let h = harness();
    let long_text = words(600); // 2,999 characters
    let request = json_request(
        "/summarize",
        serde_json::json!({
            "text": long_text,
            "summaryType": "custom",
            "customLength": 150,
            "tone": "academic",
            "fileName": "thesis.docx",
            "fileType": "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
            "fileSize": 2048,
        }),
    );
    let response = h.app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    wait_for_records(&h.db, 1).await;
    let records = h.db.records.lock().unwrap();
    let record = &records[0];
    assert_eq!(record.user_id, h.user_id);
    assert_eq!(record.file_name, "thesis.docx");
    assert_eq!(record.file_size, 2048);
    assert_eq!(record.custom_length, Some(150));
    assert_eq!(record.original_text.chars().count(), 1000);
    assert!(long_text.starts_with(&record.original_text));
}

//=========================================================================================
// History
//=========================================================================================

async fn seed_summary(h: &Harness, text: &str, file_name: &str) {
    let existing = h.db.records.lock().unwrap().len();
    let request = json_request(
        "/summarize",
        serde_json::json!({
            "text": text,
            "summaryType": "short",
            "tone": "neutral",
            "fileName": file_name,
        }),
    );
    let response = h.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    wait_for_records(&h.db, existing + 1).await;
}

#[tokio::test]
async fn history_lists_the_callers_records() {
    let h = harness();
    seed_summary(&h, "first document", "first.txt").await;
    seed_summary(&h, "second document", "second.txt").await;

    let request = Request::builder()
        .uri("/history")
        .body(Body::empty())
        .unwrap();
    let response = h.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = response_json(response).await;
    assert_eq!(json.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn history_filter_matches_file_name_case_insensitively() {
    let h = harness();
    seed_summary(&h, "about rust", "Rust-Notes.txt").await;
    seed_summary(&h, "about cooking", "recipes.txt").await;

    let request = Request::builder()
        .uri("/history?q=rust")
        .body(Body::empty())
        .unwrap();
    let response = h.app.clone().oneshot(request).await.unwrap();
    let json = response_json(response).await;
    let items = json.as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["fileName"], "Rust-Notes.txt");
}

#[tokio::test]
async fn deleting_a_record_removes_it_and_later_reads_see_404() {
    let h = harness();
    seed_summary(&h, "to be deleted", "doomed.txt").await;
    let id = h.db.records.lock().unwrap()[0].id;

    let request = Request::builder()
        .method("DELETE")
        .uri(format!("/history/{}", id))
        .body(Body::empty())
        .unwrap();
    let response = h.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(h.db.records.lock().unwrap().is_empty());

    let request = Request::builder()
        .uri(format!("/history/{}", id))
        .body(Body::empty())
        .unwrap();
    let response = h.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deleting_an_unknown_record_is_a_404() {
    let h = harness();
    let request = Request::builder()
        .method("DELETE")
        .uri(format!("/history/{}", Uuid::new_v4()))
        .body(Body::empty())
        .unwrap();
    let response = h.app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
