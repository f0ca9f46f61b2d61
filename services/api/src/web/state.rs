//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use std::sync::Arc;
use summarizer_core::ports::{
    DatabaseService, HighlightExtractionService, SummarizationService, TextExtractionService,
};

/// The shared application state, created once at startup and passed to all
/// handlers. Handlers never reach around it to global state; the current
/// user id travels explicitly through request extensions.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn DatabaseService>,
    pub config: Arc<Config>,
    pub extractor: Arc<dyn TextExtractionService>,
    pub summarizer: Arc<dyn SummarizationService>,
    pub highlighter: Arc<dyn HighlightExtractionService>,
}
