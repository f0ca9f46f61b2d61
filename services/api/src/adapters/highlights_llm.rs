//! services/api/src/adapters/highlights_llm.rs
//!
//! This module contains the adapter for the highlight-extracting LLM.
//! It implements the `HighlightExtractionService` port from the `core`
//! crate.

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    error::OpenAIError,
    Client,
};
use async_trait::async_trait;
use regex::Regex;
use summarizer_core::{
    domain::Highlights,
    ports::{HighlightExtractionService, PortError, PortResult},
};
use tracing::warn;

use crate::adapters::retry::{retry_with_backoff, RetryPolicy};

const SYSTEM_INSTRUCTIONS: &str = "You are a text analysis assistant. You extract structured \
highlights from documents and respond with JSON only.";

const USER_INPUT_TEMPLATE: &str = r#"Analyze the following text and extract:
1. The most important keywords and key phrases
2. Names of people, organizations, and places
3. Dates and time references

Respond with a JSON object of exactly this shape, and nothing else:
{"keywords": ["..."], "names": ["..."], "dates": ["..."]}

TEXT:
{text}"#;

/// Locates the first brace-delimited substring of `response` and parses it
/// as a [`Highlights`] object. Any failure - no braces, invalid JSON,
/// wrongly-typed fields - degrades to empty sets. Best-effort, no retry.
pub fn parse_highlights_response(response: &str) -> Highlights {
    let json_object = Regex::new(r"(?s)\{.*\}")
        .ok()
        .and_then(|re| re.find(response))
        .map(|m| m.as_str());

    let Some(json_object) = json_object else {
        warn!("Highlight response contained no JSON object, defaulting to empty highlights");
        return Highlights::default();
    };

    match serde_json::from_str::<Highlights>(json_object) {
        Ok(highlights) => highlights,
        Err(e) => {
            warn!("Failed to parse highlight JSON, defaulting to empty highlights: {e}");
            Highlights::default()
        }
    }
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `HighlightExtractionService` using an
/// OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiHighlightsAdapter {
    client: Client<OpenAIConfig>,
    model: String,
    retry: RetryPolicy,
}

impl OpenAiHighlightsAdapter {
    /// Creates a new `OpenAiHighlightsAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String, retry: RetryPolicy) -> Self {
        Self {
            client,
            model,
            retry,
        }
    }
}

//=========================================================================================
// `HighlightExtractionService` Trait Implementation
//=========================================================================================

#[async_trait]
impl HighlightExtractionService for OpenAiHighlightsAdapter {
    /// Extracts keywords, names, and dates from `text`. Malformed model
    /// output degrades to empty sets; only transport failures after the
    /// retry budget surface as `Err`.
    async fn extract_highlights(&self, text: &str) -> PortResult<Highlights> {
        let messages = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(SYSTEM_INSTRUCTIONS)
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(USER_INPUT_TEMPLATE.replace("{text}", text))
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .n(1)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let response = retry_with_backoff(self.retry, || {
            let request = request.clone();
            async move {
                self.client
                    .chat()
                    .create(request)
                    .await
                    .map_err(|e: OpenAIError| PortError::Unexpected(e.to_string()))
            }
        })
        .await?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();

        Ok(parse_highlights_response(&content))
    }
}
