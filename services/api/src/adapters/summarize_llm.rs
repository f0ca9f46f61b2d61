//! services/api/src/adapters/summarize_llm.rs
//!
//! This module contains the adapter for the summary-generating LLM.
//! It implements the `SummarizationService` port from the `core` crate.

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
use summarizer_core::{
    domain::{SummaryOptions, SummaryType, Tone},
    ports::{PortError, PortResult, SummarizationService},
};

use crate::adapters::retry::{retry_with_backoff, RetryPolicy};

const SYSTEM_INSTRUCTIONS: &str = "You are a document summarization assistant. You produce \
clear, accurate summaries of the text you are given. Respond with ONLY the summary, no \
preamble and no commentary about the task.";

/// Word target used for `custom` summaries when the caller does not
/// supply one.
pub const DEFAULT_CUSTOM_LENGTH: u32 = 200;

/// Bounds applied to a caller-supplied custom word target.
pub const CUSTOM_LENGTH_RANGE: (u32, u32) = (50, 1000);

/// Builds the user prompt for a summarization request. One template per
/// summary type; a non-neutral tone prepends exactly one instruction
/// sentence. The targets stated here are advisory to the model.
pub fn build_summary_prompt(text: &str, options: &SummaryOptions) -> String {
    let tone_instruction = match options.tone {
        Tone::Neutral => "",
        Tone::Professional => "Write in a professional, formal tone. ",
        Tone::Casual => "Write in a casual, conversational tone. ",
        Tone::Academic => "Write in an academic tone with precise terminology. ",
    };

    let request = match options.summary_type {
        SummaryType::Short => {
            "Provide a concise summary of the following text in 1-2 paragraphs:".to_string()
        }
        SummaryType::Bullet => {
            "Summarize the following text as a bullet-point list of its main ideas:".to_string()
        }
        SummaryType::Custom => {
            let (min, max) = CUSTOM_LENGTH_RANGE;
            let target = options
                .custom_length
                .unwrap_or(DEFAULT_CUSTOM_LENGTH)
                .clamp(min, max);
            format!(
                "Summarize the following text in approximately {} words:",
                target
            )
        }
    };

    format!("{}{}\n\n{}", tone_instruction, request, text)
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `SummarizationService` using an
/// OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiSummaryAdapter {
    client: Client<OpenAIConfig>,
    model: String,
    retry: RetryPolicy,
}

impl OpenAiSummaryAdapter {
    /// Creates a new `OpenAiSummaryAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String, retry: RetryPolicy) -> Self {
        Self {
            client,
            model,
            retry,
        }
    }
}

//=========================================================================================
// `SummarizationService` Trait Implementation
//=========================================================================================

#[async_trait]
impl SummarizationService for OpenAiSummaryAdapter {
    /// Generates a summary of `text` according to the user's options. The
    /// model's first text response is taken verbatim; no post-validation
    /// of length or format is performed.
    async fn summarize(&self, text: &str, options: &SummaryOptions) -> PortResult<String> {
        let messages = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(SYSTEM_INSTRUCTIONS)
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(build_summary_prompt(text, options))
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

        // Transient upstream failures are retried with backoff; the last
        // error surfaces to the caller.
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

        if let Some(choice) = response.choices.into_iter().next() {
            if let Some(content) = choice.message.content {
                Ok(content)
            } else {
                Err(PortError::Unexpected(
                    "Summary LLM response contained no text content.".to_string(),
                ))
            }
        } else {
            Err(PortError::Unexpected(
                "Summary LLM returned no choices in its response.".to_string(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(summary_type: SummaryType, custom_length: Option<u32>, tone: Tone) -> SummaryOptions {
        SummaryOptions {
            summary_type,
            custom_length,
            tone,
        }
    }

    #[test]
    fn short_prompt_asks_for_one_to_two_paragraphs() {
        let prompt = build_summary_prompt("body", &options(SummaryType::Short, None, Tone::Neutral));
        assert!(prompt.contains("1-2 paragraphs"));
        assert!(prompt.ends_with("body"));
    }

    #[test]
    fn bullet_prompt_asks_for_a_bullet_list() {
        let prompt =
            build_summary_prompt("body", &options(SummaryType::Bullet, None, Tone::Neutral));
        assert!(prompt.contains("bullet-point list"));
    }

    #[test]
    fn custom_prompt_defaults_to_two_hundred_words() {
        let prompt =
            build_summary_prompt("body", &options(SummaryType::Custom, None, Tone::Neutral));
        assert!(prompt.contains("approximately 200 words"));
    }

    #[test]
    fn custom_prompt_uses_requested_target() {
        let prompt = build_summary_prompt(
            "body",
            &options(SummaryType::Custom, Some(350), Tone::Neutral),
        );
        assert!(prompt.contains("approximately 350 words"));
    }

    #[test]
    fn custom_length_is_clamped_to_bounds() {
        let low = build_summary_prompt(
            "body",
            &options(SummaryType::Custom, Some(10), Tone::Neutral),
        );
        assert!(low.contains("approximately 50 words"));
        let high = build_summary_prompt(
            "body",
            &options(SummaryType::Custom, Some(5000), Tone::Neutral),
        );
        assert!(high.contains("approximately 1000 words"));
    }

    #[test]
    fn neutral_tone_adds_no_instruction() {
        let prompt = build_summary_prompt("body", &options(SummaryType::Short, None, Tone::Neutral));
        assert!(prompt.starts_with("Provide a concise summary"));
        assert!(!prompt.contains("tone"));
    }

    #[test]
    fn non_neutral_tones_prepend_exactly_one_sentence() {
        for (tone, phrase) in [
            (Tone::Professional, "professional, formal tone"),
            (Tone::Casual, "casual, conversational tone"),
            (Tone::Academic, "academic tone"),
        ] {
            let prompt = build_summary_prompt("body", &options(SummaryType::Short, None, tone));
            assert!(prompt.contains(phrase), "missing phrase for {:?}", tone);
            // The instruction is a single sentence ahead of the template.
            let instruction = prompt.split("Provide a concise summary").next().unwrap();
            assert_eq!(instruction.matches(". ").count(), 1);
        }
    }
}
