use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::message::Message;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: Option<i32>,
    pub output_tokens: Option<i32>,
    pub total_tokens: Option<i32>,
}

impl Usage {
    pub fn new(
        input_tokens: Option<i32>,
        output_tokens: Option<i32>,
        total_tokens: Option<i32>,
    ) -> Self {
        Self {
            input_tokens,
            output_tokens,
            total_tokens,
        }
    }
}

/// The shape we ask the provider to answer in
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ResponseFormat {
    #[default]
    Text,
    /// A JSON document conforming to the given JSON schema
    Json(Value),
}

/// Which of the provider's configured models should serve a request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ModelTier {
    /// Quick extraction work such as summaries and flashcards
    #[default]
    Fast,
    /// Longer reasoning such as tutoring and planning
    Reasoning,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompletionOptions {
    pub response_format: ResponseFormat,
    pub tier: ModelTier,
}

impl CompletionOptions {
    pub fn text(tier: ModelTier) -> Self {
        Self {
            response_format: ResponseFormat::Text,
            tier,
        }
    }

    pub fn json(schema: Value, tier: ModelTier) -> Self {
        Self {
            response_format: ResponseFormat::Json(schema),
            tier,
        }
    }
}

/// Base trait for AI providers (Gemini, OpenAI, etc)
#[async_trait]
pub trait Provider: Send + Sync {
    /// Generate the next message. An empty system instruction is not sent.
    async fn complete(
        &self,
        system: &str,
        messages: &[Message],
        options: &CompletionOptions,
    ) -> Result<(Message, Usage)>;
}
