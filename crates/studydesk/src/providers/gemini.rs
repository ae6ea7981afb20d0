use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use reqwest::StatusCode;
use serde_json::{json, Map, Value};
use std::time::Duration;

use super::base::{CompletionOptions, Provider, ResponseFormat, Usage};
use super::configs::GeminiProviderConfig;
use super::utils::{gemini_response_to_message, messages_to_gemini_spec, schema_to_gemini_spec};
use crate::models::message::Message;

pub struct GeminiProvider {
    client: Client,
    config: GeminiProviderConfig,
}

impl GeminiProvider {
    pub fn new(config: GeminiProviderConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(600)) // 10 minutes timeout
            .build()?;

        Ok(Self { client, config })
    }

    fn get_usage(data: &Value) -> Usage {
        let Some(usage) = data.get("usageMetadata") else {
            return Usage::default();
        };

        let count = |field: &str| usage.get(field).and_then(|v| v.as_i64()).map(|v| v as i32);
        let input_tokens = count("promptTokenCount");
        let output_tokens = count("candidatesTokenCount");
        let total_tokens = count("totalTokenCount").or_else(|| match (input_tokens, output_tokens) {
            (Some(input), Some(output)) => Some(input + output),
            _ => None,
        });

        Usage::new(input_tokens, output_tokens, total_tokens)
    }

    fn generation_config(&self, options: &CompletionOptions) -> Map<String, Value> {
        let mut config = Map::new();
        if let Some(temp) = self.config.temperature {
            config.insert("temperature".to_string(), json!(temp));
        }
        if let Some(tokens) = self.config.max_tokens {
            config.insert("maxOutputTokens".to_string(), json!(tokens));
        }
        if let ResponseFormat::Json(schema) = &options.response_format {
            config.insert("responseMimeType".to_string(), json!("application/json"));
            config.insert("responseSchema".to_string(), schema_to_gemini_spec(schema));
        }
        config
    }

    async fn post(&self, model: &str, payload: Value) -> Result<Value> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.host.trim_end_matches('/'),
            model
        );

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.config.api_key)
            .json(&payload)
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => Ok(response.json().await?),
            status if status == StatusCode::TOO_MANY_REQUESTS || status.as_u16() >= 500 => {
                Err(anyhow!("Server error: {}", status))
            }
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(anyhow!("Request failed: {}\nResponse: {}", status, body))
            }
        }
    }
}

#[async_trait]
impl Provider for GeminiProvider {
    async fn complete(
        &self,
        system: &str,
        messages: &[Message],
        options: &CompletionOptions,
    ) -> Result<(Message, Usage)> {
        let model = self.config.model_for(options.tier);

        let mut payload = Map::new();
        payload.insert(
            "contents".to_string(),
            json!(messages_to_gemini_spec(messages)),
        );
        if !system.is_empty() {
            payload.insert(
                "system_instruction".to_string(),
                json!({ "parts": [{ "text": system }] }),
            );
        }
        let generation_config = self.generation_config(options);
        if !generation_config.is_empty() {
            payload.insert(
                "generationConfig".to_string(),
                Value::Object(generation_config),
            );
        }

        tracing::debug!(model, messages = messages.len(), "sending gemini request");
        let response = self.post(model, Value::Object(payload)).await?;

        if let Some(error) = response.get("error") {
            return Err(anyhow!("Gemini API error: {}", error));
        }

        let message = gemini_response_to_message(&response)?;
        let usage = Self::get_usage(&response);
        tracing::debug!(?usage, "gemini request complete");

        Ok((message, usage))
    }
}
