use std::sync::Arc;

use super::input::SourceInput;
use super::{gateway_error, ProviderHandle};
use crate::encoder::Attachment;
use crate::errors::{ToolError, ToolResult};
use crate::models::message::Message;
use crate::prompt_template::{render_prompt, SUMMARIZE};
use crate::providers::base::{CompletionOptions, ModelTier, Provider};
use crate::state::SubmissionState;

pub const EMPTY_INPUT_ERROR: &str = "Please provide text or upload a file to summarize.";
pub const SUMMARY_ERROR: &str = "Failed to generate summary. Please try again.";
pub const INIT_ERROR: &str =
    "Failed to initialize the summarizer. Please check your API key and refresh.";

/// One summary request, detached from the controller so it can run in the background
pub struct SummaryJob {
    provider: Arc<dyn Provider>,
    input: SourceInput,
}

impl SummaryJob {
    pub async fn run(self) -> ToolResult<String> {
        let instruction = render_prompt(SUMMARIZE, &serde_json::json!({}))
            .map_err(|e| gateway_error("summarizer", SUMMARY_ERROR, e))?;
        let content = self
            .input
            .to_content()
            .await
            .map_err(|e| gateway_error("summarizer", SUMMARY_ERROR, e))?
            .ok_or_else(|| ToolError::Validation(EMPTY_INPUT_ERROR.to_string()))?;

        let message = Message::user().with_text(instruction).with_content(content);
        let (reply, _usage) = self
            .provider
            .complete("", &[message], &CompletionOptions::text(ModelTier::Fast))
            .await
            .map_err(|e| gateway_error("summarizer", SUMMARY_ERROR, e))?;

        Ok(reply.text())
    }
}

#[derive(Debug)]
pub struct Summarizer {
    provider: ProviderHandle,
    input: SourceInput,
    state: SubmissionState<String>,
    summary: Option<String>,
}

impl Summarizer {
    pub fn new(provider: ProviderHandle) -> Self {
        Self {
            provider,
            input: SourceInput::default(),
            state: SubmissionState::default(),
            summary: None,
        }
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.input.set_text(text);
    }

    pub fn set_attachment(&mut self, attachment: Attachment) {
        self.input.set_attachment(attachment);
    }

    pub fn input(&self) -> &SourceInput {
        &self.input
    }

    pub fn state(&self) -> &SubmissionState<String> {
        &self.state
    }

    /// The latest successful summary, kept across a later failed attempt
    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    pub fn can_submit(&self) -> bool {
        !self.state.is_pending() && !self.input.is_empty()
    }

    pub fn begin(&mut self) -> ToolResult<SummaryJob> {
        if self.state.is_pending() {
            return Err(ToolError::Busy);
        }
        if self.input.is_empty() {
            return Err(self
                .state
                .fail(ToolError::Validation(EMPTY_INPUT_ERROR.to_string())));
        }
        let provider = self
            .provider
            .get(INIT_ERROR)
            .map_err(|e| self.state.fail(e))?;
        self.state.begin()?;

        Ok(SummaryJob {
            provider,
            input: self.input.clone(),
        })
    }

    pub fn finish(&mut self, outcome: ToolResult<String>) {
        if let Ok(summary) = &outcome {
            self.summary = Some(summary.clone());
        }
        self.state.settle(outcome);
    }

    pub async fn submit(&mut self) -> ToolResult<String> {
        let job = self.begin()?;
        let outcome = job.run().await;
        self.finish(outcome.clone());
        outcome
    }
}
