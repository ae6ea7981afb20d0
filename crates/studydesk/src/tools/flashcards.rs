use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::input::SourceInput;
use super::{gateway_error, ProviderHandle};
use crate::encoder::Attachment;
use crate::errors::{ToolError, ToolResult};
use crate::models::message::Message;
use crate::prompt_template::{render_prompt, FLASHCARDS};
use crate::providers::base::{CompletionOptions, ModelTier, Provider};
use crate::review::ReviewTopicWriter;
use crate::state::SubmissionState;

pub const EMPTY_INPUT_ERROR: &str =
    "Please provide some text or a file to generate flashcards from.";
pub const FLASHCARD_ERROR: &str =
    "Failed to generate flashcards. The content might be too short or complex. Please try again.";
pub const INIT_ERROR: &str =
    "Failed to initialize the flashcard generator. Please check your API key and refresh.";

/// How many cards we ask for. The provider may return fewer.
pub const MINIMUM_CARDS: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flashcard {
    pub question: String,
    pub answer: String,
}

/// JSON schema for the provider: an array of question/answer objects
pub fn flashcard_schema() -> Value {
    json!({
        "type": "array",
        "items": {
            "type": "object",
            "properties": {
                "question": { "type": "string" },
                "answer": { "type": "string" }
            },
            "required": ["question", "answer"]
        }
    })
}

pub struct FlashcardJob {
    provider: Arc<dyn Provider>,
    input: SourceInput,
}

impl FlashcardJob {
    /// Any failure, whether the call itself or an unparseable reply, maps to the same message
    pub async fn run(self) -> ToolResult<Vec<Flashcard>> {
        let fail = |e: &dyn std::fmt::Display| gateway_error("flashcards", FLASHCARD_ERROR, e);

        let instruction = render_prompt(FLASHCARDS, &json!({ "minimum_cards": MINIMUM_CARDS }))
            .map_err(|e| fail(&e))?;
        let content = self
            .input
            .to_content()
            .await
            .map_err(|e| fail(&e))?
            .ok_or_else(|| ToolError::Validation(EMPTY_INPUT_ERROR.to_string()))?;

        let message = Message::user().with_text(instruction).with_content(content);
        let options = CompletionOptions::json(flashcard_schema(), ModelTier::Fast);
        let (reply, _usage) = self
            .provider
            .complete("", &[message], &options)
            .await
            .map_err(|e| fail(&e))?;

        serde_json::from_str(reply.text().trim()).map_err(|e| fail(&e))
    }
}

#[derive(Debug)]
pub struct FlashcardGenerator {
    provider: ProviderHandle,
    review: ReviewTopicWriter,
    input: SourceInput,
    state: SubmissionState<Vec<Flashcard>>,
    cards: Vec<Flashcard>,
    selection: Vec<usize>,
    flipped: Option<usize>,
}

impl FlashcardGenerator {
    pub fn new(provider: ProviderHandle, review: ReviewTopicWriter) -> Self {
        Self {
            provider,
            review,
            input: SourceInput::default(),
            state: SubmissionState::default(),
            cards: Vec::new(),
            selection: Vec::new(),
            flipped: None,
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

    pub fn state(&self) -> &SubmissionState<Vec<Flashcard>> {
        &self.state
    }

    /// Cards from the latest generation. Emptied when a request goes out, and stays
    /// empty if that request fails.
    pub fn cards(&self) -> &[Flashcard] {
        &self.cards
    }

    /// Selected card indices in the order they were picked
    pub fn selection(&self) -> &[usize] {
        &self.selection
    }

    pub fn is_selected(&self, index: usize) -> bool {
        self.selection.contains(&index)
    }

    pub fn flipped(&self) -> Option<usize> {
        self.flipped
    }

    pub fn can_submit(&self) -> bool {
        !self.state.is_pending() && !self.input.is_empty()
    }

    /// Validates, then discards the previous cards and selection before anything is sent
    pub fn begin(&mut self) -> ToolResult<FlashcardJob> {
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

        self.cards.clear();
        self.selection.clear();
        self.flipped = None;
        Ok(FlashcardJob {
            provider,
            input: self.input.clone(),
        })
    }

    pub fn finish(&mut self, outcome: ToolResult<Vec<Flashcard>>) {
        if let Ok(cards) = &outcome {
            tracing::debug!(cards = cards.len(), "generated flashcards");
            self.cards = cards.clone();
        }
        self.state.settle(outcome);
    }

    pub async fn submit(&mut self) -> ToolResult<Vec<Flashcard>> {
        let job = self.begin()?;
        let outcome = job.run().await;
        self.finish(outcome.clone());
        outcome
    }

    /// Show the answer side of a card, or turn it back over
    pub fn flip(&mut self, index: usize) {
        if index >= self.cards().len() {
            return;
        }
        self.flipped = if self.flipped == Some(index) {
            None
        } else {
            Some(index)
        };
    }

    pub fn toggle_selection(&mut self, index: usize) {
        if index >= self.cards().len() {
            return;
        }
        if let Some(position) = self.selection.iter().position(|&i| i == index) {
            self.selection.remove(position);
        } else {
            self.selection.push(index);
        }
    }

    /// Send the selected questions to the review board and clear the selection
    pub fn add_selected_to_review(&mut self) -> Vec<String> {
        let cards = self.cards();
        let topics: Vec<String> = self
            .selection
            .iter()
            .filter_map(|&index| cards.get(index))
            .map(|card| card.question.clone())
            .collect();

        self.review.add(topics.iter().cloned());
        self.selection.clear();
        topics
    }
}
