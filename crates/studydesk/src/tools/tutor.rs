use serde::{Deserialize, Serialize};

use super::{gateway_error, ProviderHandle};
use crate::errors::{ToolError, ToolResult};
use crate::prompt_template::{render_prompt, TOPIC_QUESTION, TUTOR_SYSTEM};
use crate::review::ReviewTopicReader;
use crate::session::ChatSession;
use crate::state::SubmissionState;

pub const CHAT_ERROR: &str = "Sorry, I encountered an error. Please try again.";
pub const INIT_ERROR: &str =
    "Failed to initialize the chat session. Please check your API key and refresh.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatEntry {
    pub sender: Sender,
    pub text: String,
}

impl ChatEntry {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::User,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::Assistant,
            text: text.into(),
        }
    }
}

/// The question sent when a review topic is picked
pub fn topic_question(topic: &str) -> ToolResult<String> {
    render_prompt(TOPIC_QUESTION, &serde_json::json!({ "topic": topic }))
        .map_err(|e| gateway_error("tutor", CHAT_ERROR, e))
}

#[derive(Debug)]
enum SessionSlot {
    Inactive,
    Ready(ChatSession),
    /// The session travels with the turn that is in flight
    InFlight,
    Unavailable,
}

/// One message on its way through the session
pub struct TutorTurn {
    session: ChatSession,
    text: String,
}

pub struct TurnOutcome {
    session: ChatSession,
    reply: ToolResult<String>,
}

impl TutorTurn {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub async fn run(mut self) -> TurnOutcome {
        let reply = self
            .session
            .send(&self.text)
            .await
            .map_err(|e| gateway_error("tutor", CHAT_ERROR, e));
        TurnOutcome {
            session: self.session,
            reply,
        }
    }
}

#[derive(Debug)]
pub struct TutorController {
    provider: ProviderHandle,
    review: ReviewTopicReader,
    slot: SessionSlot,
    log: Vec<ChatEntry>,
    input: String,
    state: SubmissionState<String>,
}

impl TutorController {
    pub fn new(provider: ProviderHandle, review: ReviewTopicReader) -> Self {
        Self {
            provider,
            review,
            slot: SessionSlot::Inactive,
            log: Vec::new(),
            input: String::new(),
            state: SubmissionState::default(),
        }
    }

    /// Acquire the chat session. Only the first call does anything.
    pub fn activate(&mut self) {
        if !matches!(self.slot, SessionSlot::Inactive) {
            return;
        }
        match self.provider.get(INIT_ERROR) {
            Ok(provider) => {
                self.slot = SessionSlot::Ready(ChatSession::new(provider, TUTOR_SYSTEM.trim_end()));
            }
            Err(e) => {
                self.slot = SessionSlot::Unavailable;
                self.state.fail(e);
            }
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self.slot, SessionSlot::Ready(_) | SessionSlot::InFlight)
    }

    pub fn init_error(&self) -> Option<&str> {
        match self.slot {
            SessionSlot::Unavailable => Some(INIT_ERROR),
            _ => None,
        }
    }

    pub fn log(&self) -> &[ChatEntry] {
        &self.log
    }

    pub fn state(&self) -> &SubmissionState<String> {
        &self.state
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    pub fn review_topics(&self) -> Vec<String> {
        self.review.topics()
    }

    pub fn can_send(&self) -> bool {
        !self.state.is_pending() && !self.input.trim().is_empty()
    }

    /// Start a turn. Blank text is ignored and yields `None`.
    ///
    /// The user entry is logged and the input cleared before anything is sent.
    pub fn begin_send(&mut self, text: &str) -> ToolResult<Option<TutorTurn>> {
        if text.trim().is_empty() {
            return Ok(None);
        }
        self.ensure_ready()?;

        let session = match std::mem::replace(&mut self.slot, SessionSlot::InFlight) {
            SessionSlot::Ready(session) => session,
            SessionSlot::InFlight => return Err(ToolError::Busy),
            other => {
                self.slot = other;
                return Err(ToolError::Initialization(INIT_ERROR.to_string()));
            }
        };

        self.log.push(ChatEntry::user(text));
        self.input.clear();
        self.state = SubmissionState::Pending;
        Ok(Some(TutorTurn {
            session,
            text: text.to_string(),
        }))
    }

    /// Activate if needed, then refuse unless the session is free to take a turn
    fn ensure_ready(&mut self) -> ToolResult<()> {
        self.activate();
        match self.slot {
            SessionSlot::Ready(_) => Ok(()),
            SessionSlot::InFlight => Err(ToolError::Busy),
            SessionSlot::Inactive | SessionSlot::Unavailable => {
                Err(ToolError::Initialization(INIT_ERROR.to_string()))
            }
        }
    }

    /// Put the session back and log the reply, or the error, as an assistant entry
    pub fn finish(&mut self, outcome: TurnOutcome) {
        self.slot = SessionSlot::Ready(outcome.session);
        match &outcome.reply {
            Ok(text) => self.log.push(ChatEntry::assistant(text.clone())),
            Err(e) => self.log.push(ChatEntry::assistant(e.to_string())),
        }
        self.state.settle(outcome.reply);
    }

    pub async fn send(&mut self, text: &str) -> ToolResult<Option<String>> {
        let Some(turn) = self.begin_send(text)? else {
            return Ok(None);
        };
        let outcome = turn.run().await;
        let reply = outcome.reply.clone();
        self.finish(outcome);
        reply.map(Some)
    }

    /// Send whatever is in the input field
    pub async fn send_input(&mut self) -> ToolResult<Option<String>> {
        let text = self.input.clone();
        self.send(&text).await
    }

    /// Consume a review topic and start asking about it.
    ///
    /// Once the turn can start, the topic leaves the board whatever happens to the turn.
    /// A refused turn leaves the board alone.
    pub fn begin_topic(&mut self, topic: &str) -> ToolResult<Option<TutorTurn>> {
        self.ensure_ready()?;
        let question = topic_question(topic)?;
        self.review.remove(topic);
        self.begin_send(&question)
    }

    pub async fn ask_about_topic(&mut self, topic: &str) -> ToolResult<Option<String>> {
        let Some(turn) = self.begin_topic(topic)? else {
            return Ok(None);
        };
        let outcome = turn.run().await;
        let reply = outcome.reply.clone();
        self.finish(outcome);
        reply.map(Some)
    }

    /// Forget the conversation and start a fresh session
    pub fn reset(&mut self) -> ToolResult<()> {
        if matches!(self.slot, SessionSlot::InFlight) {
            return Err(ToolError::Busy);
        }
        self.log.clear();
        self.input.clear();
        self.state = SubmissionState::Idle;
        self.slot = SessionSlot::Inactive;
        self.activate();
        Ok(())
    }
}
