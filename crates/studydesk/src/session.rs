use std::sync::Arc;

use anyhow::Result;

use crate::models::message::Message;
use crate::providers::base::{CompletionOptions, ModelTier, Provider};

/// A standing conversation with a provider.
///
/// The whole accumulated history is replayed with every turn, which gives the
/// provider a stateful view without any server side handle. A turn that fails
/// leaves the history exactly as it was.
#[derive(Clone)]
pub struct ChatSession {
    provider: Arc<dyn Provider>,
    system: String,
    history: Vec<Message>,
    options: CompletionOptions,
}

impl ChatSession {
    pub fn new(provider: Arc<dyn Provider>, system: impl Into<String>) -> Self {
        Self {
            provider,
            system: system.into(),
            history: Vec::new(),
            options: CompletionOptions::text(ModelTier::Reasoning),
        }
    }

    pub fn system(&self) -> &str {
        &self.system
    }

    pub fn history(&self) -> &[Message] {
        &self.history
    }

    pub async fn send(&mut self, text: &str) -> Result<String> {
        let mut messages = self.history.clone();
        messages.push(Message::user().with_text(text));

        let (reply, usage) = self
            .provider
            .complete(&self.system, &messages, &self.options)
            .await?;
        tracing::debug!(turns = messages.len(), ?usage, "chat turn complete");

        let text = reply.text();
        messages.push(reply);
        self.history = messages;
        Ok(text)
    }
}

impl std::fmt::Debug for ChatSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatSession")
            .field("system", &self.system)
            .field("history", &self.history.len())
            .finish()
    }
}
