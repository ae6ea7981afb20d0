//! The four study tools. Each module pairs a request job, which performs the
//! provider call, with a controller that stages input and tracks the request state.
use std::fmt;
use std::sync::Arc;

use crate::errors::{ToolError, ToolResult};
use crate::providers::base::Provider;

pub mod flashcards;
pub mod input;
pub mod planner;
pub mod summarizer;
pub mod tutor;

/// A provider, or the reason one could not be set up
#[derive(Clone)]
pub struct ProviderHandle {
    inner: Result<Arc<dyn Provider>, String>,
}

impl ProviderHandle {
    pub fn ready(provider: Arc<dyn Provider>) -> Self {
        Self {
            inner: Ok(provider),
        }
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            inner: Err(reason.into()),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.inner.is_ok()
    }

    /// The provider, or an initialization error carrying the tool's own message
    pub(crate) fn get(&self, tool_message: &str) -> ToolResult<Arc<dyn Provider>> {
        match &self.inner {
            Ok(provider) => Ok(Arc::clone(provider)),
            Err(reason) => {
                tracing::error!(reason = reason.as_str(), "provider unavailable");
                Err(ToolError::Initialization(tool_message.to_string()))
            }
        }
    }
}

impl<E: fmt::Display> From<Result<Arc<dyn Provider>, E>> for ProviderHandle {
    fn from(result: Result<Arc<dyn Provider>, E>) -> Self {
        match result {
            Ok(provider) => Self::ready(provider),
            Err(e) => Self::unavailable(e.to_string()),
        }
    }
}

impl fmt::Debug for ProviderHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner {
            Ok(_) => f.write_str("ProviderHandle(ready)"),
            Err(reason) => write!(f, "ProviderHandle(unavailable: {})", reason),
        }
    }
}

/// Log the real cause and replace it with the tool's generic retry message
pub(crate) fn gateway_error(tool: &str, message: &str, cause: impl fmt::Display) -> ToolError {
    tracing::error!(tool, error = %cause, "request failed");
    ToolError::Gateway(message.to_string())
}
