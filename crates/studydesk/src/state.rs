use crate::errors::{ToolError, ToolResult};

/// Where a tool is in its request lifecycle. Exactly one applies at a time.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionState<T> {
    Idle,
    Pending,
    Succeeded(T),
    Failed(String),
}

impl<T> Default for SubmissionState<T> {
    fn default() -> Self {
        SubmissionState::Idle
    }
}

impl<T> SubmissionState<T> {
    pub fn is_pending(&self) -> bool {
        matches!(self, SubmissionState::Pending)
    }

    pub fn result(&self) -> Option<&T> {
        match self {
            SubmissionState::Succeeded(result) => Some(result),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            SubmissionState::Failed(message) => Some(message),
            _ => None,
        }
    }

    /// Move to Pending, refusing while a request is already out
    pub fn begin(&mut self) -> ToolResult<()> {
        if self.is_pending() {
            return Err(ToolError::Busy);
        }
        *self = SubmissionState::Pending;
        Ok(())
    }

    /// Record a failure and hand the error back for propagation
    pub fn fail(&mut self, error: ToolError) -> ToolError {
        *self = SubmissionState::Failed(error.to_string());
        error
    }

    pub fn settle(&mut self, outcome: ToolResult<T>) {
        *self = match outcome {
            Ok(result) => SubmissionState::Succeeded(result),
            Err(error) => SubmissionState::Failed(error.to_string()),
        };
    }
}
