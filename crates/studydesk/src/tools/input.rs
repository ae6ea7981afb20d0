use crate::encoder::{encode_file, Attachment, EncodeError};
use crate::models::content::MessageContent;

/// Material staged for a summary or flashcards: pasted text or one file, never both
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SourceInput {
    #[default]
    Empty,
    Text(String),
    Attachment(Attachment),
}

impl SourceInput {
    /// Typing replaces any chosen file, and clearing the text leaves nothing staged
    pub fn set_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        *self = if text.is_empty() {
            SourceInput::Empty
        } else {
            SourceInput::Text(text)
        };
    }

    /// Choosing a file discards any typed text
    pub fn set_attachment(&mut self, attachment: Attachment) {
        *self = SourceInput::Attachment(attachment);
    }

    pub fn clear(&mut self) {
        *self = SourceInput::Empty;
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, SourceInput::Empty)
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            SourceInput::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn attachment(&self) -> Option<&Attachment> {
        match self {
            SourceInput::Attachment(attachment) => Some(attachment),
            _ => None,
        }
    }

    /// The message part carrying this input, reading and encoding the file if needed
    pub async fn to_content(&self) -> Result<Option<MessageContent>, EncodeError> {
        match self {
            SourceInput::Empty => Ok(None),
            SourceInput::Text(text) => Ok(Some(MessageContent::text(text.clone()))),
            SourceInput::Attachment(attachment) => {
                Ok(Some(MessageContent::from(encode_file(attachment).await?)))
            }
        }
    }
}
