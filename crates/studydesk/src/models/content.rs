use serde::{Deserialize, Serialize};

use crate::encoder::EncodedAttachment;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextContent {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Binary data carried inline as base64, such as an uploaded image or pdf
pub struct InlineContent {
    pub data: String,
    pub mime_type: String,
}

impl InlineContent {
    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
/// Content passed to or from an LLM
pub enum MessageContent {
    Text(TextContent),
    Inline(InlineContent),
}

impl MessageContent {
    pub fn text<S: Into<String>>(text: S) -> Self {
        MessageContent::Text(TextContent { text: text.into() })
    }

    pub fn inline<S: Into<String>, T: Into<String>>(data: S, mime_type: T) -> Self {
        MessageContent::Inline(InlineContent {
            data: data.into(),
            mime_type: mime_type.into(),
        })
    }

    /// Get the text content if this is a TextContent variant
    pub fn as_text(&self) -> Option<&str> {
        match self {
            MessageContent::Text(text) => Some(&text.text),
            _ => None,
        }
    }

    pub fn as_inline(&self) -> Option<&InlineContent> {
        match self {
            MessageContent::Inline(inline) => Some(inline),
            _ => None,
        }
    }
}

impl From<EncodedAttachment> for MessageContent {
    fn from(encoded: EncodedAttachment) -> Self {
        MessageContent::inline(encoded.encoded_body, encoded.media_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_content_serialization_is_tagged() {
        let content = MessageContent::inline("aGVsbG8=", "application/pdf");
        let value = serde_json::to_value(&content).unwrap();
        assert_eq!(
            value,
            json!({"type": "inline", "data": "aGVsbG8=", "mimeType": "application/pdf"})
        );
    }

    #[test]
    fn test_encoded_attachment_becomes_inline_content() {
        let content = MessageContent::from(EncodedAttachment {
            encoded_body: "AAEC".to_string(),
            media_type: "image/png".to_string(),
        });
        let inline = content.as_inline().unwrap();
        assert!(inline.is_image());
        assert_eq!(inline.data, "AAEC");
        assert_eq!(content.as_text(), None);
    }
}
