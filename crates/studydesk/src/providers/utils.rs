use anyhow::{anyhow, Result};
use serde_json::{json, Map, Value};

use crate::models::content::{InlineContent, MessageContent};
use crate::models::message::Message;
use crate::models::role::Role;

/// Field used to wrap a non-object schema for providers that require an object root
pub const WRAPPED_SCHEMA_FIELD: &str = "items";

/// Convert internal Message format to Gemini's `contents` specification
pub fn messages_to_gemini_spec(messages: &[Message]) -> Vec<Value> {
    messages
        .iter()
        .filter(|message| !message.content.is_empty())
        .map(|message| {
            let role = match message.role {
                Role::User => "user",
                Role::Assistant => "model",
            };
            let parts: Vec<Value> = message
                .content
                .iter()
                .map(|content| match content {
                    MessageContent::Text(text) => json!({ "text": text.text }),
                    MessageContent::Inline(inline) => json!({
                        "inline_data": {
                            "mime_type": inline.mime_type,
                            "data": inline.data,
                        }
                    }),
                })
                .collect();
            json!({ "role": role, "parts": parts })
        })
        .collect()
}

/// Gemini expects OpenAPI style upper case type names and rejects `additionalProperties`
pub fn schema_to_gemini_spec(schema: &Value) -> Value {
    match schema {
        Value::Object(object) => {
            let mut converted = Map::new();
            for (key, value) in object {
                match (key.as_str(), value) {
                    ("additionalProperties", _) => continue,
                    ("type", Value::String(name)) => {
                        converted.insert(key.clone(), json!(name.to_uppercase()));
                    }
                    _ => {
                        converted.insert(key.clone(), schema_to_gemini_spec(value));
                    }
                }
            }
            Value::Object(converted)
        }
        Value::Array(items) => Value::Array(items.iter().map(schema_to_gemini_spec).collect()),
        other => other.clone(),
    }
}

/// Convert Gemini's generateContent response to internal Message format
pub fn gemini_response_to_message(response: &Value) -> Result<Message> {
    if let Some(reason) = response
        .get("promptFeedback")
        .and_then(|feedback| feedback.get("blockReason"))
        .and_then(Value::as_str)
    {
        return Err(anyhow!("Prompt was blocked by the provider: {}", reason));
    }

    let candidate = response
        .get("candidates")
        .and_then(|candidates| candidates.get(0))
        .ok_or_else(|| anyhow!("No candidates in response"))?;

    let parts = candidate["content"]["parts"]
        .as_array()
        .ok_or_else(|| {
            let reason = candidate["finishReason"].as_str().unwrap_or("unknown");
            anyhow!("Candidate has no content, finish reason: {}", reason)
        })?;

    let text: String = parts
        .iter()
        .filter(|part| !part["thought"].as_bool().unwrap_or(false))
        .filter_map(|part| part["text"].as_str())
        .collect();

    Ok(Message::assistant().with_text(text))
}

/// Convert internal Message format to OpenAI's API message specification
pub fn messages_to_openai_spec(messages: &[Message]) -> Vec<Value> {
    messages
        .iter()
        .filter(|message| !message.content.is_empty())
        .map(|message| {
            let only_text = message
                .content
                .iter()
                .all(|content| matches!(content, MessageContent::Text(_)));

            // Plain text turns keep the simple string form, mixed turns use content parts
            let content = if only_text {
                json!(message.text())
            } else {
                Value::Array(
                    message
                        .content
                        .iter()
                        .map(|content| match content {
                            MessageContent::Text(text) => {
                                json!({ "type": "text", "text": text.text })
                            }
                            MessageContent::Inline(inline) => convert_inline(inline),
                        })
                        .collect(),
                )
            };

            json!({ "role": message.role, "content": content })
        })
        .collect()
}

/// Images become `image_url` parts, everything else is sent as a `file` part
pub fn convert_inline(inline: &InlineContent) -> Value {
    let data_url = format!("data:{};base64,{}", inline.mime_type, inline.data);
    if inline.is_image() {
        json!({
            "type": "image_url",
            "image_url": { "url": data_url }
        })
    } else {
        json!({
            "type": "file",
            "file": {
                "filename": "attachment",
                "file_data": data_url,
            }
        })
    }
}

/// Build an OpenAI `response_format` block for a JSON schema.
///
/// Strict mode requires an object root with closed objects, so arrays and scalars
/// are wrapped under [`WRAPPED_SCHEMA_FIELD`]. The returned flag tells the caller to
/// unwrap the reply.
pub fn schema_to_openai_response_format(schema: &Value) -> (Value, bool) {
    let is_object = schema["type"].as_str() == Some("object");
    let root = if is_object {
        close_objects(schema)
    } else {
        json!({
            "type": "object",
            "properties": { WRAPPED_SCHEMA_FIELD: close_objects(schema) },
            "required": [WRAPPED_SCHEMA_FIELD],
            "additionalProperties": false,
        })
    };

    let format = json!({
        "type": "json_schema",
        "json_schema": {
            "name": "response",
            "schema": root,
            "strict": true,
        }
    });
    (format, !is_object)
}

fn close_objects(schema: &Value) -> Value {
    match schema {
        Value::Object(object) => {
            let mut converted: Map<String, Value> = object
                .iter()
                .map(|(key, value)| (key.clone(), close_objects(value)))
                .collect();
            if object.get("type").and_then(Value::as_str) == Some("object") {
                converted.insert("additionalProperties".to_string(), json!(false));
            }
            Value::Object(converted)
        }
        Value::Array(items) => Value::Array(items.iter().map(close_objects).collect()),
        other => other.clone(),
    }
}

/// Convert OpenAI's API response to internal Message format
pub fn openai_response_to_message(response: &Value, unwrap_schema: bool) -> Result<Message> {
    let original = &response["choices"][0]["message"];
    if original.is_null() {
        return Err(anyhow!("No choices in response"));
    }

    if let Some(refusal) = original["refusal"].as_str() {
        return Err(anyhow!("Model refused the request: {}", refusal));
    }

    let text = original["content"].as_str().unwrap_or_default();
    if !unwrap_schema {
        return Ok(Message::assistant().with_text(text));
    }

    let wrapped: Value = serde_json::from_str(text)?;
    let inner = wrapped
        .get(WRAPPED_SCHEMA_FIELD)
        .ok_or_else(|| anyhow!("Structured response is missing `{}`", WRAPPED_SCHEMA_FIELD))?;
    Ok(Message::assistant().with_text(inner.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flashcard_schema() -> Value {
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

    #[test]
    fn test_messages_to_gemini_spec() {
        let messages = vec![
            Message::user()
                .with_text("Summarize this:")
                .with_inline("JVBERi0=", "application/pdf"),
            Message::assistant().with_text("- point one"),
            Message::user(),
        ];

        let spec = messages_to_gemini_spec(&messages);
        assert_eq!(spec.len(), 2);
        assert_eq!(spec[0]["role"], "user");
        assert_eq!(spec[0]["parts"][0]["text"], "Summarize this:");
        assert_eq!(spec[0]["parts"][1]["inline_data"]["mime_type"], "application/pdf");
        assert_eq!(spec[0]["parts"][1]["inline_data"]["data"], "JVBERi0=");
        assert_eq!(spec[1]["role"], "model");
    }

    #[test]
    fn test_schema_to_gemini_spec() {
        let mut schema = flashcard_schema();
        schema["items"]["additionalProperties"] = json!(false);

        let converted = schema_to_gemini_spec(&schema);
        assert_eq!(converted["type"], "ARRAY");
        assert_eq!(converted["items"]["type"], "OBJECT");
        assert_eq!(converted["items"]["properties"]["question"]["type"], "STRING");
        assert_eq!(converted["items"]["required"], json!(["question", "answer"]));
        assert!(converted["items"].get("additionalProperties").is_none());
    }

    #[test]
    fn test_gemini_response_to_message() -> Result<()> {
        let response = json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [
                        { "text": "thinking it over", "thought": true },
                        { "text": "Hello " },
                        { "text": "there" }
                    ]
                },
                "finishReason": "STOP"
            }]
        });

        let message = gemini_response_to_message(&response)?;
        assert_eq!(message.role, Role::Assistant);
        assert_eq!(message.text(), "Hello there");
        Ok(())
    }

    #[test]
    fn test_gemini_response_without_content_is_an_error() {
        let response = json!({ "candidates": [{ "finishReason": "SAFETY" }] });
        let err = gemini_response_to_message(&response).unwrap_err();
        assert!(err.to_string().contains("SAFETY"));

        let blocked = json!({ "promptFeedback": { "blockReason": "OTHER" } });
        assert!(gemini_response_to_message(&blocked).is_err());

        assert!(gemini_response_to_message(&json!({})).is_err());
    }

    #[test]
    fn test_messages_to_openai_spec() {
        let messages = vec![
            Message::user().with_text("What is a derivative?"),
            Message::user()
                .with_text("Explain this diagram")
                .with_inline("iVBORw0=", "image/png")
                .with_inline("JVBERi0=", "application/pdf"),
        ];

        let spec = messages_to_openai_spec(&messages);
        assert_eq!(spec[0], json!({"role": "user", "content": "What is a derivative?"}));

        let parts = spec[1]["content"].as_array().unwrap();
        assert_eq!(parts[0]["type"], "text");
        assert_eq!(parts[1]["image_url"]["url"], "data:image/png;base64,iVBORw0=");
        assert_eq!(parts[2]["type"], "file");
        assert_eq!(parts[2]["file"]["file_data"], "data:application/pdf;base64,JVBERi0=");
    }

    #[test]
    fn test_schema_to_openai_response_format_wraps_arrays() {
        let (format, wrapped) = schema_to_openai_response_format(&flashcard_schema());
        assert!(wrapped);

        let root = &format["json_schema"]["schema"];
        assert_eq!(root["type"], "object");
        assert_eq!(root["required"], json!(["items"]));
        assert_eq!(root["additionalProperties"], json!(false));
        assert_eq!(root["properties"]["items"]["type"], "array");
        assert_eq!(
            root["properties"]["items"]["items"]["additionalProperties"],
            json!(false)
        );
    }

    #[test]
    fn test_schema_to_openai_response_format_keeps_objects() {
        let schema = json!({"type": "object", "properties": {"a": {"type": "string"}}});
        let (format, wrapped) = schema_to_openai_response_format(&schema);
        assert!(!wrapped);
        assert_eq!(format["json_schema"]["schema"]["properties"]["a"]["type"], "string");
    }

    #[test]
    fn test_openai_response_to_message_unwraps_schema() -> Result<()> {
        let response = json!({
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": "{\"items\":[{\"question\":\"Q1\",\"answer\":\"A1\"}]}"
                }
            }]
        });

        let message = openai_response_to_message(&response, true)?;
        let cards: Value = serde_json::from_str(&message.text())?;
        assert_eq!(cards, json!([{"question": "Q1", "answer": "A1"}]));

        let plain = openai_response_to_message(&response, false)?;
        assert!(plain.text().starts_with("{\"items\""));
        Ok(())
    }

    #[test]
    fn test_openai_response_errors() {
        assert!(openai_response_to_message(&json!({"choices": []}), false).is_err());

        let refusal = json!({
            "choices": [{ "message": { "role": "assistant", "content": null, "refusal": "no" } }]
        });
        assert!(openai_response_to_message(&refusal, false).is_err());

        let not_json = json!({
            "choices": [{ "message": { "role": "assistant", "content": "sorry" } }]
        });
        assert!(openai_response_to_message(&not_json, true).is_err());
    }
}
