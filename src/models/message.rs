use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Role/content body of a logged message
///
/// `content` is either a plain string or an array of typed blocks
/// (`{"type":"text","text":...}`, `tool_use`, `thinking`, ...). It is kept as raw
/// JSON so unknown block types never fail deserialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageContent {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub content: Option<Value>,
}

/// One record of a session JSONL file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Message {
    #[serde(rename = "type", default)]
    pub msg_type: Option<String>,
    #[serde(default)]
    pub uuid: Option<String>,
    #[serde(rename = "parentUuid", default)]
    pub parent_uuid: Option<String>,
    #[serde(
        default,
        deserialize_with = "crate::parsers::deserializers::deserialize_timestamp"
    )]
    pub timestamp: Option<String>,
    #[serde(rename = "sessionId", default)]
    pub session_id: Option<String>,
    #[serde(default, deserialize_with = "crate::parsers::deserializers::deserialize_lenient")]
    pub message: Option<MessageContent>,
}

impl Message {
    /// Role of the inner message body, or `""` when absent
    pub fn role(&self) -> &str {
        self.message.as_ref().and_then(|m| m.role.as_deref()).unwrap_or_default()
    }

    /// Whether this record is a user or assistant turn
    pub fn is_conversation(&self) -> bool {
        matches!(self.msg_type.as_deref(), Some("user") | Some("assistant"))
    }
}

/// Plain transcript line (`{"type":"user","timestamp":..,"content":"..."}`)
#[derive(Debug, Clone, Deserialize)]
pub struct TranscriptMessage {
    #[serde(rename = "type", default)]
    pub msg_type: Option<String>,
    #[serde(
        default,
        deserialize_with = "crate::parsers::deserializers::deserialize_timestamp"
    )]
    pub timestamp: Option<String>,
    #[serde(default, deserialize_with = "crate::parsers::deserializers::deserialize_lenient")]
    pub content: Option<String>,
}

impl TranscriptMessage {
    /// Convert a user transcript line into a regular message record
    ///
    /// Returns `None` for non-user lines and for blank content.
    pub fn into_message(self) -> Option<Message> {
        if self.msg_type.as_deref() != Some("user") {
            return None;
        }
        let content = self.content.filter(|c| !c.trim().is_empty())?;

        Some(Message {
            msg_type: self.msg_type,
            timestamp: self.timestamp,
            message: Some(MessageContent {
                role: Some("user".to_string()),
                content: Some(Value::String(content)),
            }),
            ..Message::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_deserializes_camel_case_fields() {
        let json = r#"{"type":"assistant","uuid":"u-2","parentUuid":"u-1","sessionId":"s-1","timestamp":"2024-01-15T10:30:00Z","message":{"role":"assistant","content":"hi"}}"#;
        let msg: Message = serde_json::from_str(json).unwrap();

        assert_eq!(msg.msg_type.as_deref(), Some("assistant"));
        assert_eq!(msg.parent_uuid.as_deref(), Some("u-1"));
        assert_eq!(msg.session_id.as_deref(), Some("s-1"));
        assert_eq!(msg.timestamp.as_deref(), Some("2024-01-15T10:30:00Z"));
        assert_eq!(msg.role(), "assistant");
        assert!(msg.is_conversation());
    }

    #[test]
    fn test_message_with_malformed_body_degrades_to_none() {
        let json = r#"{"type":"user","message":"not an object"}"#;
        let msg: Message = serde_json::from_str(json).unwrap();

        assert!(msg.message.is_none());
        assert_eq!(msg.role(), "");
    }

    #[test]
    fn test_empty_object_is_a_message() {
        let msg: Message = serde_json::from_str("{}").unwrap();
        assert_eq!(msg, Message::default());
        assert!(!msg.is_conversation());
    }

    #[test]
    fn test_transcript_user_line_converts() {
        let json = r#"{"type":"user","timestamp":"2024-01-15T10:30:00Z","content":"fix the build"}"#;
        let line: TranscriptMessage = serde_json::from_str(json).unwrap();
        let msg = line.into_message().unwrap();

        assert_eq!(msg.role(), "user");
        assert_eq!(msg.timestamp.as_deref(), Some("2024-01-15T10:30:00Z"));
        assert_eq!(
            msg.message.unwrap().content,
            Some(Value::String("fix the build".to_string()))
        );
    }

    #[test]
    fn test_transcript_non_user_or_blank_is_skipped() {
        let assistant: TranscriptMessage =
            serde_json::from_str(r#"{"type":"assistant","content":"hello"}"#).unwrap();
        assert!(assistant.into_message().is_none());

        let blank: TranscriptMessage =
            serde_json::from_str(r#"{"type":"user","content":"   "}"#).unwrap();
        assert!(blank.into_message().is_none());
    }
}
