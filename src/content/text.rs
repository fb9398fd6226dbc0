use serde_json::Value;

use crate::models::Message;

/// Resolve the display text of a message
///
/// String content is returned verbatim. Array content joins the `text` of every
/// `{"type":"text"}` block with `"\n"`, in order; other block kinds (tool calls, tool
/// results, thinking) contribute nothing. Any other shape yields `""`.
pub fn get_message_text(message: &Message) -> String {
    let content = message.message.as_ref().and_then(|body| body.content.as_ref());

    match content {
        Some(Value::String(text)) => text.clone(),
        Some(Value::Array(blocks)) => blocks
            .iter()
            .filter(|block| block.get("type").and_then(Value::as_str) == Some("text"))
            .filter_map(|block| block.get("text").and_then(Value::as_str))
            .collect::<Vec<_>>()
            .join("\n"),
        _ => String::new(),
    }
}

/// Whether the message resolves to non-blank text
pub fn has_text_content(message: &Message) -> bool {
    !get_message_text(message).trim().is_empty()
}
