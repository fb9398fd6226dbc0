//! Files touched by assistant tool calls within one session.
//!
//! Tool calls are `tool_use` blocks inside a record's `message.content` array. Only the
//! file-writing tools are reported: `Edit` and `Write` carry the path in `file_path`,
//! their `mcp_edit` and `mcp_write` counterparts in `filePath`.

use std::cmp::Ordering;
use std::path::Path;

use anyhow::Result;
use chrono::DateTime;
use serde::Deserialize;
use serde_json::Value;

use crate::models::{FileChange, Message, SessionContext};
use crate::parsers::for_each_record;

/// Collect the file changes and time span of a session file
///
/// Changes are listed in file order, one per tool call; repeated edits of the same file
/// are kept. Records that are not messages are skipped.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or exceeds `max_bytes`.
pub fn session_context(path: &Path, max_bytes: u64) -> Result<SessionContext> {
    let mut context = SessionContext::default();

    for_each_record(path, max_bytes, |value| {
        if !value.is_object() {
            return;
        }
        let Ok(message) = Message::deserialize(value) else {
            return;
        };

        if let Some(timestamp) = message.timestamp.as_deref() {
            widen_span(&mut context, timestamp);
        }
        context.file_changes.extend(file_changes(&message));
    })?;

    tracing::debug!(
        path = %path.display(),
        changes = context.file_changes.len(),
        "collected session context"
    );
    Ok(context)
}

/// File changes made by the tool calls of one message, in block order
pub fn file_changes(message: &Message) -> Vec<FileChange> {
    let Some(Value::Array(blocks)) = message.message.as_ref().and_then(|m| m.content.as_ref())
    else {
        return Vec::new();
    };

    blocks
        .iter()
        .filter(|block| block.get("type").and_then(Value::as_str) == Some("tool_use"))
        .filter_map(|block| {
            let tool = block.get("name").and_then(Value::as_str)?;
            let key = match tool {
                "Edit" | "Write" => "file_path",
                "mcp_edit" | "mcp_write" => "filePath",
                _ => return None,
            };
            let file_path = block.get("input")?.get(key)?.as_str()?;

            Some(FileChange {
                file_path: file_path.to_string(),
                action: tool.to_string(),
                timestamp: message.timestamp.clone().unwrap_or_default(),
            })
        })
        .collect()
}

fn widen_span(context: &mut SessionContext, timestamp: &str) {
    if context.started_at.as_deref().is_none_or(|start| compare(timestamp, start).is_lt()) {
        context.started_at = Some(timestamp.to_string());
    }
    if context.ended_at.as_deref().is_none_or(|end| compare(timestamp, end).is_gt()) {
        context.ended_at = Some(timestamp.to_string());
    }
}

/// Order two timestamps by instant, falling back to string order if either is not RFC3339
fn compare(a: &str, b: &str) -> Ordering {
    match (DateTime::parse_from_rfc3339(a), DateTime::parse_from_rfc3339(b)) {
        (Ok(a), Ok(b)) => a.cmp(&b),
        _ => a.cmp(b),
    }
}
