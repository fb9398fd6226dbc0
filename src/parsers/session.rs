use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::DEFAULT_MAX_FILE_BYTES;
use crate::content::has_text_content;
use crate::models::{Message, TranscriptMessage};
use crate::utils::safe_open_file;

const MAX_CONSECUTIVE_ERRORS: usize = 100;

/// Token totals and displayable message count of one session file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SessionUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub message_count: u32,
}

#[derive(Debug, Default, Deserialize)]
struct Usage {
    #[serde(default)]
    input_tokens: Option<u64>,
    #[serde(default)]
    output_tokens: Option<u64>,
}

/// Parse a session JSONL file into its displayable messages
///
/// See [`parse_session_file_with_limit`].
pub fn parse_session_file(path: &Path) -> Result<Vec<Message>> {
    parse_session_file_with_limit(path, DEFAULT_MAX_FILE_BYTES)
}

/// Parse a session JSONL file, rejecting files larger than `max_bytes`
///
/// Keeps user/assistant records that carry text, plus plain transcript lines from the
/// user. Other record types (summaries, system events, file snapshots, tool-only turns)
/// are skipped silently. Lines that are not JSON are logged and skipped; the parse fails
/// if more than 50% of lines fail or 100 consecutive lines fail.
pub fn parse_session_file_with_limit(path: &Path, max_bytes: u64) -> Result<Vec<Message>> {
    let file = safe_open_file(path, max_bytes)?;

    let reader = BufReader::new(file);
    let mut messages = Vec::new();
    let mut skipped_count = 0;
    let mut total_lines = 0;
    let mut consecutive_errors = 0;

    for (line_num, line) in reader.lines().enumerate() {
        let line = line.context("Failed to read line from session file")?;

        if line.trim().is_empty() {
            continue;
        }

        total_lines += 1;

        match serde_json::from_str::<Value>(&line) {
            Ok(value) => {
                consecutive_errors = 0;
                if let Some(message) = displayable_message(&value) {
                    messages.push(message);
                }
            }
            Err(e) => {
                tracing::warn!(
                    line = line_num + 1,
                    path = %path.display(),
                    error = %e,
                    "failed to parse session line"
                );
                skipped_count += 1;
                consecutive_errors += 1;

                if consecutive_errors >= MAX_CONSECUTIVE_ERRORS {
                    bail!(
                        "Too many consecutive parse errors ({}) in {} - file may be corrupted",
                        consecutive_errors,
                        path.display()
                    );
                }
            }
        }
    }

    if total_lines > 0 {
        let failure_rate = (skipped_count as f64) / (total_lines as f64);
        if failure_rate > 0.5 {
            bail!(
                "Too many parse failures in {}: {} of {} lines failed ({:.1}%)",
                path.display(),
                skipped_count,
                total_lines,
                failure_rate * 100.0
            );
        }
    }

    if skipped_count > 0 {
        tracing::debug!(
            path = %path.display(),
            messages = messages.len(),
            skipped = skipped_count,
            "parsed session with skipped lines"
        );
    }

    Ok(messages)
}

/// Sum token usage over every record and count displayable messages
///
/// Lines that are not JSON are ignored here; only opening the file can fail.
pub fn session_token_usage(path: &Path, max_bytes: u64) -> Result<SessionUsage> {
    let mut usage = SessionUsage::default();

    for_each_record(path, max_bytes, |value| {
        if displayable_message(value).is_some() {
            usage.message_count += 1;
        }
        if let Some((input, output)) = record_tokens(value) {
            usage.input_tokens += input;
            usage.output_tokens += output;
        }
    })?;

    Ok(usage)
}

/// Call `visit` with every JSON line of a session file, in file order
///
/// Blank lines and lines that are not JSON are skipped without counting as failures.
/// Only opening or reading the file can fail.
pub fn for_each_record(
    path: &Path,
    max_bytes: u64,
    mut visit: impl FnMut(&Value),
) -> Result<()> {
    let file = safe_open_file(path, max_bytes)?;

    for line in BufReader::new(file).lines() {
        let line = line.context("Failed to read line from session file")?;
        if line.trim().is_empty() {
            continue;
        }
        if let Ok(value) = serde_json::from_str::<Value>(&line) {
            visit(&value);
        }
    }

    Ok(())
}

/// Input and output tokens reported by a record's `message.usage`, if any
pub fn record_tokens(value: &Value) -> Option<(u64, u64)> {
    let usage = Usage::deserialize(value.get("message")?.get("usage")?).ok()?;
    Some((usage.input_tokens.unwrap_or(0), usage.output_tokens.unwrap_or(0)))
}

/// Interpret one parsed line as a displayable message, if it is one
fn displayable_message(value: &Value) -> Option<Message> {
    if !value.is_object() {
        return None;
    }

    if let Ok(message) = Message::deserialize(value)
        && message.is_conversation()
        && has_text_content(&message)
    {
        return Some(message);
    }

    TranscriptMessage::deserialize(value).ok().and_then(TranscriptMessage::into_message)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;
    use crate::content::get_message_text;

    /// Helper to create a temporary test file with given content
    fn create_test_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(content.as_bytes()).expect("Failed to write to temp file");
        file.flush().expect("Failed to flush temp file");
        file
    }

    #[test]
    fn test_parse_valid_session_messages() {
        let content = r#"{"type":"user","message":{"role":"user","content":[{"type":"text","text":"Hello"}]},"timestamp":1762076480016,"sessionId":"s-1","uuid":"u-1"}
{"type":"assistant","message":{"role":"assistant","content":[{"type":"text","text":"Hi there"}]},"timestamp":"2024-01-15T10:30:00Z","sessionId":"s-1","uuid":"u-2"}"#;

        let file = create_test_file(content);
        let messages = parse_session_file(file.path()).unwrap();

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role(), "user");
        assert_eq!(messages[0].timestamp.as_deref(), Some("2025-11-02T09:41:20.016Z"));
        assert_eq!(messages[1].role(), "assistant");
        assert_eq!(get_message_text(&messages[1]), "Hi there");
    }

    #[test]
    fn test_parse_empty_session_file() {
        let file = create_test_file("\n\n");
        assert!(parse_session_file(file.path()).unwrap().is_empty());
    }

    #[test]
    fn test_parse_skips_malformed_lines() {
        let content = r#"{"type":"user","message":{"role":"user","content":"Valid 1"},"uuid":"u-1"}
invalid json line
{"type":"user","message":{"role":"user","content":"Valid 2"},"uuid":"u-2"}"#;

        let file = create_test_file(content);
        let messages = parse_session_file(file.path()).unwrap();
        assert_eq!(messages.len(), 2);
    }

    #[test]
    fn test_parse_fails_with_over_50_percent_failures() {
        let content = r#"invalid line 1
{"type":"user","message":{"role":"user","content":"Valid"},"uuid":"u-1"}
invalid line 2
invalid line 3"#;

        let file = create_test_file(content);
        let err = parse_session_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("Too many parse failures"));
    }

    #[test]
    fn test_parse_fails_with_100_consecutive_errors() {
        let mut content = String::new();
        for i in 0..101 {
            content.push_str(&format!("invalid line {}\n", i));
        }

        let file = create_test_file(&content);
        let err = parse_session_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("Too many consecutive parse errors"));
    }

    #[test]
    fn test_parse_nonexistent_file() {
        let err = parse_session_file(Path::new("/nonexistent/session.jsonl")).unwrap_err();
        assert!(err.to_string().contains("Failed to open"));
    }

    #[test]
    fn test_parse_rejects_oversized_file() {
        let file = create_test_file(r#"{"type":"user","message":{"content":"hello"}}"#);
        let err = parse_session_file_with_limit(file.path(), 8).unwrap_err();
        assert!(err.to_string().contains("File too large"));
    }

    #[test]
    fn test_parse_skips_non_conversation_records() {
        let content = r#"{"type":"user","message":{"role":"user","content":[{"type":"text","text":"Hello"}]},"uuid":"u-1"}
{"type":"file-history-snapshot","messageId":"m-1","snapshot":{"trackedFileBackups":{}},"isSnapshotUpdate":false}
{"type":"assistant","message":{"role":"assistant","content":[{"type":"text","text":"Hi there"}]},"uuid":"u-2"}
{"type":"summary","summary":"Fix the build","leafUuid":"u-2"}
{"type":"system","subtype":"local_command","content":"<command-name>/usage</command-name>","level":"info"}
{"type":"user","message":{"role":"user","content":[{"type":"text","text":"Goodbye"}]},"uuid":"u-3"}"#;

        let file = create_test_file(content);
        let messages = parse_session_file(file.path()).unwrap();

        assert_eq!(messages.len(), 3);
        assert_eq!(get_message_text(&messages[2]), "Goodbye");
    }

    #[test]
    fn test_parse_skips_tool_only_turns() {
        let content = r#"{"type":"assistant","message":{"role":"assistant","content":[{"type":"tool_use","id":"t1","name":"read_file","input":{"path":"/x"}}]}}
{"type":"user","message":{"role":"user","content":[{"type":"tool_result","tool_use_id":"t1","content":"data"}]}}
{"type":"assistant","message":{"role":"assistant","content":[{"type":"thinking","thinking":"..."},{"type":"text","text":"Done"}]}}"#;

        let file = create_test_file(content);
        let messages = parse_session_file(file.path()).unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(get_message_text(&messages[0]), "Done");
    }

    #[test]
    fn test_parse_transcript_lines() {
        let content = r#"{"type":"user","timestamp":"2024-02-01T08:00:00Z","content":"run the tests"}
{"type":"tool_use","tool_name":"bash","tool_input":{"command":"cargo test"}}
{"type":"user","content":"   "}"#;

        let file = create_test_file(content);
        let messages = parse_session_file(file.path()).unwrap();

        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role(), "user");
        assert_eq!(messages[0].timestamp.as_deref(), Some("2024-02-01T08:00:00Z"));
        assert_eq!(get_message_text(&messages[0]), "run the tests");
    }

    #[test]
    fn test_non_object_json_is_skipped_not_failed() {
        let content = "42\n[1,2]\n\"text\"\n{\"type\":\"user\",\"message\":{\"content\":\"hi\"}}";
        let file = create_test_file(content);
        assert_eq!(parse_session_file(file.path()).unwrap().len(), 1);
    }

    #[test]
    fn test_session_token_usage() {
        let content = r#"{"type":"user","message":{"role":"user","content":"Question"}}
{"type":"assistant","message":{"role":"assistant","content":[{"type":"text","text":"Answer"}],"usage":{"input_tokens":120,"output_tokens":45}}}
{"type":"assistant","message":{"role":"assistant","content":[{"type":"tool_use","id":"t"}],"usage":{"input_tokens":30,"output_tokens":5,"cache_read_input_tokens":900}}}
not json
{"type":"user","content":"transcript line"}"#;

        let file = create_test_file(content);
        let usage = session_token_usage(file.path(), DEFAULT_MAX_FILE_BYTES).unwrap();

        assert_eq!(usage, SessionUsage { input_tokens: 150, output_tokens: 50, message_count: 3 });
    }

    #[test]
    fn test_record_tokens_shapes() {
        let value = serde_json::json!({"message": {"usage": {"input_tokens": 7}}});
        assert_eq!(record_tokens(&value), Some((7, 0)));

        let value = serde_json::json!({"message": {"usage": {"input_tokens": "many"}}});
        assert_eq!(record_tokens(&value), None);
        assert_eq!(record_tokens(&serde_json::json!({"message": {}})), None);
    }

    #[test]
    fn test_for_each_record_visits_json_lines_in_order() {
        let file = create_test_file("{\"n\":1}\n\nnot json\n[2]\n{\"n\":3}");
        let mut seen = Vec::new();
        for_each_record(file.path(), DEFAULT_MAX_FILE_BYTES, |value| seen.push(value.clone()))
            .unwrap();
        let expected =
            vec![serde_json::json!({"n": 1}), serde_json::json!([2]), serde_json::json!({"n": 3})];
        assert_eq!(seen, expected);
    }
}
