//! Shared test utilities for integration tests
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Value, json};
use tempfile::TempDir;

/// Builder for creating test .claude directory structures
pub struct ClaudeDirBuilder {
    temp_dir: TempDir,
}

impl ClaudeDirBuilder {
    /// Create a new builder with an empty .claude directory
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        Self { temp_dir }
    }

    /// Get the path to the .claude directory
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Add a project directory with the given encoded name and session files
    pub fn with_project(self, encoded_name: &str, sessions: &[SessionFileBuilder]) -> Self {
        let project_dir = self.temp_dir.path().join("projects").join(encoded_name);
        fs::create_dir_all(&project_dir).expect("Failed to create project dir");

        for session in sessions {
            session.create_in(&project_dir);
        }

        self
    }

    /// Add plain transcript files under `transcripts/`
    pub fn with_transcripts(self, sessions: &[SessionFileBuilder]) -> Self {
        let dir = self.temp_dir.path().join("transcripts");
        fs::create_dir_all(&dir).expect("Failed to create transcripts dir");

        for session in sessions {
            session.create_in(&dir);
        }

        self
    }

    /// Build and return the temp directory (consumes self)
    pub fn build(self) -> TempDir {
        self.temp_dir
    }
}

impl Default for ClaudeDirBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for session JSONL files
pub struct SessionFileBuilder {
    filename: String,
    lines: Vec<String>,
}

impl SessionFileBuilder {
    /// Create a new session file with the given filename
    pub fn new(filename: &str) -> Self {
        Self { filename: filename.to_string(), lines: Vec::new() }
    }

    /// Add a message record
    pub fn with_message(mut self, message: MessageBuilder) -> Self {
        self.lines.push(message.to_json());
        self
    }

    /// Add a raw line, written as-is
    pub fn with_raw_line(mut self, line: &str) -> Self {
        self.lines.push(line.to_string());
        self
    }

    /// Create the file in the given directory
    pub fn create_in(&self, dir: &Path) -> PathBuf {
        let path = dir.join(&self.filename);
        fs::write(&path, self.lines.join("\n")).expect("Failed to write session file");
        path
    }
}

/// Builder for message records in session files
pub struct MessageBuilder {
    role: String,
    text: String,
    timestamp: String,
    uuid: String,
    usage: Option<(u64, u64)>,
    tool_uses: Vec<Value>,
}

impl MessageBuilder {
    /// Create a new user message
    pub fn user() -> Self {
        Self {
            role: "user".to_string(),
            text: "Test message".to_string(),
            timestamp: "2024-01-15T10:00:00Z".to_string(),
            uuid: "550e8400-e29b-41d4-a716-446655440001".to_string(),
            usage: None,
            tool_uses: Vec::new(),
        }
    }

    /// Create a new assistant message
    pub fn assistant() -> Self {
        Self {
            role: "assistant".to_string(),
            text: "Test response".to_string(),
            timestamp: "2024-01-15T10:00:05Z".to_string(),
            uuid: "550e8400-e29b-41d4-a716-446655440002".to_string(),
            usage: None,
            tool_uses: Vec::new(),
        }
    }

    /// Set the message text
    pub fn text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    /// Set the timestamp (RFC 3339)
    pub fn timestamp(mut self, timestamp: &str) -> Self {
        self.timestamp = timestamp.to_string();
        self
    }

    /// Set the UUID
    pub fn uuid(mut self, uuid: &str) -> Self {
        self.uuid = uuid.to_string();
        self
    }

    /// Attach token usage to the message body
    pub fn usage(mut self, input_tokens: u64, output_tokens: u64) -> Self {
        self.usage = Some((input_tokens, output_tokens));
        self
    }

    /// Append a `tool_use` block after the text
    pub fn tool_use(mut self, name: &str, input: Value) -> Self {
        let id = format!("toolu_{}", self.tool_uses.len() + 1);
        self.tool_uses.push(json!({"type": "tool_use", "id": id, "name": name, "input": input}));
        self
    }

    /// Convert to a JSON line
    pub fn to_json(&self) -> String {
        let mut content = vec![json!({"type": "text", "text": self.text})];
        content.extend(self.tool_uses.iter().cloned());
        let mut body = json!({
            "role": self.role,
            "content": content,
        });
        if let Some((input, output)) = self.usage {
            body["usage"] = json!({"input_tokens": input, "output_tokens": output});
        }

        let record: Value = json!({
            "type": self.role,
            "uuid": self.uuid,
            "sessionId": "550e8400-e29b-41d4-a716-446655440000",
            "timestamp": self.timestamp,
            "message": body,
        });
        record.to_string()
    }
}

/// A session mixing prose and two fenced blocks across three messages
pub fn sample_session() -> SessionFileBuilder {
    SessionFileBuilder::new("session-1.jsonl")
        .with_message(
            MessageBuilder::user()
                .text("How do I print in Rust and Python?")
                .timestamp("2024-01-15T10:00:00Z")
                .uuid("u-1"),
        )
        .with_message(
            MessageBuilder::assistant()
                .text("In Rust:\n\n```rust\nprintln!(\"hi\");\n```")
                .timestamp("2024-01-15T10:00:05Z")
                .uuid("a-1")
                .usage(120, 40),
        )
        .with_message(
            MessageBuilder::assistant()
                .text("And in Python:\n\n```python\nprint(\"hi\")\n```")
                .timestamp("2024-02-20T09:00:00Z")
                .uuid("a-2")
                .usage(80, 20),
        )
}

/// Helper to create a realistic .claude directory with sample data
pub fn realistic_claude_dir() -> TempDir {
    ClaudeDirBuilder::new()
        .with_project("-Users-test-project1", &[sample_session()])
        .with_project(
            "-Users-test-project2",
            &[SessionFileBuilder::new("session-2.jsonl").with_message(
                MessageBuilder::user()
                    .text("Another project mentions Rust too")
                    .timestamp("2024-03-01T12:00:00Z")
                    .uuid("u-2"),
            )],
        )
        .build()
}
