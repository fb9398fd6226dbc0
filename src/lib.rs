//! Transcript Lens - Inspect AI coding assistant session logs
//!
//! This library reads the JSONL session logs kept under `~/.claude/` and splits their
//! message text into prose and code. It supports:
//!
//! - Segmenting markdown-ish text into prose paragraphs and fenced or detected code
//! - Heuristic code classification and language detection for unfenced paragraphs
//! - Extracting fenced code snippets from a session, with filter expressions
//! - Discovering projects and sessions, with token usage per session
//! - Case-insensitive text search across every session
//! - Listing the files a session's tool calls wrote or edited
//! - Token, message, and activity statistics across all projects
//!
//! # Example
//!
//! ```
//! use transcript_lens::{Segment, parse_content};
//!
//! let segments = parse_content("Run this:\n\n```sh\ncargo test\n```");
//! assert_eq!(segments.len(), 2);
//! assert_eq!(segments[1], Segment::code("sh", "cargo test", false));
//! ```

pub mod cli;
pub mod config;
pub mod content;
pub mod context;
pub mod discovery;
pub mod export;
pub mod filters;
pub mod models;
pub mod parsers;
pub mod search;
pub mod stats;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use content::{
    Language, detect_language, extract_code_snippets, get_message_text, parse_content,
};
pub use context::session_context;
pub use discovery::{discover_projects, list_sessions};
pub use models::{
    CodeSnippet, DashboardStats, FileChange, Message, ProjectInfo, SearchResult, Segment,
    SessionContext, SessionInfo,
};
pub use parsers::parse_session_file;
pub use search::search_messages;
pub use stats::dashboard_stats;
