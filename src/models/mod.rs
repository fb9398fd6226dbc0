//! Data models for assistant session logs and their parsed content.
//!
//! - [`Message`] - One record of a session JSONL file
//! - [`TranscriptMessage`] - Plain transcript line, converted into a [`Message`]
//! - [`Segment`] - Prose or code unit produced by the content segmenter
//! - [`CodeSnippet`] - Fenced code block extracted from a session
//! - [`ProjectInfo`] / [`SessionInfo`] - Discovered log directories and files
//! - [`SearchResult`] - A message matching a text search
//! - [`SessionContext`] / [`FileChange`] - Files touched by tool calls in a session
//! - [`DashboardStats`] - Token, message, and activity totals across all projects
//!
//! Message records use serde with lenient custom deserializers (see
//! `parsers::deserializers`) so that unexpected shapes degrade instead of failing.

pub mod activity;
pub mod message;
pub mod project;
pub mod search;
pub mod segment;

pub use activity::{
    DailyStats, DashboardStats, FileChange, HourlyActivity, ProjectStats, SessionContext,
};
pub use message::{Message, MessageContent, TranscriptMessage};
pub use project::{ProjectInfo, SessionInfo};
pub use search::SearchResult;
pub use segment::{CodeSnippet, PLAIN_TEXT_LANGUAGE, Segment, fence_for};
