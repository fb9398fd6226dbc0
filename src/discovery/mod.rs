//! Project and session discovery under the assistant data directory
//!
//! # Error Handling Strategy
//!
//! Discovery combines graceful degradation with hard resource limits:
//!
//! - **Entry-level failures**: Symlinked entries and unreadable project directories or
//!   session files are logged (`tracing::warn!`) and skipped.
//!
//! - **Resource limits**: More than [`projects::MAX_PROJECTS`] projects, or more than
//!   [`projects::MAX_SESSION_FILES_PER_PROJECT`] session files in one directory, is an
//!   error rather than a silent truncation.
//!
//! - **Parser integration**: Per-session statistics come from the session parser, which
//!   applies its own size limit.

pub mod projects;
pub mod sessions;

pub use projects::{TRANSCRIPTS_PROJECT_NAME, discover_projects};
pub use sessions::list_sessions;
