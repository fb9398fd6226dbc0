//! JSONL parsers for assistant session logs
//!
//! # Error Handling Strategy
//!
//! This module follows a **graceful degradation** approach suitable for CLI tools:
//!
//! - **Individual line failures**: Lines that are not JSON are logged (`tracing::warn!`)
//!   and skipped, so a single bad line does not hide the rest of a session.
//!
//! - **Catastrophic failure detection**: If >50% of lines fail to parse, or if 100
//!   consecutive lines fail, the parser returns an error. This prevents accepting
//!   severely corrupted files.
//!
//! - **Unknown records**: Well-formed records of other types (summaries, system events,
//!   file snapshots, tool-only turns) are not failures; they are skipped silently.
//!
//! - **Lenient fields**: Field-level surprises (a `message` of the wrong shape, numeric
//!   timestamps) are absorbed by the custom deserializers in [`deserializers`].
//!
//! - **Error propagation**: Uses `anyhow::Result` with context. Consumers report errors,
//!   they don't match on error types.

pub mod deserializers;
pub mod session;

pub use session::{
    SessionUsage, for_each_record, parse_session_file, parse_session_file_with_limit,
    record_tokens, session_token_usage,
};
