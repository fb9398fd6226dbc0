use std::path::PathBuf;

use serde::Serialize;

/// A directory of session logs
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectInfo {
    /// Human-readable name decoded from the directory name
    pub name: String,
    pub project_dir: PathBuf,
    pub session_files: Vec<PathBuf>,
}

impl ProjectInfo {
    pub fn session_count(&self) -> usize {
        self.session_files.len()
    }
}

/// One session log with size and token totals
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionInfo {
    pub id: String,
    pub path: PathBuf,
    pub size: u64,
    /// Last modification time in seconds since the Unix epoch
    pub modified: u64,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub message_count: u32,
}
