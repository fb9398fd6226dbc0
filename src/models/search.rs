use std::path::PathBuf;

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResult {
    pub project_name: String,
    pub project_path: PathBuf,
    pub session_id: String,
    pub session_path: PathBuf,
    pub message_uuid: String,
    pub role: String,
    pub content_preview: String,
    pub timestamp: String,
}
