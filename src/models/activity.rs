use std::path::PathBuf;

use serde::Serialize;

/// A file written or edited by an assistant tool call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileChange {
    pub file_path: String,
    /// Name of the tool that made the change (`Edit`, `Write`, `mcp_edit`, `mcp_write`)
    pub action: String,
    /// Timestamp of the record holding the tool call, or `""` when absent
    pub timestamp: String,
}

/// Files touched during one session and the time span it covers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionContext {
    pub file_changes: Vec<FileChange>,
    /// Earliest timestamp of any record in the session
    pub started_at: Option<String>,
    /// Latest timestamp of any record in the session
    pub ended_at: Option<String>,
}

/// Token and message totals for one calendar date
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DailyStats {
    /// `YYYY-MM-DD` as written in the record timestamps
    pub date: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
    /// Sessions with at least one user or assistant record on this date
    pub session_count: u32,
    pub message_count: u32,
}

/// Message count for one cell of the hour × weekday grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HourlyActivity {
    /// 0-23, in the timestamp's own offset
    pub hour: u8,
    /// 0 is Monday
    pub day: u8,
    pub count: u32,
}

/// Token totals for one project
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectStats {
    pub name: String,
    pub path: PathBuf,
    pub total_input_tokens: u64,
    pub total_output_tokens: u64,
    pub session_count: u32,
}

impl ProjectStats {
    pub fn total_tokens(&self) -> u64 {
        self.total_input_tokens + self.total_output_tokens
    }
}

/// Usage aggregated over every session of every project
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardStats {
    pub total_input_tokens: u64,
    pub total_output_tokens: u64,
    pub total_sessions: u32,
    pub total_messages: u32,
    /// Sorted by date, oldest first
    pub daily_stats: Vec<DailyStats>,
    /// Non-empty cells only, sorted by (day, hour)
    pub hourly_activity: Vec<HourlyActivity>,
    /// Sorted by total tokens, largest first
    pub project_stats: Vec<ProjectStats>,
    /// US dollars at a flat per-token rate
    pub estimated_cost: f64,
    /// Mean first-to-last message span over sessions that span any time at all
    pub avg_session_minutes: f64,
}
