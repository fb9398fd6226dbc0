use std::fs;
use std::path::Path;
use std::time::UNIX_EPOCH;

use anyhow::{Context, Result, bail};

use super::projects::collect_session_files;
use crate::models::SessionInfo;
use crate::parsers::session_token_usage;

/// List the sessions of a project directory, newest first
///
/// Sessions without any displayable message are omitted. Files that cannot be read
/// (too large, unreadable) are logged and skipped.
///
/// # Errors
///
/// Returns an error if `project_dir` does not exist or cannot be read.
pub fn list_sessions(project_dir: &Path, max_file_bytes: u64) -> Result<Vec<SessionInfo>> {
    if !project_dir.is_dir() {
        bail!("Project directory does not exist: {}", project_dir.display());
    }

    let entries = fs::read_dir(project_dir)
        .with_context(|| format!("Failed to read project directory: {}", project_dir.display()))?;

    let mut sessions = Vec::new();
    for path in collect_session_files(entries, project_dir)? {
        let metadata = fs::metadata(&path)
            .with_context(|| format!("Failed to read file metadata: {}", path.display()))?;
        let modified = metadata
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_secs())
            .unwrap_or(0);

        let usage = match session_token_usage(&path, max_file_bytes) {
            Ok(usage) => usage,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "skipping session");
                continue;
            }
        };
        if usage.message_count == 0 {
            continue;
        }

        let id = path.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
        sessions.push(SessionInfo {
            id,
            path,
            size: metadata.len(),
            modified,
            input_tokens: usage.input_tokens,
            output_tokens: usage.output_tokens,
            message_count: usage.message_count,
        });
    }

    sessions.sort_by(|a, b| b.modified.cmp(&a.modified).then_with(|| a.id.cmp(&b.id)));
    Ok(sessions)
}

#[cfg(test)]
mod tests {
    use std::fs::File;
    use std::time::{Duration, SystemTime};

    use tempfile::TempDir;

    use super::*;
    use crate::config::DEFAULT_MAX_FILE_BYTES;

    const USER_LINE: &str = r#"{"type":"user","message":{"role":"user","content":"hello"}}"#;

    fn write_session(dir: &Path, name: &str, content: &str, age_secs: u64) {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        let mtime = SystemTime::now() - Duration::from_secs(age_secs);
        File::options().write(true).open(&path).unwrap().set_modified(mtime).unwrap();
    }

    #[test]
    fn test_list_sessions_newest_first() {
        let dir = TempDir::new().unwrap();
        write_session(dir.path(), "old.jsonl", USER_LINE, 3600);
        write_session(dir.path(), "new.jsonl", USER_LINE, 10);

        let sessions = list_sessions(dir.path(), DEFAULT_MAX_FILE_BYTES).unwrap();
        let ids: Vec<&str> = sessions.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["new", "old"]);
        assert!(sessions[0].modified > sessions[1].modified);
        assert_eq!(sessions[0].size, USER_LINE.len() as u64);
    }

    #[test]
    fn test_list_sessions_omits_sessions_without_messages() {
        let dir = TempDir::new().unwrap();
        write_session(dir.path(), "summary.jsonl", r#"{"type":"summary","summary":"x"}"#, 0);
        write_session(dir.path(), "empty.jsonl", "", 0);
        write_session(dir.path(), "real.jsonl", USER_LINE, 0);

        let sessions = list_sessions(dir.path(), DEFAULT_MAX_FILE_BYTES).unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].id, "real");
        assert_eq!(sessions[0].message_count, 1);
    }

    #[test]
    fn test_list_sessions_reports_token_totals() {
        let dir = TempDir::new().unwrap();
        let content = format!(
            "{}\n{}\n",
            USER_LINE,
            r#"{"type":"assistant","message":{"role":"assistant","content":"hi","usage":{"input_tokens":10,"output_tokens":3}}}"#
        );
        write_session(dir.path(), "s.jsonl", &content, 0);

        let sessions = list_sessions(dir.path(), DEFAULT_MAX_FILE_BYTES).unwrap();
        assert_eq!(sessions[0].input_tokens, 10);
        assert_eq!(sessions[0].output_tokens, 3);
        assert_eq!(sessions[0].message_count, 2);
    }

    #[test]
    fn test_list_sessions_skips_oversized_files() {
        let dir = TempDir::new().unwrap();
        write_session(dir.path(), "big.jsonl", &format!("{}\n", USER_LINE).repeat(10), 0);
        write_session(dir.path(), "small.jsonl", USER_LINE, 0);

        let sessions = list_sessions(dir.path(), USER_LINE.len() as u64).unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].id, "small");
    }

    #[test]
    fn test_list_sessions_missing_directory() {
        let err = list_sessions(Path::new("/nonexistent/project"), DEFAULT_MAX_FILE_BYTES)
            .unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }
}
