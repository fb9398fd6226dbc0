//! Case-insensitive text search across every session of every project.
//!
//! Session files are searched in parallel (one rayon task per file). A file that fails
//! to parse is logged and contributes no results. Results are ordered by timestamp,
//! newest first; there is no relevance ranking.

use std::path::{Path, PathBuf};

use anyhow::Result;
use rayon::prelude::*;

use crate::config::{DEFAULT_MAX_FILE_BYTES, DEFAULT_SEARCH_LIMIT};
use crate::content::get_message_text;
use crate::discovery::discover_projects;
use crate::models::{Message, SearchResult};
use crate::parsers::parse_session_file_with_limit;

/// Preview length in chars used by [`create_preview`] callers when the query is not found
pub const PREVIEW_LEN: usize = 100;

const CONTEXT_BEFORE: usize = 30;
const CONTEXT_AFTER: usize = 70;

/// Search options beyond the query itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOptions {
    pub limit: usize,
    pub max_file_bytes: u64,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self { limit: DEFAULT_SEARCH_LIMIT, max_file_bytes: DEFAULT_MAX_FILE_BYTES }
    }
}

struct SessionTarget<'a> {
    project_name: &'a str,
    project_path: &'a Path,
    session_path: &'a Path,
}

/// Find messages whose text contains `query`, ignoring case
///
/// An empty (or whitespace-only) query returns no results.
pub fn search_messages(claude_dir: &Path, query: &str, limit: usize) -> Result<Vec<SearchResult>> {
    search_messages_with(claude_dir, query, SearchOptions { limit, ..SearchOptions::default() })
}

/// [`search_messages`] with explicit options
pub fn search_messages_with(
    claude_dir: &Path,
    query: &str,
    options: SearchOptions,
) -> Result<Vec<SearchResult>> {
    if query.trim().is_empty() {
        return Ok(Vec::new());
    }

    let projects = discover_projects(claude_dir)?;
    let targets: Vec<SessionTarget<'_>> = projects
        .iter()
        .flat_map(|project| {
            project.session_files.iter().map(|session_path| SessionTarget {
                project_name: &project.name,
                project_path: &project.project_dir,
                session_path,
            })
        })
        .collect();

    let mut results: Vec<SearchResult> = targets
        .par_iter()
        .flat_map_iter(|target| search_session(target, query, options.max_file_bytes))
        .collect();

    results.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    results.truncate(options.limit);

    tracing::debug!(query, hits = results.len(), sessions = targets.len(), "search finished");
    Ok(results)
}

fn search_session(target: &SessionTarget<'_>, query: &str, max_bytes: u64) -> Vec<SearchResult> {
    let messages = match parse_session_file_with_limit(target.session_path, max_bytes) {
        Ok(messages) => messages,
        Err(e) => {
            tracing::warn!(
                path = %target.session_path.display(),
                error = %e,
                "skipping session in search"
            );
            return Vec::new();
        }
    };

    let session_id = target
        .session_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    messages
        .into_iter()
        .filter_map(|message| {
            let text = get_message_text(&message);
            let hit = find_ignore_case(&text, query)?;
            Some(to_result(target, &session_id, message, &text, hit))
        })
        .collect()
}

fn to_result(
    target: &SessionTarget<'_>,
    session_id: &str,
    message: Message,
    text: &str,
    hit: (usize, usize),
) -> SearchResult {
    SearchResult {
        project_name: target.project_name.to_string(),
        project_path: PathBuf::from(target.project_path),
        session_id: session_id.to_string(),
        session_path: PathBuf::from(target.session_path),
        role: message.role().to_string(),
        message_uuid: message.uuid.unwrap_or_default(),
        content_preview: preview_around(text, hit),
        timestamp: message.timestamp.unwrap_or_default(),
    }
}

/// Build a one-line preview of `text` around the first case-insensitive match of `query`
///
/// The window spans 30 bytes before the match to 70 bytes after it, widened to the
/// nearest char boundaries, with `...` marking each truncated side. Without a match the
/// first `max_len` chars are used. Newlines are flattened to spaces.
///
/// # Examples
///
/// ```
/// use transcript_lens::search::create_preview;
///
/// assert_eq!(create_preview("Fix the\nBuild", "build", 100), "Fix the Build");
/// ```
pub fn create_preview(text: &str, query: &str, max_len: usize) -> String {
    if let Some(hit) = find_ignore_case(text, query) {
        return preview_around(text, hit);
    }

    let mut preview: String = text.chars().take(max_len).collect();
    if text.chars().nth(max_len).is_some() {
        preview.push_str("...");
    }
    preview.replace(['\n', '\r'], " ")
}

fn preview_around(text: &str, (start_match, end_match): (usize, usize)) -> String {
    let start = floor_char_boundary(text, start_match.saturating_sub(CONTEXT_BEFORE));
    let end = ceil_char_boundary(text, end_match.saturating_add(CONTEXT_AFTER));

    let mut preview = String::with_capacity(end - start + 6);
    if start > 0 {
        preview.push_str("...");
    }
    preview.push_str(&text[start..end]);
    if end < text.len() {
        preview.push_str("...");
    }
    preview.replace(['\n', '\r'], " ")
}

/// Byte range of the first case-insensitive occurrence of `query` in `text`
///
/// This is the one matching rule for both hit detection and previews. It compares
/// char by char so the range always lies on `text`'s own char boundaries, even when
/// lowercasing changes byte lengths.
fn find_ignore_case(text: &str, query: &str) -> Option<(usize, usize)> {
    let needle: Vec<char> = query.chars().flat_map(fold_case).collect();
    if needle.is_empty() {
        return None;
    }

    for (start, _) in text.char_indices() {
        let mut matched = 0;
        for (offset, ch) in text[start..].char_indices() {
            let lowered: Vec<char> = fold_case(ch).collect();
            let next = matched + lowered.len();
            if next > needle.len() || needle[matched..next] != lowered[..] {
                break;
            }
            matched = next;
            if matched == needle.len() {
                return Some((start, start + offset + ch.len_utf8()));
            }
        }
    }

    None
}

/// Per-char lowercase with final sigma folded onto medial sigma
fn fold_case(ch: char) -> impl Iterator<Item = char> {
    ch.to_lowercase().map(|c| if c == 'ς' { 'σ' } else { c })
}

fn floor_char_boundary(text: &str, mut index: usize) -> usize {
    while !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}

fn ceil_char_boundary(text: &str, index: usize) -> usize {
    let mut index = index.min(text.len());
    while !text.is_char_boundary(index) {
        index += 1;
    }
    index
}
