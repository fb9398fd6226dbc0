//! Splits message text into prose and code segments.
//!
//! Two passes: explicit backtick fences are located first with a linear scanner, then
//! every stretch of text outside a fence is split into paragraphs and each paragraph is
//! classified as prose or (auto-detected) code.

use std::sync::LazyLock;

use regex::Regex;

use super::classifier::looks_like_code_with;
use super::language::detect_language_with;
use crate::config::DetectionConfig;
use crate::models::{PLAIN_TEXT_LANGUAGE, Segment};

/// Shortest backtick run that opens a fence
const MIN_FENCE_LEN: usize = 3;

/// Two or more line breaks separate paragraphs
static PARAGRAPH_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:\r?\n){2,}").expect("paragraph break pattern"));

/// A fenced code block located in a larger text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fence<'a> {
    /// Byte offset of the opening backticks
    pub start: usize,
    /// Byte offset just past the closing backticks
    pub end: usize,
    /// Tag from the info string, or `"text"` when none was given
    pub language: &'a str,
    /// Raw body between the info line and the closing fence
    pub body: &'a str,
}

/// A maximal run of backticks
#[derive(Debug, Clone, Copy)]
struct Run {
    start: usize,
    len: usize,
}

impl Run {
    fn end(&self) -> usize {
        self.start + self.len
    }
}

fn backtick_runs(text: &str) -> Vec<Run> {
    let bytes = text.as_bytes();
    let mut runs = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'`' {
            i += 1;
            continue;
        }
        let start = i;
        while i < bytes.len() && bytes[i] == b'`' {
            i += 1;
        }
        runs.push(Run { start, len: i - start });
    }

    runs
}

fn is_tag_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || matches!(ch, '_' | '+' | '#' | '.' | '-')
}

/// Locate every fenced block in `text`, left to right, without overlap
///
/// A fence opens with a run of at least three backticks followed by an info line. The
/// info line must not contain a backtick (that is inline code, and the run closing it is
/// skipped too) and its first word, the language tag, may only contain letters, digits
/// and `_+#.-`. The body ends at the next run at least as long as the opener, so a
/// four-backtick fence can wrap triple-backtick examples. An opener that is never closed
/// is not a block.
///
/// Runs in time linear in `text.len()`.
pub fn scan_fences(text: &str) -> Vec<Fence<'_>> {
    let runs = backtick_runs(text);

    // Longest run at or after each index, to reject unclosable openers without scanning
    let mut longest_after = vec![0; runs.len() + 1];
    for i in (0..runs.len()).rev() {
        longest_after[i] = runs[i].len.max(longest_after[i + 1]);
    }

    let mut fences = Vec::new();
    let mut i = 0;

    while i < runs.len() {
        let open = runs[i];
        if open.len < MIN_FENCE_LEN {
            i += 1;
            continue;
        }

        let info_start = open.end();
        let Some(newline) = text[info_start..].find('\n') else {
            break;
        };
        let line_end = info_start + newline;

        if runs.get(i + 1).is_some_and(|next| next.start < line_end) {
            // Inline code: skip the closing run as well
            i += 2;
            continue;
        }

        let tag = text[info_start..line_end].split_whitespace().next().unwrap_or_default();
        if !tag.chars().all(is_tag_char) || longest_after[i + 1] < open.len {
            i += 1;
            continue;
        }

        let Some(close) = (i + 1..runs.len()).find(|&j| runs[j].len >= open.len) else {
            break;
        };
        let closing = runs[close];

        fences.push(Fence {
            start: open.start,
            end: closing.end(),
            language: if tag.is_empty() { PLAIN_TEXT_LANGUAGE } else { tag },
            body: &text[line_end + 1..closing.start],
        });
        i = close + 1;
    }

    fences
}

/// Segment `text` using the default detection thresholds
///
/// # Examples
///
/// ```
/// use transcript_lens::content::parse_content;
/// use transcript_lens::models::Segment;
///
/// let segments = parse_content("Hello\n\n```js\nconst x = 1;\n```\n\nBye");
/// assert_eq!(
///     segments,
///     vec![
///         Segment::prose("Hello"),
///         Segment::code("js", "const x = 1;", false),
///         Segment::prose("Bye"),
///     ]
/// );
/// ```
pub fn parse_content(text: &str) -> Vec<Segment> {
    parse_content_with(text, &DetectionConfig::default())
}

/// Segment `text` into prose and code, in source order
pub fn parse_content_with(text: &str, config: &DetectionConfig) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut cursor = 0;

    for fence in scan_fences(text) {
        push_paragraphs(&text[cursor..fence.start], config, &mut segments);

        let source = fence.body.trim();
        if !source.is_empty() {
            segments.push(Segment::code(fence.language, source, false));
        }
        cursor = fence.end;
    }
    push_paragraphs(&text[cursor..], config, &mut segments);

    segments
}

fn push_paragraphs(chunk: &str, config: &DetectionConfig, segments: &mut Vec<Segment>) {
    for paragraph in PARAGRAPH_BREAK.split(chunk) {
        let trimmed = paragraph.trim();
        if trimmed.is_empty() {
            continue;
        }

        let detected = looks_like_code_with(trimmed, config)
            .then(|| detect_language_with(trimmed, config))
            .flatten();

        match detected {
            Some(language) => segments.push(Segment::code(language.as_str(), trimmed, true)),
            None => segments.push(Segment::prose(paragraph.trim_matches(['\r', '\n']))),
        }
    }
}

/// True when the segments are a single prose paragraph
///
/// Renderers can show the original text directly in that case.
pub fn is_plain_prose(segments: &[Segment]) -> bool {
    matches!(segments, [Segment::Prose { .. }])
}

/// Join segments back into markup, paragraphs separated by a blank line
///
/// Segmenting the result yields the same segments again.
pub fn reconstruct(segments: &[Segment]) -> String {
    segments.iter().map(Segment::to_markup).collect::<Vec<_>>().join("\n\n")
}
