//! Code-likelihood heuristics for untagged paragraphs.
//!
//! A paragraph is treated as code only when several independent signals agree. A
//! single signal (say, a prose sentence ending in `;`) is never enough.

use std::sync::LazyLock;

use regex::Regex;

use crate::config::DetectionConfig;

/// Statement or declaration keyword at the start of a line
static LEADING_KEYWORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)^(import|export|const|let|var|function|class|interface|type|def|from|return)\s",
    )
    .expect("leading keyword pattern")
});

/// Line ending in a brace or semicolon
static TRAILING_PUNCTUATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)[{};][ \t\r]*$").expect("trailing punctuation pattern"));

/// Indented control flow or declaration
static INDENTED_KEYWORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^ {2,}(if|for|while|return|const|let|var)\b")
        .expect("indented keyword pattern")
});

static ARROW_FUNCTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"=>\s*[{(]").expect("arrow function pattern"));

/// `<Component` style tag
static COMPONENT_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[A-Z][A-Za-z0-9]*").expect("component tag pattern"));

static EMPTY_CALL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(\)\s*[{=]").expect("empty call pattern"));

/// Returns true when `text` is probably source code, using the default thresholds
///
/// # Examples
///
/// ```
/// use transcript_lens::content::looks_like_code;
///
/// assert!(looks_like_code("const add = (a, b) => {\n  return a + b;\n};"));
/// assert!(!looks_like_code("Remember to update the docs;\nthen ship it."));
/// ```
pub fn looks_like_code(text: &str) -> bool {
    looks_like_code_with(text, &DetectionConfig::default())
}

/// Returns true when at least `min_code_signals` heuristics fire on a paragraph with at
/// least `min_code_lines` non-blank lines
pub fn looks_like_code_with(text: &str, config: &DetectionConfig) -> bool {
    let non_blank_lines = text.lines().filter(|line| !line.trim().is_empty()).count();
    if non_blank_lines < config.min_code_lines {
        return false;
    }

    count_signals(text) >= config.min_code_signals
}

/// Number of heuristics that fire on `text`
pub fn count_signals(text: &str) -> usize {
    [
        &LEADING_KEYWORD,
        &TRAILING_PUNCTUATION,
        &INDENTED_KEYWORD,
        &ARROW_FUNCTION,
        &COMPONENT_TAG,
        &EMPTY_CALL,
    ]
    .iter()
    .filter(|pattern| pattern.is_match(text))
    .count()
}
