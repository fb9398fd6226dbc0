use serde::{Deserialize, Serialize};

/// Language label used when a fence carries no tag
pub const PLAIN_TEXT_LANGUAGE: &str = "text";

/// One classified unit of a message's text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Segment {
    /// Paragraph text, surrounding newlines removed
    Prose { text: String },
    /// Fenced or detected code
    Code {
        language: String,
        source: String,
        #[serde(rename = "autoDetected")]
        auto_detected: bool,
    },
}

impl Segment {
    pub fn prose(text: impl Into<String>) -> Self {
        Segment::Prose { text: text.into() }
    }

    pub fn code(
        language: impl Into<String>,
        source: impl Into<String>,
        auto_detected: bool,
    ) -> Self {
        Segment::Code { language: language.into(), source: source.into(), auto_detected }
    }

    pub fn is_code(&self) -> bool {
        matches!(self, Segment::Code { .. })
    }

    /// Language of a code segment, `None` for prose
    pub fn language(&self) -> Option<&str> {
        match self {
            Segment::Code { language, .. } => Some(language),
            Segment::Prose { .. } => None,
        }
    }

    /// Render the segment back into markup
    ///
    /// Explicitly fenced code is re-fenced (with a fence longer than any backtick run in
    /// the source); auto-detected code is emitted bare so that segmenting the output
    /// detects it again.
    pub fn to_markup(&self) -> String {
        match self {
            Segment::Prose { text } => text.clone(),
            Segment::Code { source, auto_detected: true, .. } => source.clone(),
            Segment::Code { language, source, auto_detected: false } => {
                let fence = fence_for(source);
                format!("{}{}\n{}\n{}", fence, language, source, fence)
            }
        }
    }
}

/// Backtick fence that can wrap `code`: three backticks, or one more than the longest
/// backtick run inside it
pub fn fence_for(code: &str) -> String {
    let longest = code.split(|c: char| c != '`').map(str::len).max().unwrap_or(0);
    "`".repeat(longest.max(2) + 1)
}

/// A fenced code block pulled out of a session, with its message's provenance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeSnippet {
    pub language: String,
    pub code: String,
    pub role: String,
    pub timestamp: String,
}
