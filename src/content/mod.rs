//! Message content analysis: prose/code segmentation, code heuristics, and language
//! detection.
//!
//! Everything in this module is pure and synchronous. Compiled pattern tables are
//! process-wide statics, so the functions can be called from any thread.

pub mod classifier;
pub mod language;
pub mod segmenter;
pub mod snippets;
pub mod text;

pub use classifier::{looks_like_code, looks_like_code_with};
pub use language::{
    DetectError, Guess, Language, detect_language, detect_language_with, guess_language,
};
pub use segmenter::{
    Fence, is_plain_prose, parse_content, parse_content_with, reconstruct, scan_fences,
};
pub use snippets::extract_code_snippets;
pub use text::{get_message_text, has_text_content};
