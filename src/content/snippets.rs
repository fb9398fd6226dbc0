use super::segmenter::scan_fences;
use super::text::get_message_text;
use crate::models::{CodeSnippet, Message};

/// Collect every fenced code block of a session, in message order then fence order
///
/// Only explicit fences are considered; untagged paragraphs are not run through
/// language detection here. Fences whose body is blank are skipped.
pub fn extract_code_snippets(messages: &[Message]) -> Vec<CodeSnippet> {
    let mut snippets = Vec::new();

    for message in messages {
        let text = get_message_text(message);
        if text.is_empty() {
            continue;
        }

        for fence in scan_fences(&text) {
            let code = fence.body.trim();
            if code.is_empty() {
                continue;
            }
            snippets.push(CodeSnippet {
                language: fence.language.to_string(),
                code: code.to_string(),
                role: message.role().to_string(),
                timestamp: message.timestamp.clone().unwrap_or_default(),
            });
        }
    }

    snippets
}
