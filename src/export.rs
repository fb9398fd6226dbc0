use std::fmt::Write;

use crate::models::{CodeSnippet, fence_for};

/// Render snippets as a Markdown document, one section per snippet
///
/// Each section is a `## Snippet N (<role>, <timestamp>)` heading followed by the code
/// in a fence tagged with the snippet's language. A fence longer than any backtick run
/// in the code is used, so code containing triple backticks stays intact.
pub fn render_snippets_markdown(snippets: &[CodeSnippet]) -> String {
    let mut out = String::new();

    for (i, snippet) in snippets.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let role = if snippet.role.is_empty() { "unknown" } else { &snippet.role };
        let timestamp =
            if snippet.timestamp.is_empty() { "unknown time" } else { &snippet.timestamp };
        let fence = fence_for(&snippet.code);

        // Writing into a String cannot fail
        let _ = writeln!(out, "## Snippet {} ({}, {})", i + 1, role, timestamp);
        let _ = writeln!(out);
        let _ = writeln!(out, "{}{}", fence, snippet.language);
        let _ = writeln!(out, "{}", snippet.code);
        let _ = writeln!(out, "{}", fence);
    }

    out
}
