//! Terminal output sanitization
//!
//! # Security: Terminal Injection Prevention
//!
//! Session logs contain text written by users, assistants, and tools, including raw
//! command output. Anything printed to a terminal from a log (prose segments, snippet
//! headers, search previews) goes through [`strip_ansi_codes`] so that embedded escape
//! sequences cannot clear the screen, move the cursor, or retitle the window.
//!
//! JSON output is not sanitized: serde escapes control characters itself.

const ESC: char = '\x1b';
const BEL: char = '\x07';

/// Strips ANSI escape sequences and control characters from a string
///
/// Removes CSI sequences (`ESC [ ... letter`), OSC sequences (`ESC ] ... BEL` or
/// `ESC ] ... ESC \`), and every other control character except tab, newline, and
/// carriage return.
///
/// # Examples
///
/// ```
/// use transcript_lens::utils::terminal::strip_ansi_codes;
///
/// let text = "\x1b[31mRed text\x1b[0m";
/// assert_eq!(strip_ansi_codes(text), "Red text");
/// ```
pub fn strip_ansi_codes(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == ESC {
            match chars.peek() {
                Some('[') => {
                    chars.next();
                    // Parameters run until the final letter
                    for next_ch in chars.by_ref() {
                        if next_ch.is_ascii_alphabetic() {
                            break;
                        }
                    }
                    continue;
                }
                Some(']') => {
                    chars.next();
                    while let Some(next_ch) = chars.next() {
                        if next_ch == BEL {
                            break;
                        }
                        if next_ch == ESC && chars.peek() == Some(&'\\') {
                            chars.next();
                            break;
                        }
                    }
                    continue;
                }
                _ => {}
            }
        }

        if ch.is_control() && ch != '\t' && ch != '\n' && ch != '\r' {
            continue;
        }

        result.push(ch);
    }

    result
}
