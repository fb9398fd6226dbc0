//! Filter query parser for code snippet filtering.
//!
//! Parses user-provided filter expressions into an AST ([`FilterExpr`]) for evaluation.
//!
//! # Syntax
//!
//! ```text
//! filter_expr := field_filter (operator? field_filter)*
//! field_filter := field_name:value | field_name:"quoted value"
//! operator := AND | OR (case-insensitive)
//! field_name := lang | role | since (case-insensitive)
//! ```
//!
//! # Supported Fields
//!
//! - `lang:name` - Snippet language; aliases resolve (`js`, `ts`, `py`, `rs`, `sh`, `c++`)
//! - `role:user|assistant` - Role of the message the snippet came from
//! - `since:YYYY-MM-DD` - Snippets timestamped on or after the date (UTC)
//!
//! # Examples
//!
//! ```rust
//! # use transcript_lens::filters::parser::parse_filter;
//! // Same field gets implicit OR
//! let expr = parse_filter("lang:rust lang:go").unwrap();
//!
//! // Different fields get implicit AND
//! let expr = parse_filter("lang:python role:assistant").unwrap();
//!
//! // Explicit operators and quoted values
//! let expr = parse_filter("lang:\"c++\" OR role:user since:2024-01-01").unwrap();
//! ```
//!
//! # Operator Precedence
//!
//! - Implicit operators (no keyword): AND for different fields, OR for same field
//! - Explicit operators (AND/OR keywords): Always respected
//! - No precedence between AND and OR: evaluation is left-to-right

use std::iter::Peekable;
use std::str::Chars;

use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;

use super::ast::{FieldFilter, FilterExpr, FilterField, FilterOperator};

/// Token types produced by the tokenizer
#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    /// field:value or field:"quoted value"
    FieldValue { field: String, value: String },
    And,
    Or,
}

/// Tokenize filter input string into tokens
fn tokenize(input: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&ch) = chars.peek() {
        if ch.is_whitespace() {
            chars.next();
            continue;
        }

        let word = read_word(&mut chars);

        match word.to_uppercase().as_str() {
            "AND" => tokens.push(Token::And),
            "OR" => tokens.push(Token::Or),
            _ => {
                let Some((field, value)) = word.split_once(':') else {
                    return Err(anyhow!(
                        "Invalid token: '{}' (expected field:value or AND/OR)",
                        word
                    ));
                };

                let value = if value.starts_with('"') {
                    read_quoted_value(&mut chars, value)?
                } else {
                    value.to_string()
                };

                if field.is_empty() || value.is_empty() {
                    return Err(anyhow!("Invalid field:value format: {}", word));
                }

                tokens.push(Token::FieldValue { field: field.to_string(), value });
            }
        }
    }

    Ok(tokens)
}

/// Read a word (until whitespace or end)
fn read_word(chars: &mut Peekable<Chars<'_>>) -> String {
    let mut word = String::new();

    while let Some(&ch) = chars.peek() {
        if ch.is_whitespace() {
            break;
        }
        word.push(ch);
        chars.next();
    }

    word
}

/// Read a quoted value whose opening quote (and maybe more) is already in `initial`
fn read_quoted_value(chars: &mut Peekable<Chars<'_>>, initial: &str) -> Result<String> {
    let mut value = initial[1..].to_string();

    if let Some(quote_pos) = value.find('"') {
        value.truncate(quote_pos);
        return Ok(value);
    }

    for ch in chars.by_ref() {
        if ch == '"' {
            return Ok(value);
        }
        value.push(ch);
    }

    Err(anyhow!("Unterminated quoted string"))
}

fn parse_field(field: &str) -> Result<FilterField> {
    match field.to_lowercase().as_str() {
        "lang" | "language" => Ok(FilterField::Lang),
        "role" => Ok(FilterField::Role),
        "since" => Ok(FilterField::Since),
        _ => Err(anyhow!("Unknown field: '{}' (valid fields: lang, role, since)", field)),
    }
}

/// Parse filter string into FilterExpr
///
/// An empty or whitespace-only input yields an empty expression, which matches
/// everything.
pub fn parse_filter(input: &str) -> Result<FilterExpr> {
    let tokens = tokenize(input).context("Failed to tokenize filter")?;

    let mut expr = FilterExpr::new();
    let mut expecting_filter = true;
    let mut last_field: Option<FilterField> = None;

    for token in tokens {
        match token {
            Token::FieldValue { field, value } => {
                let filter_field = parse_field(&field)?;
                validate_value(filter_field, &value)?;

                // No explicit operator since the previous filter
                if !expecting_filter {
                    let implicit_op = match last_field {
                        Some(prev) if prev == filter_field => FilterOperator::Or,
                        _ => FilterOperator::And,
                    };
                    expr.add_operator(implicit_op);
                }

                expr.add_filter(FieldFilter::new(filter_field, value));
                last_field = Some(filter_field);
                expecting_filter = false;
            }
            Token::And | Token::Or => {
                let (operator, name) = match token {
                    Token::And => (FilterOperator::And, "AND"),
                    _ => (FilterOperator::Or, "OR"),
                };
                if expecting_filter {
                    return Err(anyhow!("Unexpected {} operator (expected field:value)", name));
                }
                expr.add_operator(operator);
                expecting_filter = true;
            }
        }
    }

    if expecting_filter && !expr.is_empty() {
        return Err(anyhow!("Filter ended with operator (expected field:value)"));
    }

    Ok(expr)
}

/// Validate filter value based on field type
fn validate_value(field: FilterField, value: &str) -> Result<()> {
    match field {
        FilterField::Role => match value.to_lowercase().as_str() {
            "user" | "assistant" => Ok(()),
            _ => Err(anyhow!("Invalid role value: '{}' (must be 'user' or 'assistant')", value)),
        },
        FilterField::Since => {
            if !is_valid_date_format(value) {
                return Err(anyhow!("Invalid date format: '{}' (expected YYYY-MM-DD)", value));
            }
            Ok(())
        }
        FilterField::Lang => Ok(()),
    }
}

/// Check if string is valid YYYY-MM-DD format
fn is_valid_date_format(s: &str) -> bool {
    // Strict width; chrono alone would accept 2024-1-5
    if s.len() != 10 {
        return false;
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_with_operators() {
        let tokens = tokenize("lang:rust AND role:user").unwrap();
        assert_eq!(tokens.len(), 3);
        assert_eq!(
            tokens[0],
            Token::FieldValue { field: "lang".to_string(), value: "rust".to_string() }
        );
        assert_eq!(tokens[1], Token::And);
    }

    #[test]
    fn test_tokenize_quoted_value() {
        let tokens = tokenize("lang:\"objective c\" role:user").unwrap();
        assert_eq!(
            tokens[0],
            Token::FieldValue { field: "lang".to_string(), value: "objective c".to_string() }
        );
        assert_eq!(tokens.len(), 2);
    }

    #[test]
    fn test_tokenize_unterminated_quote() {
        let err = tokenize("lang:\"foo bar").unwrap_err();
        assert!(err.to_string().contains("Unterminated"));
    }

    #[test]
    fn test_tokenize_invalid_token() {
        let err = tokenize("rust").unwrap_err();
        assert!(err.to_string().contains("Invalid token"));
    }

    #[test]
    fn test_tokenize_empty_field_or_value() {
        assert!(tokenize(":value").unwrap_err().to_string().contains("Invalid field:value"));
        assert!(tokenize("lang:").unwrap_err().to_string().contains("Invalid field:value"));
        assert!(tokenize("lang:\"\"").unwrap_err().to_string().contains("Invalid field:value"));
    }

    #[test]
    fn test_parse_field() {
        assert_eq!(parse_field("lang").unwrap(), FilterField::Lang);
        assert_eq!(parse_field("Language").unwrap(), FilterField::Lang);
        assert_eq!(parse_field("ROLE").unwrap(), FilterField::Role);
        assert_eq!(parse_field("since").unwrap(), FilterField::Since);
        assert!(parse_field("project").unwrap_err().to_string().contains("Unknown field"));
    }

    #[test]
    fn test_validate_role_value() {
        assert!(validate_value(FilterField::Role, "user").is_ok());
        assert!(validate_value(FilterField::Role, "Assistant").is_ok());
        assert!(validate_value(FilterField::Role, "agent").is_err());
    }

    #[test]
    fn test_validate_date_format() {
        assert!(is_valid_date_format("2024-02-29"));
        assert!(!is_valid_date_format("2024-1-15"));
        assert!(!is_valid_date_format("2024/01/15"));
        assert!(!is_valid_date_format("2024-13-01"));
        assert!(!is_valid_date_format("2024-02-31"));
        assert!(!is_valid_date_format("2023-02-29"));
    }

    #[test]
    fn test_parse_filter_empty() {
        assert!(parse_filter("").unwrap().is_empty());
        assert!(parse_filter("   ").unwrap().is_empty());
    }

    #[test]
    fn test_parse_filter_implicit_operators() {
        let expr = parse_filter("lang:rust lang:go role:user").unwrap();
        assert_eq!(expr.filters.len(), 3);
        assert_eq!(expr.operators, vec![FilterOperator::Or, FilterOperator::And]);
    }

    #[test]
    fn test_parse_filter_explicit_operator_wins() {
        let expr = parse_filter("lang:rust AND lang:go").unwrap();
        assert_eq!(expr.operators, vec![FilterOperator::And]);

        let expr = parse_filter("lang:rust or role:user").unwrap();
        assert_eq!(expr.operators, vec![FilterOperator::Or]);
    }

    #[test]
    fn test_parse_filter_invalid_values() {
        let err = parse_filter("role:bot").unwrap_err();
        assert!(err.to_string().contains("Invalid role"));

        let err = parse_filter("since:2024-13-01").unwrap_err();
        assert!(err.to_string().contains("Invalid date"));
    }

    #[test]
    fn test_parse_filter_dangling_operators() {
        let err = parse_filter("lang:rust AND").unwrap_err();
        assert!(err.to_string().contains("ended with operator"));

        let err = parse_filter("OR lang:rust").unwrap_err();
        assert!(err.to_string().contains("Unexpected OR"));

        assert!(parse_filter("lang:rust AND OR lang:go").is_err());
    }
}
