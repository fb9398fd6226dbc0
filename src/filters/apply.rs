use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

use super::ast::{FieldFilter, FilterExpr, FilterField, FilterOperator};
use crate::content::Language;
use crate::models::CodeSnippet;

/// Keep the snippets matching `filter`, preserving order
///
/// Filter logic:
/// - Same-field OR: lang:rust lang:go → (rust OR go)
/// - Cross-field AND: lang:rust role:user → (rust AND user)
/// - Explicit operators override defaults
///
/// Filters are evaluated left-to-right. An empty filter keeps everything.
pub fn apply_filters(snippets: Vec<CodeSnippet>, filter: &FilterExpr) -> Vec<CodeSnippet> {
    if filter.is_empty() {
        return snippets;
    }

    snippets.into_iter().filter(|snippet| evaluate_filter(snippet, filter)).collect()
}

/// Evaluate filter expression against a single snippet
fn evaluate_filter(snippet: &CodeSnippet, filter: &FilterExpr) -> bool {
    let Some((first, rest)) = filter.filters.split_first() else {
        return true;
    };

    filter.operators.iter().zip(rest).fold(
        evaluate_field_filter(snippet, first),
        |result, (operator, next)| match operator {
            FilterOperator::And => result && evaluate_field_filter(snippet, next),
            FilterOperator::Or => result || evaluate_field_filter(snippet, next),
        },
    )
}

fn evaluate_field_filter(snippet: &CodeSnippet, filter: &FieldFilter) -> bool {
    match filter.field {
        FilterField::Lang => match_lang(snippet, &filter.value),
        FilterField::Role => snippet.role.eq_ignore_ascii_case(&filter.value),
        FilterField::Since => match_since(snippet, &filter.value),
    }
}

/// Resolve a language label to its canonical name, or lowercase it if unknown
fn canonical_language(name: &str) -> String {
    Language::from_name(name)
        .map(|language| language.as_str().to_string())
        .unwrap_or_else(|| name.trim().to_lowercase())
}

/// Match snippet language (case-insensitive, aliases resolved)
fn match_lang(snippet: &CodeSnippet, value: &str) -> bool {
    canonical_language(&snippet.language) == canonical_language(value)
}

/// Match since date (timestamp >= date at 00:00 UTC)
///
/// Snippets whose timestamp is missing or not RFC 3339 never match.
fn match_since(snippet: &CodeSnippet, value: &str) -> bool {
    let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") else {
        return false;
    };
    let Ok(timestamp) = DateTime::parse_from_rfc3339(&snippet.timestamp) else {
        return false;
    };

    timestamp.with_timezone(&Utc) >= date.and_time(NaiveTime::MIN).and_utc()
}
