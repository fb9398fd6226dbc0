use std::fmt;

/// Snippet fields a filter can test
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterField {
    /// Snippet language, compared after resolving aliases (`js` = `javascript`)
    Lang,
    /// Role of the message the snippet came from (user or assistant)
    Role,
    /// Snippets on or after a date (YYYY-MM-DD format)
    Since,
}

impl fmt::Display for FilterField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FilterField::Lang => "lang",
            FilterField::Role => "role",
            FilterField::Since => "since",
        };
        f.write_str(name)
    }
}

/// Logical operators for combining filters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOperator {
    /// Both conditions must match (default between different fields)
    And,
    /// Either condition matches (default within same field)
    Or,
}

/// Single field:value filter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldFilter {
    pub field: FilterField,
    pub value: String,
}

impl FieldFilter {
    pub fn new(field: FilterField, value: impl Into<String>) -> Self {
        Self { field, value: value.into() }
    }
}

/// Filter expression combining field filters with operators
///
/// No parentheses; evaluation is strictly left-to-right.
/// - Same-field filters are OR'd together: lang:rust lang:go → (rust OR go)
/// - Cross-field filters are AND'd together: lang:rust role:user → (rust AND user)
/// - Explicit operators override defaults
///
/// `operators.len()` is always `filters.len() - 1` for a non-empty expression.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterExpr {
    pub filters: Vec<FieldFilter>,
    pub operators: Vec<FilterOperator>,
}

impl FilterExpr {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_filter(&mut self, filter: FieldFilter) {
        self.filters.push(filter);
    }

    pub fn add_operator(&mut self, operator: FilterOperator) {
        self.operators.push(operator);
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_expr_empty() {
        let expr = FilterExpr::new();
        assert!(expr.is_empty());
        assert!(expr.operators.is_empty());
    }

    #[test]
    fn test_filter_expr_with_operators() {
        let mut expr = FilterExpr::new();
        expr.add_filter(FieldFilter::new(FilterField::Lang, "rust"));
        expr.add_operator(FilterOperator::And);
        expr.add_filter(FieldFilter::new(FilterField::Role, "user"));

        assert!(!expr.is_empty());
        assert_eq!(expr.filters.len(), 2);
        assert_eq!(expr.operators, vec![FilterOperator::And]);
    }

    #[test]
    fn test_field_display() {
        assert_eq!(FilterField::Lang.to_string(), "lang");
        assert_eq!(FilterField::Since.to_string(), "since");
    }
}
