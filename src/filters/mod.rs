//! Field filters over extracted code snippets (`lang:rust role:assistant since:2024-01-01`).

pub mod apply;
pub mod ast;
pub mod parser;

pub use apply::apply_filters;
pub use ast::{FieldFilter, FilterExpr, FilterField, FilterOperator};
pub use parser::parse_filter;
