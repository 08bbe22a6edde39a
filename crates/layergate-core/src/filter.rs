//! Feature filters and the filter service interface.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Restriction on the features of a layer which may be selected.
///
/// Expressions are opaque to the engine; they are handed to the feature
/// store which knows how to evaluate them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Filter {
    /// A single filter expression, e.g. `owner = 'bob'`.
    Expression(String),
    /// All filters must match.
    And(Vec<Filter>),
}

impl Filter {
    /// Create a filter from an expression.
    pub fn expression(expression: impl Into<String>) -> Self {
        Filter::Expression(expression.into())
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::Expression(expression) => write!(f, "{}", expression),
            Filter::And(filters) => {
                for (i, filter) in filters.iter().enumerate() {
                    if i > 0 {
                        write!(f, " AND ")?;
                    }
                    write!(f, "({})", filter)?;
                }
                Ok(())
            }
        }
    }
}

/// Filter operations used by the engine.
pub trait FilterService: Send + Sync + fmt::Debug {
    /// Combine two filters so that both must match.
    fn and(&self, left: Filter, right: Filter) -> Filter;
}

/// Filter service building flat conjunctions.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultFilterService;

impl DefaultFilterService {
    /// Create a new filter service.
    pub fn new() -> Self {
        Self
    }
}

impl FilterService for DefaultFilterService {
    fn and(&self, left: Filter, right: Filter) -> Filter {
        let mut filters = Vec::new();
        for filter in [left, right] {
            match filter {
                Filter::And(nested) => filters.extend(nested),
                other => filters.push(other),
            }
        }
        Filter::And(filters)
    }
}
