//! Patterns for matching tool, command, layer and attribute ids.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Pattern for matching ids.
///
/// Written as a plain string: `*` matches anything, a trailing `*` matches
/// by prefix (`layer.roads*`), anything else must match exactly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum IdPattern {
    /// Exact match.
    Exact(String),
    /// Prefix match.
    Prefix(String),
    /// Any id.
    Any,
}

impl IdPattern {
    /// Parse a pattern.
    pub fn new(pattern: impl AsRef<str>) -> Self {
        let pattern = pattern.as_ref();
        if pattern == "*" {
            IdPattern::Any
        } else if let Some(prefix) = pattern.strip_suffix('*') {
            IdPattern::Prefix(prefix.to_string())
        } else {
            IdPattern::Exact(pattern.to_string())
        }
    }

    /// Check if an id matches this pattern.
    pub fn matches(&self, id: &str) -> bool {
        match self {
            IdPattern::Exact(pattern) => pattern == id,
            IdPattern::Prefix(prefix) => id.starts_with(prefix.as_str()),
            IdPattern::Any => true,
        }
    }
}

/// Check if any pattern in the list matches the id.
pub fn any_matches(patterns: &[IdPattern], id: &str) -> bool {
    patterns.iter().any(|p| p.matches(id))
}

impl From<String> for IdPattern {
    fn from(pattern: String) -> Self {
        Self::new(pattern)
    }
}

impl From<&str> for IdPattern {
    fn from(pattern: &str) -> Self {
        Self::new(pattern)
    }
}

impl From<IdPattern> for String {
    fn from(pattern: IdPattern) -> Self {
        pattern.to_string()
    }
}

impl fmt::Display for IdPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdPattern::Exact(id) => write!(f, "{}", id),
            IdPattern::Prefix(prefix) => write!(f, "{}*", prefix),
            IdPattern::Any => write!(f, "*"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_pattern_exact() {
        let pattern = IdPattern::new("roads");
        assert!(pattern.matches("roads"));
        assert!(!pattern.matches("roads_osm"));
    }

    #[test]
    fn test_id_pattern_prefix() {
        let pattern = IdPattern::new("roads*");
        assert_eq!(pattern, IdPattern::Prefix("roads".to_string()));
        assert!(pattern.matches("roads"));
        assert!(pattern.matches("roads_osm"));
        assert!(!pattern.matches("rivers"));
    }

    #[test]
    fn test_id_pattern_any() {
        let pattern = IdPattern::new("*");
        assert!(pattern.matches("anything"));
        assert!(pattern.matches(""));
    }

    #[test]
    fn test_id_pattern_serde_as_string() {
        let patterns: Vec<IdPattern> = serde_json::from_str(r#"["*", "roads*", "rivers"]"#).unwrap();
        assert_eq!(
            patterns,
            vec![
                IdPattern::Any,
                IdPattern::Prefix("roads".to_string()),
                IdPattern::Exact("rivers".to_string()),
            ]
        );
        assert_eq!(
            serde_json::to_string(&patterns).unwrap(),
            r#"["*","roads*","rivers"]"#
        );
    }
}
