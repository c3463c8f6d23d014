//! Directory path pattern matching for skip/separate decisions.

use regex::{Regex, RegexBuilder};

use crate::error::ListError;

/// An ordered set of compiled case-insensitive regexes.
///
/// Matching is any-of: a path matches the set if at least one pattern
/// matches it. Patterns are tested against the full path string as produced
/// by the directory lister, not just the leaf name.
#[derive(Debug, Default)]
pub struct PatternSet {
    patterns: Vec<Regex>,
}

impl PatternSet {
    /// Compile a set of raw pattern strings. `None` compiles to an empty
    /// set that matches nothing. The first pattern that fails to compile
    /// aborts construction.
    pub fn compile(raw: Option<&[String]>) -> Result<Self, ListError> {
        let mut patterns = Vec::new();
        for pattern in raw.unwrap_or_default() {
            let regex = RegexBuilder::new(pattern)
                .case_insensitive(true)
                .build()
                .map_err(|e| ListError::Pattern {
                    pattern: pattern.clone(),
                    source: e,
                })?;
            patterns.push(regex);
        }
        Ok(Self { patterns })
    }

    pub fn matches(&self, path: &str) -> bool {
        self.patterns.iter().any(|p| p.is_match(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(patterns: &[&str]) -> PatternSet {
        let raw: Vec<String> = patterns.iter().map(|s| s.to_string()).collect();
        PatternSet::compile(Some(&raw)).unwrap()
    }

    #[test]
    fn test_empty_set_matches_nothing() {
        let empty = PatternSet::compile(None).unwrap();
        assert!(!empty.matches("/any/path"));
        assert!(!empty.matches(""));
    }

    #[test]
    fn test_any_pattern_matches() {
        let patterns = set(&["\\.git$", "node_modules"]);
        assert!(patterns.matches("/repo/.git"));
        assert!(patterns.matches("/repo/node_modules"));
        assert!(patterns.matches("/repo/sub/node_modules/pkg"));
        assert!(!patterns.matches("/repo/src"));
    }

    #[test]
    fn test_case_insensitive() {
        let patterns = set(&["temp$"]);
        assert!(patterns.matches("/data/Temp"));
        assert!(patterns.matches("/data/TEMP"));
    }

    #[test]
    fn test_matches_full_path_not_leaf() {
        let patterns = set(&["^/var/cache"]);
        assert!(patterns.matches("/var/cache/apt"));
        assert!(!patterns.matches("/home/user/cache"));
    }

    #[test]
    fn test_invalid_pattern_is_error() {
        let raw = vec!["[unclosed".to_string()];
        let err = PatternSet::compile(Some(&raw)).unwrap_err();
        assert!(matches!(err, ListError::Pattern { .. }));
    }
}
