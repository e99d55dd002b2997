//! Derives an activity label from the free text of a work log comment.
use regex::Regex;
use serde::Deserialize;

/// Two-tier rules mapping a comment to an activity label.
///
/// 1. `same`: literals which are activity labels themselves. The first literal
///    found anywhere in the comment wins.
/// 2. `patterns`: `(regex, label)` pairs in declaration order. The first
///    pattern matching anywhere in the comment wins.
#[derive(Debug, Clone, Default)]
pub struct CommentActivityRules {
    same: Vec<String>,
    patterns: Vec<(Regex, String)>,
}

/// On-disk form, `{"same": [...], "map": [["regex", "label"], ...]}`.
/// `map` is a list of pairs so that rule order survives loading.
#[derive(Debug, Deserialize, Default)]
pub struct RawRules {
    #[serde(default)]
    pub same: Vec<String>,
    #[serde(default)]
    pub map: Vec<(String, String)>,
}

impl CommentActivityRules {
    /// # Errors
    /// If one of the patterns is not a valid regular expression
    pub fn new(same: Vec<String>, patterns: Vec<(String, String)>) -> Result<Self, regex::Error> {
        let patterns = patterns
            .into_iter()
            .map(|(pattern, label)| Ok((Regex::new(&pattern)?, label)))
            .collect::<Result<Vec<_>, regex::Error>>()?;
        Ok(CommentActivityRules { same, patterns })
    }

    /// # Errors
    /// If one of the patterns is not a valid regular expression
    pub fn from_raw(raw: RawRules) -> Result<Self, regex::Error> {
        CommentActivityRules::new(raw.same, raw.map)
    }

    /// Returns the activity label for `comment`, or `None` when no rule applies
    #[must_use]
    pub fn resolve(&self, comment: &str) -> Option<&str> {
        self.same
            .iter()
            .find(|literal| comment.contains(literal.as_str()))
            .or_else(|| {
                self.patterns
                    .iter()
                    .find(|(pattern, _)| pattern.is_match(comment))
                    .map(|(_, label)| label)
            })
            .map(String::as_str)
    }
}
