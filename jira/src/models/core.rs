use std::fmt::{self, Formatter};

use serde::{Deserialize, Serialize};

/// Represents a Jira issue key like for instance `PROJ-123`.
///
/// Surrounding whitespace is trimmed, nothing else is normalised. Time
/// entries may reference keys that only exist on the tracker.
#[derive(Debug, Serialize, Deserialize, Default, Eq, PartialEq, Ord, PartialOrd, Hash, Clone)]
#[serde(transparent)]
pub struct IssueKey(String);

impl IssueKey {
    #[must_use]
    pub fn new(value: &str) -> Self {
        IssueKey(value.trim().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for IssueKey {
    fn from(s: String) -> Self {
        IssueKey::new(&s)
    }
}

impl From<&str> for IssueKey {
    fn from(value: &str) -> Self {
        IssueKey::new(value)
    }
}

impl fmt::Display for IssueKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}
