use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde_json::Value;

/// Outcome of [`validate_json`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JsonValidity {
    Valid,
    NotFound,
    Invalid(String),
}

impl fmt::Display for JsonValidity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JsonValidity::Valid => write!(f, "valid"),
            JsonValidity::NotFound => write!(f, "not found"),
            JsonValidity::Invalid(reason) => write!(f, "not valid: {reason}"),
        }
    }
}

#[must_use]
pub fn is_json(text: &str) -> bool {
    serde_json::from_str::<Value>(text).is_ok()
}

/// Checks whether the file at `path` holds a single JSON document
#[must_use]
pub fn validate_json(path: &Path) -> JsonValidity {
    match fs::read_to_string(path) {
        Ok(text) => match serde_json::from_str::<Value>(&text) {
            Ok(_) => JsonValidity::Valid,
            Err(e) => JsonValidity::Invalid(e.to_string()),
        },
        Err(e) if e.kind() == ErrorKind::NotFound => JsonValidity::NotFound,
        Err(e) => JsonValidity::Invalid(e.to_string()),
    }
}
