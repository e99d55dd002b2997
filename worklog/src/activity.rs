//! Translation between activity labels and the codes used by the timesheet backend.
use std::collections::BTreeMap;

use crate::error::WorklogError;

/// Bidirectional map between an activity label (e.g. "Development") and the
/// internal activity code stored on Tempo worklogs.
///
/// The label-to-code table is the only source of truth. The reverse lookup is
/// generated from it when the map is built and is never edited on its own.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActivityCodeMap {
    codes: BTreeMap<String, String>,
    labels: BTreeMap<String, String>,
}

impl ActivityCodeMap {
    /// Builds the map from the canonical label -> code table
    ///
    /// # Errors
    /// `WorklogError::InvalidConfig` if two labels share one code, since the
    /// reverse direction would then be ambiguous
    pub fn new(table: BTreeMap<String, String>) -> Result<Self, WorklogError> {
        let mut labels = BTreeMap::new();
        for (label, code) in &table {
            if let Some(previous) = labels.insert(code.clone(), label.clone()) {
                return Err(WorklogError::InvalidConfig {
                    file: crate::config::ACTIVITY_MAP.to_string(),
                    reason: format!("activities '{previous}' and '{label}' share the code '{code}'"),
                });
            }
        }
        Ok(ActivityCodeMap {
            codes: table,
            labels,
        })
    }

    #[must_use]
    pub fn code(&self, label: &str) -> Option<&str> {
        self.codes.get(label).map(String::as_str)
    }

    #[must_use]
    pub fn label(&self, code: &str) -> Option<&str> {
        self.labels.get(code).map(String::as_str)
    }

    /// Like [`ActivityCodeMap::code`], failing for unknown labels
    ///
    /// # Errors
    /// `WorklogError::UnknownActivity` naming the label
    pub fn encode(&self, label: &str) -> Result<&str, WorklogError> {
        self.code(label)
            .ok_or_else(|| WorklogError::UnknownActivity(label.to_string()))
    }

    /// The label of a code, or the code itself when it is not in the table
    #[must_use]
    pub fn display<'a>(&'a self, code: &'a str) -> &'a str {
        self.label(code).unwrap_or(code)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}
