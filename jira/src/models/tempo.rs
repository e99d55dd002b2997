//! Payloads of the Tempo timesheets API (version 4)
use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::JiraError;

/// Work attribute holding the activity code of a worklog
pub const ACTIVITY_ATTRIBUTE: &str = "_ActivityType_";

#[derive(Debug, Serialize)]
pub struct TempoSearch {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub worker: Vec<String>,
}

/// A worklog as returned by `worklogs/search`
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TempoWorklog {
    pub tempo_worklog_id: u64,
    pub time_spent_seconds: u64,
    #[serde(default)]
    pub comment: Option<String>,
    /// Like `2024-01-15 00:00:00.000`
    pub started: String,
    pub issue: TempoIssue,
    #[serde(default)]
    pub attributes: BTreeMap<String, TempoAttribute>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TempoIssue {
    pub key: String,
    #[serde(default)]
    pub summary: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TempoAttribute {
    #[serde(default)]
    pub name: Option<String>,
    pub value: String,
}

impl TempoWorklog {
    #[must_use]
    pub fn activity_code(&self) -> Option<&str> {
        self.attributes
            .get(ACTIVITY_ATTRIBUTE)
            .map(|attr| attr.value.as_str())
    }

    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn hours(&self) -> f64 {
        self.time_spent_seconds as f64 / 3600.0
    }

    /// The calendar day the worklog was started on
    ///
    /// # Errors
    /// If `started` does not begin with an ISO 8601 date
    pub fn started_date(&self) -> Result<NaiveDate, JiraError> {
        self.started
            .get(..10)
            .and_then(|day| NaiveDate::parse_from_str(day, "%Y-%m-%d").ok())
            .ok_or_else(|| {
                JiraError::UnexpectedResponse(format!(
                    "worklog {} has an unreadable start date '{}'",
                    self.tempo_worklog_id, self.started
                ))
            })
    }
}

/// Body of `POST worklogs`
#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TempoWorklogInsert {
    pub attributes: BTreeMap<String, String>,
    pub billable_seconds: u64,
    pub end_date: NaiveDate,
    pub origin_task_id: String,
    pub started: NaiveDate,
    pub time_spent_seconds: u64,
    pub worker: String,
    pub comment: String,
}

impl TempoWorklogInsert {
    /// Work registered on a single day. Hours are rounded to whole seconds.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    #[must_use]
    pub fn new(
        worker: &str,
        date: NaiveDate,
        issue: &str,
        hours: f64,
        activity_code: &str,
        comment: &str,
    ) -> Self {
        let seconds = (hours * 3600.0).round() as u64;
        let mut attributes = BTreeMap::new();
        attributes.insert(ACTIVITY_ATTRIBUTE.to_string(), activity_code.to_string());
        TempoWorklogInsert {
            attributes,
            billable_seconds: seconds,
            end_date: date,
            origin_task_id: issue.to_string(),
            started: date,
            time_spent_seconds: seconds,
            worker: worker.to_string(),
            comment: comment.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedTempoWorklog {
    pub tempo_worklog_id: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unreadable_start_date_is_an_error() {
        let wl = TempoWorklog {
            tempo_worklog_id: 3,
            time_spent_seconds: 60,
            comment: None,
            started: "yesterday".to_string(),
            issue: TempoIssue {
                key: "A-1".to_string(),
                summary: None,
            },
            attributes: BTreeMap::new(),
        };
        assert!(wl.started_date().is_err());
        assert_eq!(wl.activity_code(), None);
    }

    #[test]
    fn insert_rounds_to_whole_seconds() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let insert = TempoWorklogInsert::new("w", day, "A-1", 1.0 / 3.0, "Design", "c");
        assert_eq!(insert.time_spent_seconds, 1200);
        assert_eq!(insert.billable_seconds, insert.time_spent_seconds);
        assert_eq!(insert.attributes[ACTIVITY_ATTRIBUTE], "Design");
    }
}
