use std::collections::BTreeMap;

use chrono::NaiveDate;
use jira::models::core::IssueKey;
use jira::models::tempo::TempoWorklog;
use jira::JiraError;
use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::WorklogError;

/// Time entries per calendar day, in the order they were listed
pub type DaySet = BTreeMap<NaiveDate, Vec<TimeEntry>>;

/// A unit of work registered on a single day.
///
/// `activity` holds the backend activity code, not the display label.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct TimeEntry {
    pub date: NaiveDate,
    pub hours: f64,
    pub issue: IssueKey,
    pub activity: String,
    pub comment: String,
    /// Assigned by the timesheet backend, absent for entries read from a file
    pub id: Option<u64>,
    pub issue_summary: Option<String>,
}

impl TimeEntry {
    /// Duration at the one second resolution kept by the backend
    #[allow(clippy::cast_possible_truncation)]
    #[must_use]
    pub fn seconds(&self) -> i64 {
        (self.hours * 3600.0).round() as i64
    }

    /// Two entries describe the same work when hours, issue, activity and
    /// comment agree. Date, id and summary are ignored.
    #[must_use]
    pub fn matches(&self, other: &TimeEntry) -> bool {
        self.seconds() == other.seconds()
            && self.issue == other.issue
            && self.activity == other.activity
            && self.comment == other.comment
    }

    /// Converts a Tempo worklog into a `TimeEntry`.
    ///
    /// # Errors
    /// If the worklog start date cannot be read
    pub fn from_tempo(worklog: &TempoWorklog) -> Result<Self, JiraError> {
        let activity = worklog.activity_code().unwrap_or_else(|| {
            warn!(
                "Worklog {} on {} has no activity attribute",
                worklog.tempo_worklog_id, worklog.issue.key
            );
            ""
        });
        Ok(TimeEntry {
            date: worklog.started_date()?,
            hours: worklog.hours(),
            issue: IssueKey::from(worklog.issue.key.as_str()),
            activity: activity.to_string(),
            comment: worklog.comment.clone().unwrap_or_default(),
            id: Some(worklog.tempo_worklog_id),
            issue_summary: worklog.issue.summary.clone(),
        })
    }
}

/// Entry of the work item alias table, `work.json`
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct WorkItem {
    pub issue: String,
    #[serde(default)]
    pub activity: Option<String>,
}

/// Sum of the hours of `entries`
#[must_use]
pub fn total_hours(entries: &[TimeEntry]) -> f64 {
    entries.iter().map(|e| e.hours).sum()
}

/// Earliest and latest day of `days`
///
/// # Errors
/// `WorklogError::BadInput` if there are no days at all
pub fn from_to_dates(days: &DaySet) -> Result<(NaiveDate, NaiveDate), WorklogError> {
    match (days.keys().next(), days.keys().next_back()) {
        (Some(first), Some(last)) => Ok((*first, *last)),
        _ => Err(WorklogError::BadInput(
            "The worklog contains no dates".to_string(),
        )),
    }
}

/// Groups entries by their date, keeping their relative order
#[must_use]
pub fn group_by_day(entries: impl IntoIterator<Item = TimeEntry>) -> DaySet {
    let mut days = DaySet::new();
    for entry in entries {
        days.entry(entry.date).or_default().push(entry);
    }
    days
}

#[cfg(test)]
pub(crate) fn entry(date: &str, hours: f64, issue: &str, activity: &str, comment: &str) -> TimeEntry {
    TimeEntry {
        date: date.parse().unwrap(),
        hours,
        issue: IssueKey::from(issue),
        activity: activity.to_string(),
        comment: comment.to_string(),
        id: None,
        issue_summary: None,
    }
}
