//! Turns a hand-edited work log file into time entries.
//!
//! The file is YAML, mapping ISO dates to lists of lines:
//!
//! ```yaml
//! 2024-01-15:
//!   - 1.5 ops deploy of release 7
//!   - 2 PROJ-7 implement the parser
//!   # - 1 mtg not yet
//! 2024-01-16:
//! ```
//!
//! Every line reads `<hours> <work item or issue key> [comment]`.
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use jira::models::core::IssueKey;
use lazy_static::lazy_static;
use log::debug;
use regex::Regex;

use crate::config::Tables;
use crate::error::WorklogError;
use crate::types::{DaySet, TimeEntry};

lazy_static! {
    static ref ISSUE_KEY_EXPR: Regex = Regex::new(r"^[A-Z0-9]+-[0-9]+$").unwrap();
}

/// Does `token` look like an issue key, i.e. `PROJ-123`?
#[must_use]
pub fn is_issue_key(token: &str) -> bool {
    ISSUE_KEY_EXPR.is_match(token)
}

/// Blank lines and lines starting with `#` carry no entry
#[must_use]
pub fn is_skipped(line: &str) -> bool {
    let line = line.trim();
    line.is_empty() || line.starts_with('#')
}

/// Parses a single work log line for `date`.
///
/// The issue and activity are resolved like this:
/// 1. A known work item alias supplies the issue, and the activity when the
///    alias has one.
/// 2. Otherwise the token must be an issue key, which is used as is.
/// 3. Any activity still missing is derived from the comment, which is then
///    mandatory.
///
/// The stored comment is the work item token, followed by ` - <comment>`
/// when a comment was given.
///
/// # Errors
/// A parse error describing what is wrong with the line
pub fn parse_line(tables: &Tables, date: NaiveDate, line: &str) -> Result<TimeEntry, WorklogError> {
    let (hours, work_item, comment) = split_line(line)?;
    let hours = parse_hours(hours)?;

    let (issue, activity) = match tables.work_items.get(work_item) {
        Some(mapping) => {
            let activity = match &mapping.activity {
                Some(activity) => activity.clone(),
                None => activity_from_comment(tables, work_item, comment)?,
            };
            (mapping.issue.clone(), activity)
        }
        None if is_issue_key(work_item) => (
            work_item.to_string(),
            activity_from_comment(tables, work_item, comment)?,
        ),
        None => {
            return Err(WorklogError::UnknownWorkItem {
                work_item: work_item.to_string(),
                hint: tables.work_item_hint(),
            })
        }
    };

    let code = tables.activities.encode(&activity)?;
    let comment = match comment {
        Some(text) => format!("{work_item} - {text}"),
        None => work_item.to_string(),
    };

    Ok(TimeEntry {
        date,
        hours,
        activity: code.to_string(),
        comment,
        id: None,
        issue_summary: tables.issue_summaries.get(&issue).cloned(),
        issue: IssueKey::from(issue),
    })
}

/// Splits into hours, work item and an optional non-empty comment
fn split_line(line: &str) -> Result<(&str, &str, Option<&str>), WorklogError> {
    let line = line.trim();
    let (hours, rest) = line
        .split_once(char::is_whitespace)
        .ok_or_else(|| WorklogError::MalformedLine(line.to_string()))?;

    let rest = rest.trim_start();
    let (work_item, comment) = match rest.split_once(char::is_whitespace) {
        Some((work_item, comment)) => (work_item, Some(comment.trim())),
        None => (rest, None),
    };
    Ok((hours, work_item, comment.filter(|c| !c.is_empty())))
}

fn parse_hours(token: &str) -> Result<f64, WorklogError> {
    match token.parse::<f64>() {
        Ok(hours) if hours.is_finite() && hours > 0.0 => Ok(hours),
        _ => Err(WorklogError::InvalidHours(token.to_string())),
    }
}

fn activity_from_comment(
    tables: &Tables,
    work_item: &str,
    comment: Option<&str>,
) -> Result<String, WorklogError> {
    let comment = comment.ok_or_else(|| WorklogError::MissingComment {
        work_item: work_item.to_string(),
    })?;
    tables
        .rules
        .resolve(comment)
        .map(str::to_string)
        .ok_or_else(|| WorklogError::UnresolvedActivity {
            work_item: work_item.to_string(),
            comment: comment.to_string(),
        })
}

/// Parses the lines listed for one day. Skipped lines are ignored, and
/// errors are tagged with the date and the offending line.
///
/// # Errors
/// The first line which fails to parse
pub fn parse_day<S: AsRef<str>>(
    tables: &Tables,
    date: NaiveDate,
    lines: &[Option<S>],
) -> Result<Vec<TimeEntry>, WorklogError> {
    lines
        .iter()
        .flatten()
        .map(|line| line.as_ref())
        .filter(|line| !is_skipped(line))
        .map(|line| {
            parse_line(tables, date, line).map_err(|source| WorklogError::Entry {
                date,
                line: line.trim().to_string(),
                source: Box::new(source),
            })
        })
        .collect()
}

type RawWorklog = BTreeMap<NaiveDate, Option<Vec<Option<String>>>>;

/// Parses the YAML text of a work log. `origin` names the source in errors.
///
/// Every listed day is present in the result, even when it has no entries.
///
/// # Errors
/// If the text is not a map of dates to lists of lines, or a line fails to parse
pub fn parse_worklog_str(tables: &Tables, origin: &str, text: &str) -> Result<DaySet, WorklogError> {
    if text.trim().is_empty() {
        return Ok(DaySet::new());
    }
    let raw: Option<RawWorklog> =
        serde_yaml::from_str(text).map_err(|source| WorklogError::WorklogFormat {
            origin: origin.to_string(),
            source,
        })?;

    let mut days = DaySet::new();
    for (date, lines) in raw.unwrap_or_default() {
        let entries = parse_day(tables, date, lines.as_deref().unwrap_or_default())?;
        debug!("{}: {} entries", date, entries.len());
        days.insert(date, entries);
    }
    Ok(days)
}

/// Reads and parses a work log file
///
/// # Errors
/// If the file cannot be read or fails to parse
pub fn parse_worklog_file(tables: &Tables, path: &Path) -> Result<DaySet, WorklogError> {
    let text = fs::read_to_string(path).map_err(|source| WorklogError::WorklogFileRead {
        path: path.into(),
        source,
    })?;
    parse_worklog_str(tables, &path.to_string_lossy(), &text)
}
