//! Plain text rendering of operation results.
use std::collections::BTreeMap;
use std::fmt::Write;

use chrono::{Datelike, Days, NaiveDate};
use jira::models::core::IssueKey;
use log::debug;
use worklog::{
    config::Tables,
    date::{self, seconds_to_hour_and_min},
    diff::{change_count, TimesheetDiff},
    operation::sync::SyncReport,
    types::{total_hours, DaySet, TimeEntry},
};

pub fn print_days(tables: &Tables, days: &DaySet) {
    print!("{}", format_days(tables, days));
}

pub fn print_diff(tables: &Tables, changes: &TimesheetDiff) {
    print!("{}", format_diff(tables, changes));
}

pub fn print_sync_report(tables: &Tables, report: &SyncReport) {
    print!("{}", format_sync_report(tables, report));
}

pub fn print_weekly_table(days: &DaySet) {
    print!("{}", format_weekly_table(days));
}

fn format_entry(tables: &Tables, entry: &TimeEntry) -> String {
    let mut line = format!(
        "{:6.2}h {:12} {:24} {}",
        entry.hours,
        entry.issue.as_str(),
        tables.activities.display(&entry.activity),
        entry.comment
    );
    if let Some(id) = entry.id {
        let _ = write!(line, " [{id}]");
    }
    line
}

fn format_days(tables: &Tables, days: &DaySet) -> String {
    let mut out = String::new();
    for (date, entries) in days {
        let _ = writeln!(out, "{date} {:>6.2}h", total_hours(entries));
        for entry in entries {
            let _ = writeln!(out, "  {}", format_entry(tables, entry));
        }
    }
    if days.is_empty() {
        out.push_str("No entries\n");
    }
    out
}

fn format_diff(tables: &Tables, changes: &TimesheetDiff) -> String {
    let mut out = String::new();
    for (date, day) in changes {
        if day.is_empty() {
            continue;
        }
        let _ = writeln!(out, "{date}");
        for entry in &day.removed {
            let _ = writeln!(out, "- {}", format_entry(tables, entry));
        }
        for entry in &day.added {
            let _ = writeln!(out, "+ {}", format_entry(tables, entry));
        }
    }
    let (added, removed) = change_count(changes);
    if added + removed == 0 {
        out.push_str("No differences\n");
    } else {
        let _ = writeln!(out, "{added} to add, {removed} to remove");
    }
    out
}

fn format_sync_report(tables: &Tables, report: &SyncReport) -> String {
    let mut out = String::new();
    let (deleted, created) = if report.dry_run {
        ("Would delete", "Would create")
    } else {
        ("Deleted", "Created")
    };
    for entry in &report.deleted {
        let _ = writeln!(out, "{deleted} {} {}", entry.date, format_entry(tables, entry));
    }
    for entry in &report.created {
        let _ = writeln!(out, "{created} {} {}", entry.date, format_entry(tables, entry));
    }
    if report.is_empty() {
        out.push_str("Timesheet already up to date\n");
    }
    out
}

/// One table per week with the time spent per issue and weekday
fn format_weekly_table(days: &DaySet) -> String {
    let mut out = String::new();
    let (Some(first), Some(last)) = (days.keys().next(), days.keys().next_back()) else {
        out.push_str("No entries\n");
        return out;
    };

    let mut daily_totals_by_issue: BTreeMap<&IssueKey, BTreeMap<NaiveDate, i64>> = BTreeMap::new();
    for entry in days.values().flatten() {
        *daily_totals_by_issue
            .entry(&entry.issue)
            .or_default()
            .entry(entry.date)
            .or_default() += entry.seconds();
    }

    let mut monday = date::first_date_in_week_for(*first);
    while monday <= *last {
        let sunday = monday + Days::new(6);
        let _ = writeln!(
            out,
            "CW {} from {} to {}",
            monday.iso_week().week(),
            monday.format("%Y-%m-%d"),
            sunday.format("%Y-%m-%d")
        );
        let _ = writeln!(
            out,
            "{:15} {:>5} {:>5} {:>5} {:>5} {:>5} {:>5} {:>5} {:>5}",
            "Issue", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun", "Total"
        );
        out.push_str(&dashed_line('-'));

        let mut week_totals = [0_i64; 7];
        for (key, daily_totals) in &daily_totals_by_issue {
            let row: Vec<i64> = monday
                .iter_days()
                .take(7)
                .map(|day| daily_totals.get(&day).copied().unwrap_or(0))
                .collect();
            if row.iter().all(|seconds| *seconds == 0) {
                continue;
            }
            for (total, seconds) in week_totals.iter_mut().zip(&row) {
                *total += seconds;
            }
            out.push_str(&table_row(key.as_str(), &row));
        }

        out.push_str(&dashed_line('-'));
        out.push_str(&table_row("Week total", &week_totals));
        out.push_str(&dashed_line('='));
        out.push('\n');
        monday = monday + Days::new(7);
    }
    debug!("Weekly table done");
    out
}

fn table_row(label: &str, seconds_per_day: &[i64]) -> String {
    let mut row = format!("{label:15}");
    for seconds in seconds_per_day {
        let cell = if *seconds == 0 {
            "-".to_string()
        } else {
            seconds_to_hour_and_min(*seconds)
        };
        let _ = write!(row, " {cell:^5}");
    }
    let _ = writeln!(row, " {:^5}", seconds_to_hour_and_min(seconds_per_day.iter().sum()));
    row
}

fn dashed_line(c: char) -> String {
    let dashes = c.to_string().repeat(5);
    let mut line = c.to_string().repeat(15);
    for _ in 0..8 {
        line.push(' ');
        line.push_str(&dashes);
    }
    line.push('\n');
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use worklog::activity::ActivityCodeMap;
    use worklog::diff::diff;
    use worklog::types::group_by_day;

    fn tables() -> Tables {
        let activities: BTreeMap<String, String> = [("Development", "Design"), ("Design", "Requirements")]
            .into_iter()
            .map(|(l, c)| (l.to_string(), c.to_string()))
            .collect();
        Tables {
            activities: ActivityCodeMap::new(activities).unwrap(),
            ..Tables::default()
        }
    }

    fn entry(date: &str, hours: f64, issue: &str, comment: &str) -> TimeEntry {
        TimeEntry {
            date: date.parse().unwrap(),
            hours,
            issue: IssueKey::from(issue),
            activity: "Design".to_string(),
            comment: comment.to_string(),
            id: None,
            issue_summary: None,
        }
    }

    #[test]
    fn activities_are_shown_by_label() {
        let mut e = entry("2024-01-15", 1.5, "OPS-1", "ops - deploy");
        e.id = Some(7);
        let days = group_by_day(vec![e]);

        let text = format_days(&tables(), &days);

        assert!(text.starts_with("2024-01-15   1.50h\n"));
        assert!(text.contains("Development"));
        assert!(text.contains("ops - deploy [7]"));
    }

    #[test]
    fn diff_lists_removals_then_additions() {
        let wanted = group_by_day(vec![entry("2024-01-15", 2.0, "A-1", "new")]);
        let existing = group_by_day(vec![entry("2024-01-15", 1.0, "A-1", "old")]);

        let text = format_diff(&tables(), &diff(&wanted, &existing));

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "2024-01-15");
        assert!(lines[1].starts_with("- "));
        assert!(lines[2].starts_with("+ "));
        assert_eq!(lines[3], "1 to add, 1 to remove");
    }

    #[test]
    fn empty_diff_says_so() {
        let days = group_by_day(vec![entry("2024-01-15", 2.0, "A-1", "same")]);
        assert_eq!(format_diff(&tables(), &diff(&days, &days)), "No differences\n");
    }

    #[test]
    fn dry_run_report_uses_conditional_wording() {
        let report = SyncReport {
            created: vec![entry("2024-01-15", 2.0, "A-1", "c")],
            deleted: vec![],
            dry_run: true,
        };
        assert!(format_sync_report(&tables(), &report).starts_with("Would create 2024-01-15"));
    }

    #[test]
    fn weekly_table_sums_per_issue_and_day() {
        let days = group_by_day(vec![
            entry("2024-01-15", 1.5, "OPS-1", "a"),
            entry("2024-01-15", 0.5, "OPS-1", "b"),
            entry("2024-01-17", 1.0, "PROJ-7", "c"),
            entry("2024-01-22", 7.5, "PROJ-7", "d"),
        ]);

        let table = format_weekly_table(&days);

        assert!(table.contains("CW 3 from 2024-01-15 to 2024-01-21"));
        assert!(table.contains("CW 4 from 2024-01-22 to 2024-01-28"));
        let ops_row = table.lines().find(|l| l.starts_with("OPS-1")).unwrap();
        assert!(ops_row.contains("02:00"));
        let week_total = table.lines().find(|l| l.starts_with("Week total")).unwrap();
        assert!(week_total.ends_with("03:00"));
    }

    #[test]
    fn empty_weekly_table() {
        assert_eq!(format_weekly_table(&DaySet::new()), "No entries\n");
    }
}
