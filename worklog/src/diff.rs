//! Compares two sets of time entries day by day.
use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::types::{DaySet, TimeEntry};

/// The changes on a single day between the wanted and the existing entries
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DayDiff {
    /// Wanted, but without a match among the existing entries
    pub added: Vec<TimeEntry>,
    /// Existing, but without a match among the wanted entries
    pub removed: Vec<TimeEntry>,
}

impl DayDiff {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Differences for every compared day, in date order
pub type TimesheetDiff = BTreeMap<NaiveDate, DayDiff>;

/// Computes the changeset turning `existing` into `wanted`.
///
/// Typically `wanted` is read from a work log file and `existing` is
/// fetched from the timesheet. Every day found in either set is compared,
/// a day absent from one side counts as a day without entries. Days without
/// changes are kept, see [`DayDiff::is_empty`]. Entries are matched on hours,
/// issue, activity and comment; see [`TimeEntry::matches`].
#[must_use]
pub fn diff(wanted: &DaySet, existing: &DaySet) -> TimesheetDiff {
    let none = Vec::new();
    let mut result = TimesheetDiff::new();

    for date in wanted.keys().chain(existing.keys()) {
        if result.contains_key(date) {
            continue;
        }
        let wanted_today = wanted.get(date).unwrap_or(&none);
        let existing_today = existing.get(date).unwrap_or(&none);
        result.insert(
            *date,
            DayDiff {
                added: missing_from(existing_today, wanted_today),
                removed: missing_from(wanted_today, existing_today),
            },
        );
    }
    result
}

/// Entries of `candidates` without a match in `reference`, in their original order
fn missing_from(reference: &[TimeEntry], candidates: &[TimeEntry]) -> Vec<TimeEntry> {
    candidates
        .iter()
        .filter(|entry| !reference.iter().any(|other| other.matches(entry)))
        .cloned()
        .collect()
}

/// Is there nothing to change on any day?
#[must_use]
pub fn is_unchanged(diff: &TimesheetDiff) -> bool {
    diff.values().all(DayDiff::is_empty)
}

/// Total number of entries to add and to remove
#[must_use]
pub fn change_count(diff: &TimesheetDiff) -> (usize, usize) {
    diff.values()
        .fold((0, 0), |(added, removed), day| {
            (added + day.added.len(), removed + day.removed.len())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{entry, group_by_day};

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn identical_sets_have_no_differences() {
        let a = group_by_day(vec![
            entry("2024-01-15", 1.5, "OPS-1", "Design", "ops"),
            entry("2024-01-16", 2.0, "PROJ-7", "Requirements", "PROJ-7 - draft"),
        ]);
        let d = diff(&a, &a);
        assert_eq!(d.len(), 2);
        assert!(d.values().all(DayDiff::is_empty));
        assert!(is_unchanged(&d));
    }

    #[test]
    fn entry_only_in_wanted_set_is_added() {
        let x = entry("2024-01-15", 1.0, "OPS-1", "Design", "ops");
        let mut a = DaySet::new();
        a.insert(date("2024-01-15"), vec![x.clone()]);
        let mut b = DaySet::new();
        b.insert(date("2024-01-15"), vec![]);

        let d = diff(&a, &b);
        assert_eq!(d.len(), 1);
        assert_eq!(d[&date("2024-01-15")].added, vec![x.clone()]);
        assert!(d[&date("2024-01-15")].removed.is_empty());

        let reverse = diff(&b, &a);
        assert_eq!(reverse[&date("2024-01-15")].removed, vec![x]);
    }

    #[test]
    fn days_missing_on_one_side_are_compared_as_empty() {
        let existing = group_by_day(vec![entry("2024-01-15", 1.0, "OPS-1", "Design", "ops")]);
        let wanted = group_by_day(vec![entry("2024-01-17", 1.0, "OPS-1", "Design", "ops")]);

        let d = diff(&wanted, &existing);
        assert_eq!(d.keys().copied().collect::<Vec<_>>(), vec![date("2024-01-15"), date("2024-01-17")]);
        assert_eq!(d[&date("2024-01-15")].removed.len(), 1);
        assert_eq!(d[&date("2024-01-17")].added.len(), 1);
        assert_eq!(change_count(&d), (1, 1));
    }

    #[test]
    fn changed_comment_is_a_removal_plus_an_addition() {
        let mut server = entry("2024-01-15", 1.0, "OPS-1", "Design", "ops - old");
        server.id = Some(11);
        let existing = group_by_day(vec![server.clone()]);
        let wanted = group_by_day(vec![entry("2024-01-15", 1.0, "OPS-1", "Design", "ops - new")]);

        let day = &diff(&wanted, &existing)[&date("2024-01-15")];
        assert_eq!(day.removed, vec![server]);
        assert_eq!(day.added[0].comment, "ops - new");
    }

    #[test]
    fn server_precision_does_not_cause_spurious_changes() {
        let mut server = entry("2024-01-15", 1200.0 / 3600.0, "OPS-1", "Design", "ops");
        server.id = Some(3);
        let existing = group_by_day(vec![server]);
        let wanted = group_by_day(vec![entry("2024-01-15", 1.0 / 3.0, "OPS-1", "Design", "ops")]);
        assert!(is_unchanged(&diff(&wanted, &existing)));
    }

    #[test]
    fn unchanged_entries_are_left_alone_among_changes() {
        let keep = entry("2024-01-15", 1.0, "OPS-1", "Design", "ops");
        let existing = group_by_day(vec![keep.clone(), entry("2024-01-15", 2.0, "A-1", "Design", "a")]);
        let wanted = group_by_day(vec![keep, entry("2024-01-15", 3.0, "B-1", "Design", "b")]);

        let day = &diff(&wanted, &existing)[&date("2024-01-15")];
        assert_eq!(day.removed.len(), 1);
        assert_eq!(day.removed[0].issue.as_str(), "A-1");
        assert_eq!(day.added.len(), 1);
        assert_eq!(day.added[0].issue.as_str(), "B-1");
    }
}
