use chrono::NaiveDate;
use jira::{models::tempo::TempoWorklogInsert, Jira, JiraError};
use log::debug;

use crate::types::{group_by_day, DaySet, TimeEntry};

/// The timesheet operations needed for reconciliation
pub trait TimesheetClient {
    /// Entries registered by `worker` between `from` and `to`, both inclusive
    fn fetch_time_entries(
        &self,
        worker: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<DaySet, JiraError>;

    /// Registers `entry` for `worker` and returns the id assigned to it
    fn create_time_entry(&self, worker: &str, entry: &TimeEntry) -> Result<u64, JiraError>;

    fn delete_time_entry(&self, id: u64) -> Result<(), JiraError>;
}

// Tempo backs the timesheet of the Jira client
impl TimesheetClient for Jira {
    fn fetch_time_entries(
        &self,
        worker: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<DaySet, JiraError> {
        let worklogs = self.search_worklogs(worker, from, to)?;
        debug!("Fetched {} worklogs for {} from {} to {}", worklogs.len(), worker, from, to);
        let entries = worklogs
            .iter()
            .map(TimeEntry::from_tempo)
            .collect::<Result<Vec<_>, JiraError>>()?;
        Ok(group_by_day(entries))
    }

    fn create_time_entry(&self, worker: &str, entry: &TimeEntry) -> Result<u64, JiraError> {
        let insert = TempoWorklogInsert::new(
            worker,
            entry.date,
            entry.issue.as_str(),
            entry.hours,
            &entry.activity,
            &entry.comment,
        );
        self.create_worklog(&insert)
    }

    fn delete_time_entry(&self, id: u64) -> Result<(), JiraError> {
        self.delete_worklog(id)
    }
}
