use std::path::PathBuf;

use log::{debug, info};

use crate::diff::{change_count, diff, TimesheetDiff};
use crate::error::WorklogError;
use crate::parser::parse_worklog_file;
use crate::types::{from_to_dates, DaySet};
use crate::ApplicationRuntime;

/// Compares a work log file with the timesheet of `worker`
pub struct Diff {
    pub file: PathBuf,
    pub worker: String,
}

/// # Errors
/// If the file fails to parse, holds no days, or the timesheet cannot be read
pub fn execute(runtime: &ApplicationRuntime, instructions: &Diff) -> Result<TimesheetDiff, WorklogError> {
    let wanted = parse_worklog_file(runtime.tables(), &instructions.file)?;
    let existing = fetch_covering(runtime, &instructions.worker, &wanted)?;
    let changes = diff(&wanted, &existing);

    let (added, removed) = change_count(&changes);
    info!("{added} entries to add, {removed} to remove");
    Ok(changes)
}

/// Fetches the timesheet of `worker` for the date range spanned by `days`
pub(crate) fn fetch_covering(
    runtime: &ApplicationRuntime,
    worker: &str,
    days: &DaySet,
) -> Result<DaySet, WorklogError> {
    let (from, to) = from_to_dates(days)?;
    debug!("Fetching timesheet of {worker} from {from} to {to}");
    let existing = runtime.client()?.fetch_time_entries(worker, from, to)?;
    Ok(existing)
}
