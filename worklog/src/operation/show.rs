use chrono::NaiveDate;
use log::info;

use crate::error::WorklogError;
use crate::types::DaySet;
use crate::ApplicationRuntime;

/// Lists the timesheet entries of `worker` between two dates, both inclusive
pub struct Show {
    pub worker: String,
    pub from: NaiveDate,
    pub to: NaiveDate,
}

/// # Errors
/// If the dates are reversed or the timesheet cannot be read
pub fn execute(runtime: &ApplicationRuntime, show: &Show) -> Result<DaySet, WorklogError> {
    if show.from > show.to {
        return Err(WorklogError::BadInput(format!(
            "Start date {} is after end date {}",
            show.from, show.to
        )));
    }
    let days = runtime
        .client()?
        .fetch_time_entries(&show.worker, show.from, show.to)?;
    info!("Found entries on {} days", days.len());
    Ok(days)
}
