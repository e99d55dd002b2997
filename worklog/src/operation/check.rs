use std::path::PathBuf;

use log::info;

use crate::error::WorklogError;
use crate::parser::parse_worklog_file;
use crate::types::DaySet;
use crate::ApplicationRuntime;

/// Parses a work log file without contacting the timesheet
pub struct Check {
    pub file: PathBuf,
}

/// # Errors
/// If the file cannot be read or one of its lines fails to parse
pub fn execute(runtime: &ApplicationRuntime, check: &Check) -> Result<DaySet, WorklogError> {
    let days = parse_worklog_file(runtime.tables(), &check.file)?;
    info!(
        "{}: {} days, {} entries",
        check.file.display(),
        days.len(),
        days.values().map(Vec::len).sum::<usize>()
    );
    Ok(days)
}
