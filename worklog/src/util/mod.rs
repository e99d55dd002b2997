//! Small helpers for shell scripting chores around the timesheet.
pub mod digest;
pub mod json;
pub mod net;
pub mod profile;
pub mod shell;
