/// This module represents the main uses cases for timesheet reconciliation
/// with a submodule foreach one of them.
pub mod check;
pub mod diff;
pub mod show;
pub mod sync;
