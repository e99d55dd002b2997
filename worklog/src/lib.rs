use crate::error::WorklogError;
use client::TimesheetClient;
use config::Tables;
use context::Context;
use diff::TimesheetDiff;
use log::debug;
use operation::{
    check::{self, Check},
    diff::Diff,
    show::{self, Show},
    sync::{Sync, SyncReport},
};
use types::DaySet;

pub mod activity;
pub mod client;
pub mod config;
pub mod context;
pub mod date;
pub mod diff;
pub mod error;
pub mod operation;
pub mod parser;
pub mod rules;
pub mod types;
pub mod util;

pub struct ApplicationRuntime {
    context: Context,
    tables: Tables,
    client: Option<Box<dyn TimesheetClient>>,
}

pub enum Operation {
    Check(Check),
    Diff(Diff),
    Sync(Sync),
    Show(Show),
}

#[derive(Debug)]
pub enum OperationResult {
    Parsed(DaySet),
    Diffed(TimesheetDiff),
    Synchronised(SyncReport),
    Entries(DaySet),
}

impl ApplicationRuntime {
    #[must_use]
    pub fn builder() -> ApplicationRuntimeBuilder {
        ApplicationRuntimeBuilder::default()
    }

    #[must_use]
    pub fn context(&self) -> &Context {
        &self.context
    }

    #[must_use]
    pub fn tables(&self) -> &Tables {
        &self.tables
    }

    /// The timesheet client, needed by every operation reaching the tracker
    ///
    /// # Errors
    /// `WorklogError::ClientNotConfigured` if the runtime was built without one
    pub fn client(&self) -> Result<&dyn TimesheetClient, WorklogError> {
        self.client
            .as_deref()
            .ok_or(WorklogError::ClientNotConfigured)
    }

    /// Executes the specified `Operation` and returns the result.
    ///
    /// # Errors
    ///
    /// This function may return an error (`WorklogError`) in the following scenarios:
    ///
    /// - The work log file cannot be read or one of its lines fails to parse.
    /// - The operation needs the timesheet, but no client has been configured.
    /// - A remote call fails, in which case the operation is aborted.
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// use worklog::{ApplicationRuntime, Operation};
    /// use worklog::operation::check::Check;
    ///
    /// let runtime = ApplicationRuntime::builder().build()?;
    /// let result = runtime.execute(Operation::Check(Check { file: "week.yaml".into() }))?;
    /// ```
    pub fn execute(&self, operation: Operation) -> Result<OperationResult, WorklogError> {
        match operation {
            Operation::Check(instructions) => {
                let days = check::execute(self, &instructions)?;
                Ok(OperationResult::Parsed(days))
            }
            Operation::Diff(instructions) => {
                let changes = operation::diff::execute(self, &instructions)?;
                Ok(OperationResult::Diffed(changes))
            }
            Operation::Sync(instructions) => {
                let report = operation::sync::execute(self, &instructions)?;
                Ok(OperationResult::Synchronised(report))
            }
            Operation::Show(instructions) => {
                let days = show::execute(self, &instructions)?;
                Ok(OperationResult::Entries(days))
            }
        }
    }
}

/// Assembles an [`ApplicationRuntime`]. The context defaults to one taken
/// from the environment, and the tables are loaded from the context unless
/// given.
#[derive(Default)]
pub struct ApplicationRuntimeBuilder {
    context: Option<Context>,
    tables: Option<Tables>,
    client: Option<Box<dyn TimesheetClient>>,
}

impl ApplicationRuntimeBuilder {
    #[must_use]
    pub fn context(mut self, context: Context) -> Self {
        self.context = Some(context);
        self
    }

    #[must_use]
    pub fn tables(mut self, tables: Tables) -> Self {
        self.tables = Some(tables);
        self
    }

    #[must_use]
    pub fn client(mut self, client: impl TimesheetClient + 'static) -> Self {
        self.client = Some(Box::new(client));
        self
    }

    /// # Errors
    /// If no context was given and `TEMPI_HOME` is not set, or the tables
    /// cannot be loaded
    pub fn build(self) -> Result<ApplicationRuntime, WorklogError> {
        let context = match self.context {
            Some(context) => context,
            None => Context::from_env(false)?,
        };
        let tables = match self.tables {
            Some(tables) => tables,
            None => config::load(&context)?,
        };
        debug!(
            "Runtime ready: {} work items, {} activities, client configured: {}",
            tables.work_items.len(),
            tables.activities.len(),
            self.client.is_some()
        );
        Ok(ApplicationRuntime {
            context,
            tables,
            client: self.client,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::tests::write_tables;
    use tempfile::TempDir;

    #[test]
    fn tables_are_loaded_from_the_context() {
        let home = TempDir::new().unwrap();
        write_tables(home.path());

        let runtime = ApplicationRuntime::builder()
            .context(Context::new(home.path(), true).with_custom_dir(home.path()))
            .build()
            .unwrap();

        assert!(runtime.context().debug());
        assert_eq!(runtime.tables().work_items.len(), 3);
    }

    #[test]
    fn remote_operations_need_a_client() {
        let home = TempDir::new().unwrap();
        write_tables(home.path());
        let runtime = ApplicationRuntime::builder()
            .context(Context::new(home.path(), false).with_custom_dir(home.path()))
            .build()
            .unwrap();

        let result = runtime.execute(Operation::Show(Show {
            worker: "jdoe".to_string(),
            from: "2024-01-01".parse().unwrap(),
            to: "2024-01-02".parse().unwrap(),
        }));

        assert!(matches!(result, Err(WorklogError::ClientNotConfigured)));
    }

    #[test]
    fn check_runs_without_a_client() {
        let home = TempDir::new().unwrap();
        write_tables(home.path());
        let file = home.path().join("week.yaml");
        std::fs::write(&file, "2024-01-15:\n  - 1 ops\n").unwrap();
        let runtime = ApplicationRuntime::builder()
            .context(Context::new(home.path(), false).with_custom_dir(home.path()))
            .build()
            .unwrap();

        match runtime.execute(Operation::Check(Check { file })).unwrap() {
            OperationResult::Parsed(days) => assert_eq!(days.len(), 1),
            other => panic!("Expected Parsed, got {other:?}"),
        }
    }
}
