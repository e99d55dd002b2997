use std::path::PathBuf;

use log::{debug, info};

use crate::diff::{diff, TimesheetDiff};
use crate::error::WorklogError;
use crate::operation::diff::fetch_covering;
use crate::parser::parse_worklog_file;
use crate::types::TimeEntry;
use crate::ApplicationRuntime;

/// Makes the timesheet of `worker` agree with a work log file
pub struct Sync {
    pub file: PathBuf,
    pub worker: String,
    /// Report what would change without changing anything
    pub dry_run: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncReport {
    /// Entries registered, with the ids they were given. Without ids on a dry run.
    pub created: Vec<TimeEntry>,
    pub deleted: Vec<TimeEntry>,
    pub dry_run: bool,
}

impl SyncReport {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.created.is_empty() && self.deleted.is_empty()
    }
}

/// Executes the synchronisation of a work log file with the timesheet.
///
/// Entries present in the timesheet but not in the file are deleted, then
/// the entries of the file missing from the timesheet are created, one day at
/// a time. The first failure aborts the run; changes made before it stay.
///
/// # Errors
/// If the file fails to parse, the timesheet cannot be read or changed, or an
/// entry to delete carries no id
pub fn execute(runtime: &ApplicationRuntime, sync: &Sync) -> Result<SyncReport, WorklogError> {
    let wanted = parse_worklog_file(runtime.tables(), &sync.file)?;
    let existing = fetch_covering(runtime, &sync.worker, &wanted)?;
    let changes = diff(&wanted, &existing);
    check_removals_have_ids(&changes)?;

    let mut report = SyncReport {
        dry_run: sync.dry_run,
        ..SyncReport::default()
    };
    if sync.dry_run {
        for day in changes.into_values() {
            report.deleted.extend(day.removed);
            report.created.extend(day.added);
        }
        info!(
            "Dry run, would delete {} and create {} entries",
            report.deleted.len(),
            report.created.len()
        );
        return Ok(report);
    }

    let client = runtime.client()?;
    for (date, day) in changes {
        if day.is_empty() {
            debug!("{date}: nothing to do");
            continue;
        }
        for entry in day.removed {
            let id = entry.id.ok_or_else(|| WorklogError::MissingWorklogId(describe(&entry)))?;
            client.delete_time_entry(id)?;
            info!("Deleted {id}: {}", describe(&entry));
            report.deleted.push(entry);
        }
        for mut entry in day.added {
            let id = client.create_time_entry(&sync.worker, &entry)?;
            info!("Created {id}: {}", describe(&entry));
            entry.id = Some(id);
            report.created.push(entry);
        }
    }
    Ok(report)
}

// Nothing is changed when one of the removals cannot be carried out
fn check_removals_have_ids(changes: &TimesheetDiff) -> Result<(), WorklogError> {
    match changes
        .values()
        .flat_map(|day| day.removed.iter())
        .find(|entry| entry.id.is_none())
    {
        Some(entry) => Err(WorklogError::MissingWorklogId(describe(entry))),
        None => Ok(()),
    }
}

fn describe(entry: &TimeEntry) -> String {
    format!(
        "{} {}h {} {} '{}'",
        entry.date, entry.hours, entry.issue, entry.activity, entry.comment
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::mock::MockClient;
    use crate::operation::tests::{runtime_with, WORKLOG};
    use crate::types::{entry, group_by_day};
    use jira::{JiraError, StatusCode};
    use mockall::predicate::{eq, function};
    use mockall::Sequence;

    fn sync(file: PathBuf, dry_run: bool) -> Sync {
        Sync {
            file,
            worker: "jdoe".to_string(),
            dry_run,
        }
    }

    fn existing_with_stale_meeting() -> crate::types::DaySet {
        let mut deploy = entry("2024-01-15", 1.5, "OPS-1", "Design", "ops - deploy");
        deploy.id = Some(100);
        let mut stale = entry("2024-01-16", 1.0, "ADM-2", "Non-Projectmeeting", "mtg");
        stale.id = Some(101);
        group_by_day(vec![deploy, stale])
    }

    #[test]
    fn removals_are_deleted_and_additions_created() {
        let existing = existing_with_stale_meeting();
        let mut client = MockClient::new();
        let mut seq = Sequence::new();
        client
            .expect_fetch_time_entries()
            .times(1)
            .returning(move |_, _, _| Ok(existing.clone()));
        client
            .expect_create_time_entry()
            .with(eq("jdoe"), function(|e: &TimeEntry| e.issue.as_str() == "PROJ-7"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(200));
        client
            .expect_delete_time_entry()
            .with(eq(101))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        client
            .expect_create_time_entry()
            .with(eq("jdoe"), function(|e: &TimeEntry| e.comment == "mtg"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(201));
        let (runtime, file, _dir) = runtime_with(client, WORKLOG);

        let report = execute(&runtime, &sync(file, false)).unwrap();

        assert!(!report.dry_run);
        assert_eq!(report.deleted.len(), 1);
        assert_eq!(report.deleted[0].id, Some(101));
        let ids: Vec<Option<u64>> = report.created.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![Some(200), Some(201)]);
    }

    #[test]
    fn dry_run_changes_nothing() {
        let existing = existing_with_stale_meeting();
        let mut client = MockClient::new();
        client
            .expect_fetch_time_entries()
            .returning(move |_, _, _| Ok(existing.clone()));
        client.expect_create_time_entry().never();
        client.expect_delete_time_entry().never();
        let (runtime, file, _dir) = runtime_with(client, WORKLOG);

        let report = execute(&runtime, &sync(file, true)).unwrap();

        assert!(report.dry_run);
        assert_eq!(report.created.len(), 2);
        assert!(report.created.iter().all(|e| e.id.is_none()));
        assert_eq!(report.deleted.len(), 1);
    }

    #[test]
    fn removal_without_id_aborts_before_any_change() {
        let existing = group_by_day(vec![entry("2024-01-15", 4.0, "X-1", "Design", "x")]);
        let mut client = MockClient::new();
        client
            .expect_fetch_time_entries()
            .returning(move |_, _, _| Ok(existing.clone()));
        client.expect_create_time_entry().never();
        client.expect_delete_time_entry().never();
        let (runtime, file, _dir) = runtime_with(client, WORKLOG);

        let err = execute(&runtime, &sync(file, false)).unwrap_err();

        assert!(matches!(err, WorklogError::MissingWorklogId(ref s) if s.contains("X-1")));
    }

    #[test]
    fn first_remote_failure_aborts() {
        let mut client = MockClient::new();
        client
            .expect_fetch_time_entries()
            .returning(|_, _, _| Ok(crate::types::DaySet::new()));
        client.expect_create_time_entry().times(1).returning(|_, _| {
            Err(JiraError::Remote {
                status: StatusCode::BAD_REQUEST,
                body: "worker unknown".to_string(),
            })
        });
        let (runtime, file, _dir) = runtime_with(client, WORKLOG);

        let err = execute(&runtime, &sync(file, false)).unwrap_err();

        assert!(err.to_string().contains("worker unknown"));
    }

    #[test]
    fn nothing_to_do_when_in_agreement() {
        let mut client = MockClient::new();
        let (runtime, file, _dir) = {
            let mut deploy = entry("2024-01-15", 1.5, "OPS-1", "Design", "ops - deploy");
            deploy.id = Some(1);
            let existing = group_by_day(vec![deploy]);
            client
                .expect_fetch_time_entries()
                .returning(move |_, _, _| Ok(existing.clone()));
            runtime_with(client, "2024-01-15:\n  - 1.5 ops deploy\n")
        };

        let report = execute(&runtime, &sync(file, false)).unwrap();

        assert!(report.is_empty());
    }
}
