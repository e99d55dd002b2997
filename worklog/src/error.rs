use std::{io, path::PathBuf};

use chrono::NaiveDate;
use jira::JiraError;
use thiserror::Error;

#[allow(clippy::module_name_repetitions)]
#[derive(Error, Debug)]
pub enum WorklogError {
    // Configuration
    #[error("Variable not set: {0}")]
    MissingEnvVar(String),
    #[error("Unable to find configuration file {path}")]
    ConfigFileNotFound { path: PathBuf },
    #[error("Unable to read configuration file {path}")]
    ConfigRead { path: PathBuf, source: io::Error },
    #[error("Unable to parse contents of {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Invalid configuration in {file}: {reason}")]
    InvalidConfig { file: String, reason: String },

    // Work log file
    #[error("Unable to read worklog file {path}")]
    WorklogFileRead { path: PathBuf, source: io::Error },
    #[error("Unable to parse worklog file {origin}: {source}")]
    WorklogFormat {
        origin: String,
        source: serde_yaml::Error,
    },
    #[error("Error in entry for {date}, '{line}': {source}")]
    Entry {
        date: NaiveDate,
        line: String,
        source: Box<WorklogError>,
    },
    #[error("Malformed line '{0}', expected '<hours> <work item> [comment]'")]
    MalformedLine(String),
    #[error("Invalid number of hours '{0}'")]
    InvalidHours(String),
    #[error("No comment provided for {work_item}, which is needed to derive the activity")]
    MissingComment { work_item: String },
    #[error("Work item not found and is not a valid issue key: {work_item}. See {hint}")]
    UnknownWorkItem { work_item: String, hint: String },
    #[error("Unable to derive an activity for {work_item} from the comment '{comment}'")]
    UnresolvedActivity { work_item: String, comment: String },
    #[error("Unable to find activity in the activity mapping: {0}")]
    UnknownActivity(String),

    // Remote
    #[error("Jira error {0}")]
    Jira(#[from] JiraError),
    #[error("Entry to be removed has no worklog id: {0}")]
    MissingWorklogId(String),
    #[error("No issue tracker client has been configured")]
    ClientNotConfigured,

    #[error("Could not make sense of input: {0}")]
    BadInput(String),
}

impl WorklogError {
    /// Strips the date and line context off an entry error
    #[must_use]
    pub fn root(&self) -> &WorklogError {
        match self {
            WorklogError::Entry { source, .. } => source.root(),
            other => other,
        }
    }

    /// Configuration errors are fatal before any work is attempted
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(
            self.root(),
            WorklogError::MissingEnvVar(_)
                | WorklogError::ConfigFileNotFound { .. }
                | WorklogError::ConfigRead { .. }
                | WorklogError::ConfigParse { .. }
                | WorklogError::InvalidConfig { .. }
        )
    }
}
