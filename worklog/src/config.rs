//! Loads the read-only lookup tables from `$TEMPI_HOME/config`.
//!
//! All tables are plain JSON objects:
//!
//! * `work.json` maps a work item alias to an issue and an optional activity.
//!   A `work-custom.json` in the current directory, when present, is merged
//!   over it.
//! * `activity.json` maps an activity label to its backend code.
//! * `comment-to-act.json` holds the comment rules, see [`CommentActivityRules`].
//! * `issues.json` maps issue keys to summaries. It is optional.
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::debug;
use serde::de::DeserializeOwned;

use crate::activity::ActivityCodeMap;
use crate::context::Context;
use crate::error::WorklogError;
use crate::rules::{CommentActivityRules, RawRules};
use crate::types::WorkItem;

pub const COMMENT_TO_ACT_MAP: &str = "comment-to-act.json";
pub const WORK_MAP: &str = "work.json";
pub const WORK_MAP_CUSTOM: &str = "work-custom.json";
pub const ACTIVITY_MAP: &str = "activity.json";
pub const ISSUE_SUMMARY_MAP: &str = "issues.json";

/// The lookup tables needed to turn work log lines into time entries
#[derive(Debug, Clone, Default)]
pub struct Tables {
    pub work_items: BTreeMap<String, WorkItem>,
    pub activities: ActivityCodeMap,
    pub rules: CommentActivityRules,
    pub issue_summaries: BTreeMap<String, String>,
    /// Where the tables came from, used in error messages
    pub config_dir: PathBuf,
}

impl Tables {
    /// Hint for users whose work item could not be found
    #[must_use]
    pub fn work_item_hint(&self) -> String {
        format!(
            "{} and ./{WORK_MAP_CUSTOM}",
            self.config_dir.join(WORK_MAP).display()
        )
    }
}

/// Loads every table for the given context
///
/// # Errors
/// If a required table is missing or any table cannot be parsed
pub fn load(ctx: &Context) -> Result<Tables, WorklogError> {
    let config_dir = ctx.config_dir();
    debug!("Loading configuration tables from {}", config_dir.display());

    let mut work_items: BTreeMap<String, WorkItem> = read_json(&config_dir.join(WORK_MAP))?;
    let custom: BTreeMap<String, WorkItem> =
        read_optional_json(&ctx.custom_dir().join(WORK_MAP_CUSTOM))?;
    if !custom.is_empty() {
        debug!("Merging {} custom work items", custom.len());
    }
    work_items.extend(custom);

    let activities = ActivityCodeMap::new(read_json(&config_dir.join(ACTIVITY_MAP))?)?;

    let raw_rules: RawRules = read_json(&config_dir.join(COMMENT_TO_ACT_MAP))?;
    let rules =
        CommentActivityRules::from_raw(raw_rules).map_err(|e| WorklogError::InvalidConfig {
            file: COMMENT_TO_ACT_MAP.to_string(),
            reason: e.to_string(),
        })?;

    let issue_summaries = read_optional_json(&config_dir.join(ISSUE_SUMMARY_MAP))?;

    Ok(Tables {
        work_items,
        activities,
        rules,
        issue_summaries,
        config_dir,
    })
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, WorklogError> {
    let contents = fs::read_to_string(path).map_err(|source| {
        if source.kind() == ErrorKind::NotFound {
            WorklogError::ConfigFileNotFound { path: path.into() }
        } else {
            WorklogError::ConfigRead {
                path: path.into(),
                source,
            }
        }
    })?;
    serde_json::from_str::<T>(&contents).map_err(|source| WorklogError::ConfigParse {
        path: path.into(),
        source,
    })
}

fn read_optional_json<T: DeserializeOwned + Default>(path: &Path) -> Result<T, WorklogError> {
    match read_json(path) {
        Err(WorklogError::ConfigFileNotFound { .. }) => Ok(T::default()),
        other => other,
    }
}
