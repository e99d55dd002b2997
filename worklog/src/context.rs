//! The run context handed to every collaborator.
//!
//! Everything that used to be process-wide (home directory, debug flag, log
//! file) is decided once at startup and carried in a [`Context`].
use std::env;
use std::path::{Path, PathBuf};

use crate::error::WorklogError;

/// Names the directory holding the `config/` tables
pub const HOME_VAR: &str = "TEMPI_HOME";

#[derive(Debug, Clone, PartialEq)]
pub struct Context {
    home: PathBuf,
    custom_dir: PathBuf,
    debug: bool,
    log_file: Option<PathBuf>,
}

impl Context {
    /// Creates a context rooted at `home`. Custom tables are looked up in the
    /// current directory.
    #[must_use]
    pub fn new(home: impl Into<PathBuf>, debug: bool) -> Self {
        Context {
            home: home.into(),
            custom_dir: env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            debug,
            log_file: None,
        }
    }

    /// Creates a context from `$TEMPI_HOME`
    ///
    /// # Errors
    /// If `TEMPI_HOME` is not set
    pub fn from_env(debug: bool) -> Result<Self, WorklogError> {
        Ok(Context::new(required_var(HOME_VAR)?, debug))
    }

    #[must_use]
    pub fn with_log_file(mut self, log_file: Option<PathBuf>) -> Self {
        self.log_file = log_file;
        self
    }

    #[must_use]
    pub fn with_custom_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.custom_dir = dir.into();
        self
    }

    #[must_use]
    pub fn home(&self) -> &Path {
        &self.home
    }

    #[must_use]
    pub fn config_dir(&self) -> PathBuf {
        self.home.join("config")
    }

    #[must_use]
    pub fn custom_dir(&self) -> &Path {
        &self.custom_dir
    }

    #[must_use]
    pub fn debug(&self) -> bool {
        self.debug
    }

    #[must_use]
    pub fn log_file(&self) -> Option<&Path> {
        self.log_file.as_deref()
    }
}

/// Reads an environment variable that must be present
///
/// # Errors
/// `WorklogError::MissingEnvVar` naming the variable
pub fn required_var(name: &str) -> Result<String, WorklogError> {
    env::var(name).map_err(|_| WorklogError::MissingEnvVar(name.to_string()))
}
