//! Flexible construction of [`Jira`] clients.
//!
//! ```rust,ignore
//! // 1. Explicit configuration
//! let jira = Jira::builder()
//!     .host("https://jira.example.com")
//!     .bearer_auth("your_api_token")
//!     .timeout(30)
//!     .build()?;
//!
//! // 2. From the environment, falling back to basic auth
//! let mut builder = Jira::builder().from_env();
//! if !builder.has_credentials() {
//!     builder = builder.basic_auth("jdoe", prompt_for_password()?);
//! }
//! let jira = builder.build()?;
//! ```
use crate::{Credentials, Jira, DEFAULT_TIMEOUT_SECS};
use log::debug;
use reqwest::blocking::Client;
use std::env;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Error type for `JiraBuilder` operations
#[derive(Error, Debug)]
pub enum JiraBuilderError {
    #[error("Environment variable {0} not set")]
    EnvVarNotSet(String),

    #[error("URL parsing error: {0}")]
    UrlParseError(#[from] url::ParseError),

    #[error("No credentials given, set {0} or supply a user name and password")]
    MissingCredentials(String),

    #[error("Jira client initialization error: {0}")]
    ClientInitError(String),

    #[error("Timeout must be positive")]
    InvalidTimeout,
}

impl JiraBuilderError {
    /// True when the error comes from the environment or the given settings,
    /// rather than from setting up the HTTP client
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        !matches!(self, JiraBuilderError::ClientInitError(_))
    }
}

/// Names of the environment variables used for the Jira configuration
pub struct JiraEnvVars;

impl JiraEnvVars {
    pub const HOST: &'static str = "JIRA_ADDR";
    pub const TOKEN: &'static str = "JIRA_TOKEN";
}

/// Builder for creating Jira client instances
#[derive(Default)]
pub struct JiraBuilder {
    host: Option<String>,
    credentials: Option<Credentials>,
    timeout: Option<Duration>,
}

impl JiraBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the Jira host URL
    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    #[must_use]
    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Sets basic authentication credentials
    #[must_use]
    pub fn basic_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.credentials = Some(Credentials::Basic(username.into(), password.into()));
        self
    }

    /// Sets bearer token authentication
    #[must_use]
    pub fn bearer_auth(mut self, token: impl Into<String>) -> Self {
        self.credentials = Some(Credentials::Bearer(token.into()));
        self
    }

    /// Sets the timeout applied to every request, in seconds
    #[must_use]
    pub fn timeout(mut self, seconds: u64) -> Self {
        self.timeout = Some(Duration::from_secs(seconds));
        self
    }

    #[must_use]
    pub fn has_credentials(&self) -> bool {
        self.credentials.is_some()
    }

    /// Picks up the host and the bearer token from the environment.
    /// Values already given to the builder are kept.
    #[must_use]
    pub fn from_env(self) -> Self {
        let mut builder = self;

        if builder.host.is_none() {
            if let Ok(host) = env::var(JiraEnvVars::HOST) {
                builder = builder.host(host);
            }
        }

        if builder.credentials.is_none() {
            if let Ok(token) = env::var(JiraEnvVars::TOKEN) {
                builder = builder.bearer_auth(token);
            }
        }

        builder
    }

    /// Builds a Jira client instance with the configured parameters
    ///
    /// # Errors
    /// If the host or the credentials are missing, or the host is not a valid URL
    pub fn build(self) -> Result<Jira, JiraBuilderError> {
        let host = self
            .host
            .ok_or_else(|| JiraBuilderError::EnvVarNotSet(JiraEnvVars::HOST.to_string()))?;

        let credentials = self
            .credentials
            .ok_or_else(|| JiraBuilderError::MissingCredentials(JiraEnvVars::TOKEN.to_string()))?;

        let timeout = self
            .timeout
            .unwrap_or_else(|| Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        if timeout.is_zero() {
            return Err(JiraBuilderError::InvalidTimeout);
        }

        // Validated here so that a bad URL is reported as such
        Url::parse(&host)?;

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| JiraBuilderError::ClientInitError(e.to_string()))?;

        let jira = Jira::with_client(&host, credentials, client)
            .map_err(|e| JiraBuilderError::ClientInitError(e.to_string()))?;
        debug!("Created Jira client for {} with timeout {:?}", jira.host(), timeout);

        Ok(jira)
    }
}

impl Jira {
    /// Create a Jira client builder
    #[must_use]
    pub fn builder() -> JiraBuilder {
        JiraBuilder::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_host_is_reported_by_variable_name() {
        let result = JiraBuilder::new().bearer_auth("t").build();
        match result {
            Err(JiraBuilderError::EnvVarNotSet(var)) => assert_eq!(var, "JIRA_ADDR"),
            other => panic!("Expected EnvVarNotSet, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn settings_errors_are_configuration_errors() {
        assert!(JiraBuilderError::EnvVarNotSet("JIRA_ADDR".to_string()).is_configuration());
        assert!(JiraBuilderError::InvalidTimeout.is_configuration());
        assert!(!JiraBuilderError::ClientInitError("tls".to_string()).is_configuration());
    }

    #[test]
    fn missing_credentials_are_reported() {
        let result = JiraBuilder::new().host("https://jira.example.com").build();
        assert!(matches!(result, Err(JiraBuilderError::MissingCredentials(_))));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let result = JiraBuilder::new()
            .host("https://jira.example.com")
            .basic_auth("jdoe", "pw")
            .timeout(0)
            .build();
        assert!(matches!(result, Err(JiraBuilderError::InvalidTimeout)));
    }

    #[test]
    fn invalid_url_is_rejected() {
        let result = JiraBuilder::new().host("not a url").bearer_auth("t").build();
        assert!(matches!(result, Err(JiraBuilderError::UrlParseError(_))));
    }

    #[test]
    fn explicit_values_survive_from_env() {
        let builder = JiraBuilder::new()
            .host("https://jira.example.com/")
            .bearer_auth("t")
            .from_env();
        assert!(builder.has_credentials());
        let jira = builder.build().unwrap();
        assert_eq!(jira.host().as_str(), "https://jira.example.com/");
    }
}
