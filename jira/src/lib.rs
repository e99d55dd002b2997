//!
//! `jira` is a small, blocking client for the Jira REST interface and the
//! Tempo timesheets extension.
//!
//! The types are shaped for time entry reconciliation and issue housekeeping,
//! and are hence not generic. One request is in flight at a time and every call
//! is bounded by the timeout configured on the underlying `reqwest` client.
//!
//! Any response outside the 2xx range is reported as [`JiraError::Remote`],
//! carrying the status code and the raw body. Nothing is retried.
use std::{collections::BTreeMap, fs, path::PathBuf, time::Duration};

use chrono::NaiveDate;
use log::debug;
use models::{
    issue::{
        AttachmentInfo, Comment, CommentVisibility, CreatedIssue, Field, Issue, IssueLink,
        LinkType, LinkedIssue, NewComment, SearchPage,
    },
    tempo::{CreatedTempoWorklog, TempoSearch, TempoWorklog, TempoWorklogInsert},
    user::User,
};
use reqwest::{
    blocking::{
        multipart::{Form, Part},
        Client, RequestBuilder, Response,
    },
    header::{ACCEPT, CONTENT_TYPE},
    Method,
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{json, Map, Value};
use thiserror::Error;
use url::{ParseError, Url};

pub mod builder;
pub mod models;

pub use reqwest::StatusCode;

pub type Result<T> = std::result::Result<T, JiraError>;

/// Seconds allowed for every single call, unless the builder says otherwise
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Page size used by [`Jira::search`] when nothing else is given
pub const DEFAULT_PAGE_SIZE: u32 = 100;

const API: &str = "rest/api/2";
const TEMPO_API: &str = "rest/tempo-timesheets/4";

#[derive(Error, Debug)]
pub enum JiraError {
    #[error("Remote call failed with HTTP {status}: {body}")]
    Remote { status: StatusCode, body: String },
    #[error("Internal error in reqwest library: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Could not serialize/deserialize: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Invalid Jira url: {0}")]
    Url(#[from] ParseError),
    #[error("Unable to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Parameter '{0}' must contain a value")]
    RequiredParameter(String),
    #[error("Unexpected response from Jira: {0}")]
    UnexpectedResponse(String),
}

impl JiraError {
    /// HTTP status of a failed remote call, if that is what this error is
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            JiraError::Remote { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[derive(Clone, Debug)]
pub enum Credentials {
    Anonymous,
    Basic(String, String),
    Bearer(String),
}

impl Credentials {
    fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        match self {
            Credentials::Anonymous => request,
            Credentials::Basic(ref user, ref pass) => {
                request.basic_auth(user.to_owned(), Some(pass.to_owned()))
            }
            Credentials::Bearer(ref token) => request.bearer_auth(token.to_owned()),
        }
    }
}

/// Something to upload with [`Jira::attach_file`]
#[derive(Debug, Clone)]
pub enum Attachment {
    /// A file on disk. The upload is named after the file unless `name` is given
    File { path: PathBuf, name: Option<String> },
    /// In-memory content, which must be named
    Content { name: String, content: Vec<u8> },
}

#[derive(Clone, Debug)]
pub struct Jira {
    host: Url,
    credentials: Credentials,
    client: Client,
}

impl Jira {
    #[allow(clippy::missing_errors_doc)]
    pub fn new<H>(host: H, credentials: Credentials) -> Result<Jira>
    where
        H: Into<String>,
    {
        let client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()?;
        Jira::with_client(&host.into(), credentials, client)
    }

    pub(crate) fn with_client(host: &str, credentials: Credentials, client: Client) -> Result<Jira> {
        let mut host = Url::parse(host)?;
        // Url::join() replaces the last path segment unless the path ends with a slash
        if !host.path().ends_with('/') {
            let path = format!("{}/", host.path());
            host.set_path(&path);
        }
        Ok(Jira {
            host,
            credentials,
            client,
        })
    }

    #[must_use]
    pub fn host(&self) -> &Url {
        &self.host
    }

    fn send(&self, method: Method, resource: &str, body: Option<Vec<u8>>) -> Result<String> {
        let url = self.host.join(resource)?;

        let mut request = self
            .client
            .request(method, url)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json");

        request = self.credentials.apply(request);

        if let Some(body) = body {
            request = request.body(body);
        }
        debug!("request '{:?}'", request);

        Self::read_response(request.send()?)
    }

    fn read_response(response: Response) -> Result<String> {
        let status = response.status();
        let body = response.text()?;
        debug!("status {:?} body '{:?}'", status, body);
        if status.is_success() {
            Ok(body)
        } else {
            Err(JiraError::Remote { status, body })
        }
    }

    fn request<D>(&self, method: Method, resource: &str, body: Option<Vec<u8>>) -> Result<D>
    where
        D: DeserializeOwned,
    {
        let body = self.send(method, resource, body)?;
        let data = if body.trim().is_empty() { "null" } else { &body };
        Ok(serde_json::from_str::<D>(data)?)
    }

    #[allow(clippy::missing_errors_doc)]
    pub fn get<D>(&self, resource: &str) -> Result<D>
    where
        D: DeserializeOwned,
    {
        self.request::<D>(Method::GET, resource, None)
    }

    fn delete<D>(&self, resource: &str) -> Result<D>
    where
        D: DeserializeOwned,
    {
        self.request::<D>(Method::DELETE, resource, None)
    }

    fn post<D, S>(&self, resource: &str, body: &S) -> Result<D>
    where
        D: DeserializeOwned,
        S: Serialize,
    {
        let data = serde_json::to_string::<S>(body)?;
        debug!("Json request: {}", data);
        self.request::<D>(Method::POST, resource, Some(data.into_bytes()))
    }

    fn put<D, S>(&self, resource: &str, body: &S) -> Result<D>
    where
        D: DeserializeOwned,
        S: Serialize,
    {
        let data = serde_json::to_string::<S>(body)?;
        debug!("Json request: {}", data);
        self.request::<D>(Method::PUT, resource, Some(data.into_bytes()))
    }

    /// Retrieves the field catalogue, split into custom fields and system fields.
    /// Both maps go from field name to field id. Non-ASCII characters are
    /// removed from the names of system fields.
    #[allow(clippy::missing_errors_doc)]
    pub fn get_fields(&self) -> Result<(BTreeMap<String, String>, BTreeMap<String, String>)> {
        let fields = self.get::<Vec<Field>>(&format!("{API}/field"))?;

        let mut custom_fields = BTreeMap::new();
        let mut system_fields = BTreeMap::new();
        for field in fields {
            if field.custom {
                custom_fields.insert(field.name, field.id);
            } else {
                let name: String = field.name.chars().filter(char::is_ascii).collect();
                system_fields.insert(name, field.id);
            }
        }
        Ok((custom_fields, system_fields))
    }

    /// Runs a JQL query and collects every page of the result.
    ///
    /// Pages are requested with an increasing `startAt` until a page comes back
    /// without issues.
    #[allow(clippy::missing_errors_doc)]
    pub fn search(&self, jql: &str, max_results: u32) -> Result<Vec<Issue>> {
        if max_results == 0 {
            return Err(JiraError::RequiredParameter("max_results".to_string()));
        }
        let jql_encoded = urlencoding::encode(jql);

        let mut start_at = 0;
        let mut issues = Vec::<Issue>::new();
        loop {
            let resource = format!(
                "{API}/search?jql={jql_encoded}&startAt={start_at}&maxResults={max_results}"
            );
            let mut page = self.get::<SearchPage>(&resource)?;
            if page.issues.is_empty() {
                break;
            }
            debug!("Search page at {} returned {} issues", start_at, page.issues.len());
            issues.append(&mut page.issues);
            start_at += max_results;
        }
        Ok(issues)
    }

    /// Retrieves a single issue, including the transitions available for it
    #[allow(clippy::missing_errors_doc)]
    pub fn get_issue(&self, key: &str) -> Result<Issue> {
        self.get::<Issue>(&format!("{API}/issue/{key}?expand=transitions"))
    }

    /// Creates an issue. `extra_fields` are merged into the `fields` object
    /// after project, summary and issue type, so they may override them.
    #[allow(clippy::missing_errors_doc)]
    pub fn create_issue(
        &self,
        project: &str,
        summary: &str,
        issue_type: &str,
        extra_fields: Option<Map<String, Value>>,
    ) -> Result<CreatedIssue> {
        if project.is_empty() {
            return Err(JiraError::RequiredParameter("project".to_string()));
        }
        let mut fields = Map::new();
        fields.insert("project".to_string(), json!({ "key": project }));
        fields.insert("summary".to_string(), json!(summary));
        fields.insert("issuetype".to_string(), json!({ "name": issue_type }));
        if let Some(extra) = extra_fields {
            fields.extend(extra);
        }
        self.post::<CreatedIssue, Value>(&format!("{API}/issue"), &json!({ "fields": fields }))
    }

    /// Sets a single field of an issue
    #[allow(clippy::missing_errors_doc)]
    pub fn update_issue(&self, key: &str, field: &str, value: Value) -> Result<()> {
        let payload = json!({ "fields": { field: value } });
        self.update_issue_payload(key, &payload)
    }

    /// Sends a complete edit payload, for updates that do not fit [`Jira::update_issue`]
    #[allow(clippy::missing_errors_doc)]
    pub fn update_issue_payload(&self, key: &str, payload: &Value) -> Result<()> {
        self.put::<(), Value>(&format!("{API}/issue/{key}"), payload)
    }

    #[allow(clippy::missing_errors_doc)]
    pub fn assign_issue(&self, key: &str, username: &str) -> Result<()> {
        self.put::<(), Value>(
            &format!("{API}/issue/{key}/assignee"),
            &json!({ "name": username }),
        )
    }

    #[allow(clippy::missing_errors_doc)]
    pub fn get_user(&self, username: &str) -> Result<User> {
        let username = urlencoding::encode(username);
        self.get::<User>(&format!("{API}/user?username={username}"))
    }

    #[allow(clippy::missing_errors_doc)]
    pub fn add_issue_comment(&self, key: &str, body: &str, role: &str) -> Result<Comment> {
        let comment = NewComment {
            body: body.to_string(),
            visibility: CommentVisibility {
                kind: "role".to_string(),
                value: role.to_string(),
            },
        };
        self.post::<Comment, NewComment>(
            &format!("{API}/issue/{key}/comment?renderedBody=true"),
            &comment,
        )
    }

    /// Links `child_issue` (inward) to `parent_issue` (outward) with the named link type
    #[allow(clippy::missing_errors_doc)]
    pub fn link_issues(&self, link_type: &str, parent_issue: &str, child_issue: &str) -> Result<()> {
        let link = IssueLink {
            link_type: LinkType {
                name: link_type.to_string(),
            },
            inward_issue: LinkedIssue {
                key: child_issue.to_string(),
            },
            outward_issue: LinkedIssue {
                key: parent_issue.to_string(),
            },
        };
        self.post::<(), IssueLink>(&format!("{API}/issueLink"), &link)
    }

    /// Uploads an attachment to an issue as multipart form data
    #[allow(clippy::missing_errors_doc)]
    pub fn attach_file(&self, key: &str, attachment: Attachment) -> Result<Vec<AttachmentInfo>> {
        let (name, content) = match attachment {
            Attachment::File { path, name } => {
                let content = fs::read(&path).map_err(|source| JiraError::Io {
                    path: path.clone(),
                    source,
                })?;
                let name = name
                    .or_else(|| {
                        path.file_name()
                            .map(|n| n.to_string_lossy().to_string())
                    })
                    .ok_or_else(|| JiraError::RequiredParameter("name".to_string()))?;
                (name, content)
            }
            Attachment::Content { name, content } => {
                if name.trim().is_empty() {
                    return Err(JiraError::RequiredParameter("name".to_string()));
                }
                (name, content)
            }
        };

        let url = self.host.join(&format!("{API}/issue/{key}/attachments"))?;
        let form = Form::new().part("file", Part::bytes(content).file_name(name));
        let request = self
            .client
            .post(url)
            .header("X-Atlassian-Token", "nocheck")
            .header(ACCEPT, "application/json")
            .multipart(form);
        let request = self.credentials.apply(request);
        debug!("request '{:?}'", request);

        let body = Self::read_response(request.send()?)?;
        Ok(serde_json::from_str::<Vec<AttachmentInfo>>(&body)?)
    }

    /// Retrieves the Tempo worklogs of `worker` between `from` and `to`, both inclusive
    #[allow(clippy::missing_errors_doc)]
    pub fn search_worklogs(
        &self,
        worker: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<TempoWorklog>> {
        if worker.is_empty() {
            return Err(JiraError::RequiredParameter("worker".to_string()));
        }
        let search = TempoSearch {
            from,
            to,
            worker: vec![worker.to_string()],
        };
        self.post::<Vec<TempoWorklog>, TempoSearch>(&format!("{TEMPO_API}/worklogs/search"), &search)
    }

    /// Registers a Tempo worklog and returns the id assigned to it
    #[allow(clippy::missing_errors_doc)]
    pub fn create_worklog(&self, worklog: &TempoWorklogInsert) -> Result<u64> {
        let created = self.post::<Vec<CreatedTempoWorklog>, TempoWorklogInsert>(
            &format!("{TEMPO_API}/worklogs"),
            worklog,
        )?;
        created
            .first()
            .map(|w| w.tempo_worklog_id)
            .ok_or_else(|| {
                JiraError::UnexpectedResponse(format!(
                    "no worklog returned when creating {} on {}",
                    worklog.origin_task_id, worklog.started
                ))
            })
    }

    #[allow(clippy::missing_errors_doc)]
    pub fn delete_worklog(&self, id: u64) -> Result<()> {
        self.delete::<()>(&format!("{TEMPO_API}/worklogs/{id}"))
    }
}
