use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::core::IssueKey;

/// One page of a JQL search
#[derive(Debug, Serialize, Deserialize)]
pub struct SearchPage {
    #[serde(rename = "startAt", default)]
    pub start_at: u32,
    #[serde(rename = "maxResults", default)]
    pub max_results: u32,
    #[serde(default)]
    pub total: u32,
    pub issues: Vec<Issue>,
}

/// An issue as returned by search and by the issue resource.
///
/// Fields differ between Jira instances (custom fields in particular), hence
/// they are kept as raw JSON.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Issue {
    pub id: String,
    pub key: IssueKey,
    #[serde(default)]
    pub fields: Map<String, Value>,
    #[serde(default)]
    pub transitions: Vec<Transition>,
}

impl Issue {
    #[must_use]
    pub fn summary(&self) -> Option<&str> {
        self.fields.get("summary").and_then(Value::as_str)
    }

    /// Name of a nested field such as `status` or `issuetype`
    #[must_use]
    pub fn field_name(&self, field: &str) -> Option<&str> {
        self.fields
            .get(field)
            .and_then(|v| v.get("name"))
            .and_then(Value::as_str)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Transition {
    pub id: String,
    pub name: String,
}

/// Entry of the field catalogue
#[derive(Debug, Serialize, Deserialize)]
pub struct Field {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub custom: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreatedIssue {
    pub id: String,
    pub key: IssueKey,
    #[serde(rename = "self")]
    pub self_url: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueLink {
    #[serde(rename = "type")]
    pub link_type: LinkType,
    pub inward_issue: LinkedIssue,
    pub outward_issue: LinkedIssue,
}

#[derive(Debug, Serialize)]
pub struct LinkType {
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct LinkedIssue {
    pub key: String,
}

#[derive(Debug, Serialize)]
pub struct NewComment {
    pub body: String,
    pub visibility: CommentVisibility,
}

#[derive(Debug, Serialize)]
pub struct CommentVisibility {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    #[serde(default)]
    pub body: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AttachmentInfo {
    pub id: String,
    pub filename: String,
    #[serde(default)]
    pub size: u64,
}
