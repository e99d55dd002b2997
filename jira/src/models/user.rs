use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct User {
    pub name: String,
    #[serde(default)]
    pub key: String,
    #[serde(alias = "displayName")]
    pub display_name: String,
    #[serde(alias = "emailAddress", default)]
    pub email_address: Option<String>,
    #[serde(default)]
    pub active: bool,
}
