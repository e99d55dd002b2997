use std::collections::BTreeMap;
use std::fmt::Write;

use anyhow::{Context, Result};
use jira::{Attachment, Jira};
use log::info;
use serde_json::{Map, Value};

use crate::cli::IssueCommand;

pub fn execute(jira: &Jira, cmd: IssueCommand) -> Result<()> {
    match cmd {
        IssueCommand::Get { key } => {
            let issue = jira.get_issue(&key)?;
            println!("{}", serde_json::to_string_pretty(&issue)?);
        }
        IssueCommand::Search { jql, max_results } => {
            let issues = jira.search(&jql, max_results)?;
            for issue in &issues {
                println!("{:12} {}", issue.key, issue.summary().unwrap_or(""));
            }
            info!("{} issues matched '{}'", issues.len(), jql);
        }
        IssueCommand::Create {
            project,
            summary,
            issue_type,
            field,
        } => {
            let extra = if field.is_empty() {
                None
            } else {
                Some(parse_fields(&field)?)
            };
            let created = jira.create_issue(&project, &summary, &issue_type, extra)?;
            println!("Created {} {}", created.key, created.self_url);
        }
        IssueCommand::Update { key, field, value } => {
            jira.update_issue(&key, &field, json_or_text(&value))?;
            println!("Updated {field} of {key}");
        }
        IssueCommand::Assign { key, user } => {
            jira.assign_issue(&key, &user)?;
            println!("Assigned {key} to {user}");
        }
        IssueCommand::Comment { key, body, role } => {
            let comment = jira.add_issue_comment(&key, &body, &role)?;
            println!("Added comment {} to {key}", comment.id);
        }
        IssueCommand::Link {
            link_type,
            parent,
            child,
        } => {
            jira.link_issues(&link_type, &parent, &child)?;
            println!("Linked {parent} -> {child} ({link_type})");
        }
        IssueCommand::Attach { key, file, name } => {
            let attached = jira.attach_file(&key, Attachment::File { path: file, name })?;
            for attachment in attached {
                println!("Attached {} ({} bytes)", attachment.filename, attachment.size);
            }
        }
        IssueCommand::Fields => {
            let (custom, system) = jira.get_fields()?;
            print!("{}", format_fields(&custom, &system));
        }
    }
    Ok(())
}

/// Parses `name=value` pairs into a field map
fn parse_fields(pairs: &[String]) -> Result<Map<String, Value>> {
    pairs
        .iter()
        .map(|pair| -> Result<(String, Value)> {
            let (name, value) = pair
                .split_once('=')
                .with_context(|| format!("Expected name=value, got '{pair}'"))?;
            Ok((name.trim().to_string(), json_or_text(value)))
        })
        .collect()
}

/// Field ids next to their names, custom fields first
fn format_fields(custom: &BTreeMap<String, String>, system: &BTreeMap<String, String>) -> String {
    let mut out = String::new();
    for (title, fields) in [("Custom fields:", custom), ("System fields:", system)] {
        let _ = writeln!(out, "{title}");
        for (name, id) in fields {
            let _ = writeln!(out, "  {id:20} {name}");
        }
    }
    out
}

/// `value` as JSON when it parses as such, as a JSON string otherwise
fn json_or_text(value: &str) -> Value {
    serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()))
}
