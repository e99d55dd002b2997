//! Maintains `export NAME="value"` lines in a shell profile.
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::debug;
use regex::Regex;

/// A bare file name is taken to live in the home directory
///
/// # Errors
/// If the name is bare and `HOME` is not set
pub fn profile_path(name: &str) -> Result<PathBuf> {
    if name.contains('/') {
        Ok(PathBuf::from(name))
    } else {
        let home = env::var("HOME").context("HOME is not set")?;
        Ok(Path::new(&home).join(name))
    }
}

/// Sets, replaces or removes exports in the profile at `path`.
///
/// An existing `export NAME=...` line is rewritten in place, keeping its
/// indentation. A `None` value removes the export. Names not yet exported are
/// appended in alphabetical order.
///
/// # Errors
/// If the profile cannot be read or written
pub fn set_export(path: &Path, vars: &BTreeMap<String, Option<String>>) -> Result<()> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("Unable to read {}", path.display()))?;

    let matchers = vars
        .keys()
        .map(|name| {
            Regex::new(&format!(r"^(\s*export {}=)", regex::escape(name)))
                .map(|expr| (name.as_str(), expr))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut found = Vec::new();
    let mut lines = Vec::new();
    'lines: for line in contents.lines() {
        for (name, expr) in &matchers {
            if let Some(prefix) = expr.captures(line).and_then(|c| c.get(1)) {
                match &vars[*name] {
                    Some(value) => {
                        lines.push(format!("{}\"{}\"", prefix.as_str(), value));
                        found.push(*name);
                    }
                    None => debug!("Removing export of {name}"),
                }
                continue 'lines;
            }
        }
        lines.push(line.to_string());
    }

    for (name, value) in vars {
        if let Some(value) = value {
            debug!("Setting {name}={value}");
            if !found.contains(&name.as_str()) {
                lines.push(format!("export {name}=\"{value}\""));
            }
        }
    }

    let mut text = lines.join("\n");
    text.push('\n');
    fs::write(path, text).with_context(|| format!("Unable to write {}", path.display()))
}
