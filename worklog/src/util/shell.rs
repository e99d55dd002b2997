//! Runs shell commands, logging their output as it appears.
use std::io::{BufRead, BufReader};
use std::process::{Command, Stdio};

use anyhow::{bail, Context as _, Result};
use log::{debug, info};
use serde_json::Value;

use crate::context::Context;

#[derive(Debug, Clone, Default)]
pub struct ExecOptions {
    /// Logged before the command is started
    pub msg: Option<String>,
    /// Logs the command at info level
    pub echo: bool,
    /// Logs output lines at info rather than debug level
    pub show: bool,
    /// Captures the output lines
    pub save: bool,
    /// A non-zero exit status is returned rather than reported as an error
    pub ignore_errors: bool,
    /// Captured output is parsed as a single JSON document
    pub json_output: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Captured {
    Lines(Vec<String>),
    Json(Value),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExecOutput {
    pub code: i32,
    /// Only when `save` was requested
    pub captured: Option<Captured>,
}

/// Runs `cmd` with `sh -c` in the working directory of `ctx`, with stderr
/// merged into stdout.
///
/// # Errors
/// If the command cannot be started, exits with a non-zero status while
/// `ignore_errors` is off, or does not print valid JSON in JSON mode
pub fn exec_cmd(ctx: &Context, cmd: &str, options: &ExecOptions) -> Result<ExecOutput> {
    if let Some(msg) = &options.msg {
        debug!("{msg}");
    }
    if options.echo {
        info!("Executing: {cmd}");
    }
    debug!("Executing: {cmd}, in directory: {}", ctx.custom_dir().display());

    let mut child = Command::new("sh")
        .arg("-c")
        .arg(format!("exec 2>&1\n{cmd}"))
        .current_dir(ctx.custom_dir())
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .spawn()
        .with_context(|| format!("Unable to start: {cmd}"))?;

    let mut output = Vec::new();
    if let Some(stdout) = child.stdout.take() {
        for line in BufReader::new(stdout).split(b'\n') {
            let line = line.with_context(|| format!("Unable to read output of: {cmd}"))?;
            let line = String::from_utf8_lossy(&line).trim_end().to_string();
            if !line.is_empty() {
                if options.show {
                    info!("{line}");
                } else {
                    debug!("{line}");
                }
            }
            output.push(line);
        }
    }
    let status = child
        .wait()
        .with_context(|| format!("Unable to wait for: {cmd}"))?;
    // killed by a signal
    let code = status.code().unwrap_or(-1);

    if code != 0 && !options.ignore_errors {
        if !options.show && !options.save {
            for line in &output {
                eprintln!("{line}");
            }
        }
        let last_line = output.last().map_or("N/A", String::as_str);
        bail!("Execution failed: {cmd} ({code}, {last_line})");
    }

    let captured = if !options.save {
        None
    } else if options.json_output {
        let value = serde_json::from_str(&output.join("\n"))
            .with_context(|| format!("Output of '{cmd}' is not JSON"))?;
        Some(Captured::Json(value))
    } else {
        Some(Captured::Lines(output))
    };
    Ok(ExecOutput { code, captured })
}
