//! # tempi, the Tempo timesheet command line utility
//!
//! Keeps the Tempo timesheet in Jira in line with a hand written work log.
//!
//! ## Usage Examples
//!
//! ### Checking a work log
//! ```bash
//! tempi check week03.yaml
//! ```
//!
//! ### Comparing with, and synchronising to, Tempo
//! ```bash
//! tempi diff week03.yaml --worker JIRAUSER1234
//! tempi sync week03.yaml --dry-run
//! tempi sync week03.yaml
//! ```
//!
//! ### Listing the timesheet
//! ```bash
//! tempi show --from mon --to fri --weekly
//! ```
//!
//! ### Issue housekeeping
//! ```bash
//! tempi issue search "project = OPS AND status = Open"
//! tempi issue comment OPS-1 "Deployed to production"
//! ```
use std::env;
use std::fs::File;
use std::io::{self, BufRead, IsTerminal, Write};
use std::path::PathBuf;
use std::process::exit;

use anyhow::{bail, Context as _, Result};
use chrono::Local;
use clap::Parser;
use cli::{Command, Opts, Synchronisation, Worker};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use directories::BaseDirs;
use env_logger::Env;
use jira::builder::{JiraBuilderError, JiraEnvVars};
use jira::Jira;
use log::{debug, error, info, Level};

use worklog::{
    config,
    context::{self, Context},
    date::{self, now_tstamp},
    error::WorklogError,
    operation::{check::Check, diff::Diff, show::Show, sync::Sync},
    ApplicationRuntime, Operation, OperationResult,
};

mod cli;
mod commands;
mod report;

const LOG_DIR_VAR: &str = "SDE_LOG_DIR";

fn main() {
    let opts: Opts = Opts::parse();

    let log_file = configure_logging(&opts);
    if let Err(err) = run(opts, log_file) {
        error!("{err:#}");
        eprintln!("ERROR: {err:#}");
        exit(exit_code(&err));
    }
}

/// 2 for configuration errors, 1 for everything else
fn exit_code(err: &anyhow::Error) -> i32 {
    let configuration = err
        .downcast_ref::<WorklogError>()
        .is_some_and(WorklogError::is_configuration)
        || err
            .downcast_ref::<JiraBuilderError>()
            .is_some_and(JiraBuilderError::is_configuration);
    if configuration {
        2
    } else {
        1
    }
}

fn run(opts: Opts, log_file: Option<PathBuf>) -> Result<()> {
    let Opts {
        cmd,
        debug,
        user,
        ..
    } = opts;

    match cmd {
        Command::Check(check) => {
            let runtime = get_runtime(debug, log_file)?;
            if let OperationResult::Parsed(days) =
                runtime.execute(Operation::Check(Check { file: check.file }))?
            {
                report::print_days(runtime.tables(), &days);
            }
        }
        Command::Diff(Synchronisation { file, worker, .. }) => {
            let worker = worker_name(&worker, user.as_deref())?;
            let runtime = get_remote_runtime(debug, log_file, user.as_deref())?;
            if let OperationResult::Diffed(changes) =
                runtime.execute(Operation::Diff(Diff { file, worker }))?
            {
                report::print_diff(runtime.tables(), &changes);
            }
        }
        Command::Sync(Synchronisation {
            file,
            worker,
            dry_run,
        }) => {
            let worker = worker_name(&worker, user.as_deref())?;
            let runtime = get_remote_runtime(debug, log_file, user.as_deref())?;
            if let OperationResult::Synchronised(sync_report) =
                runtime.execute(Operation::Sync(Sync {
                    file,
                    worker,
                    dry_run,
                }))?
            {
                report::print_sync_report(runtime.tables(), &sync_report);
            }
        }
        Command::Show(show) => {
            let today = Local::now().date_naive();
            let from = match &show.from {
                Some(s) => date::parse_date(s, today)?,
                None => date::first_date_in_week_for(today),
            };
            let to = match &show.to {
                Some(s) => date::parse_date(s, today)?,
                None => today,
            };
            let worker = worker_name(&show.worker, user.as_deref())?;
            let runtime = get_remote_runtime(debug, log_file, user.as_deref())?;
            if let OperationResult::Entries(days) =
                runtime.execute(Operation::Show(Show { worker, from, to }))?
            {
                if show.weekly {
                    report::print_weekly_table(&days);
                } else {
                    report::print_days(runtime.tables(), &days);
                }
            }
        }
        Command::Issue(issue) => {
            let jira = jira_client(user.as_deref())?;
            commands::issue::execute(&jira, issue.cmd)?;
        }
        Command::Util(util) => {
            let context = Context::new(env::current_dir()?, debug).with_log_file(log_file);
            commands::util::execute(&context, util.cmd)?;
        }
    }
    Ok(())
}

/// Creates the runtime from `$TEMPI_HOME`, loading the configuration tables
fn get_runtime(debug: bool, log_file: Option<PathBuf>) -> Result<ApplicationRuntime, WorklogError> {
    let context = Context::from_env(debug)?.with_log_file(log_file);
    ApplicationRuntime::builder().context(context).build()
}

/// As [`get_runtime`], with a Jira client. The configuration is loaded
/// before any password is asked for.
fn get_remote_runtime(
    debug: bool,
    log_file: Option<PathBuf>,
    user: Option<&str>,
) -> Result<ApplicationRuntime> {
    let context = Context::from_env(debug)?.with_log_file(log_file);
    let tables = config::load(&context)?;
    let jira = jira_client(user)?;
    Ok(ApplicationRuntime::builder()
        .context(context)
        .tables(tables)
        .client(jira)
        .build()?)
}

/// Connects to `$JIRA_ADDR` with the token in `$JIRA_TOKEN`, or with the
/// password of `user` read from the terminal
fn jira_client(user: Option<&str>) -> Result<Jira> {
    let host = context::required_var(JiraEnvVars::HOST)?;
    let mut builder = Jira::builder().host(host).from_env();
    if !builder.has_credentials() {
        let user = user.context("No JIRA_TOKEN, and no user name given with --user or LOGNAME")?;
        let password = read_password(user)?;
        builder = builder.basic_auth(user, password);
    }
    Ok(builder.build()?)
}

/// Reads the password without echo when standard input is a terminal
fn read_password(user: &str) -> Result<String> {
    eprint!("Password for {user}: ");
    io::stderr().flush()?;

    if !io::stdin().is_terminal() {
        let mut password = String::new();
        io::stdin()
            .lock()
            .read_line(&mut password)
            .context("Unable to read the password")?;
        return Ok(password.trim_end_matches(['\r', '\n']).to_string());
    }

    terminal::enable_raw_mode().context("Unable to switch the terminal to raw mode")?;
    let password = read_hidden_line();
    terminal::disable_raw_mode()?;
    eprintln!();
    password
}

fn read_hidden_line() -> Result<String> {
    let mut password = String::new();
    loop {
        if let Event::Key(key) = event::read()? {
            if password_key(&mut password, key)? {
                return Ok(password);
            }
        }
    }
}

/// Applies one key press to the password being typed. Returns true on Enter.
fn password_key(password: &mut String, key: KeyEvent) -> Result<bool> {
    if key.kind != KeyEventKind::Press {
        return Ok(false);
    }
    match key.code {
        KeyCode::Enter => return Ok(true),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            bail!("Password entry interrupted")
        }
        KeyCode::Esc => bail!("Password entry cancelled"),
        KeyCode::Backspace => {
            password.pop();
        }
        KeyCode::Char(c) => password.push(c),
        _ => {}
    }
    Ok(false)
}

fn worker_name(worker: &Worker, user: Option<&str>) -> Result<String> {
    worker
        .worker
        .as_deref()
        .or(user)
        .map(str::to_string)
        .context("No worker given, use --worker or set TEMPO_WORKER")
}

/// Sends log records to a fresh file per run, echoing info and above to
/// stderr, or everything to stderr with `--stdout-only`. Returns the log
/// file used.
fn configure_logging(opts: &Opts) -> Option<PathBuf> {
    let mut builder = env_logger::Builder::from_env(
        // If nothing else was specified in RUST_LOG, use 'info'
        Env::default().default_filter_or(if opts.debug { "debug" } else { "info" }),
    );

    let log_file = if opts.stdout_only {
        None
    } else {
        match create_log_file(opts.cmd.name()) {
            Ok((path, file)) => {
                builder.target(env_logger::Target::Pipe(Box::new(file)));
                Some(path)
            }
            Err(e) => {
                eprintln!("Logging to standard error, {e:#}");
                None
            }
        }
    };
    if log_file.is_none() {
        builder.target(env_logger::Target::Stderr);
    }

    let to_file = log_file.is_some();
    builder.format(move |buf, record| {
        let initial = record.level().as_str().chars().next().unwrap_or('?');
        let line = format!("{initial} {} {}", now_tstamp(), record.args());
        if echo_to_console(record.level(), to_file) {
            eprintln!("{line}");
        }
        writeln!(buf, "{line}")
    });
    builder.init();

    if let Some(path) = &log_file {
        info!("Logging to {}", path.display());
    }
    debug!("Logging started");
    log_file
}

/// Records going to the log file are also shown on the console from info up
fn echo_to_console(level: Level, to_file: bool) -> bool {
    to_file && level <= Level::Info
}

fn create_log_file(command: &str) -> Result<(PathBuf, File)> {
    let root = match env::var(LOG_DIR_VAR) {
        Ok(dir) => PathBuf::from(dir),
        Err(_) => BaseDirs::new()
            .map(|dirs| dirs.data_local_dir().to_path_buf())
            .with_context(|| format!("{LOG_DIR_VAR} is not set and no home directory was found"))?,
    };
    let dir = root.join("tempi");
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("unable to create {}", dir.display()))?;
    let path = dir.join(format!("{}_tempi_{command}.log", now_tstamp()));
    let file = File::create(&path).with_context(|| format!("unable to create {}", path.display()))?;
    Ok((path, file))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn missing_environment_is_a_configuration_error() {
        let err = anyhow::Error::from(WorklogError::MissingEnvVar("JIRA_ADDR".to_string()));
        assert_eq!(exit_code(&err), 2);

        let err = anyhow::Error::from(JiraBuilderError::EnvVarNotSet("JIRA_ADDR".to_string()));
        assert_eq!(exit_code(&err), 2);
    }

    #[test]
    fn other_errors_exit_with_one() {
        let err = anyhow::Error::from(WorklogError::BadInput("from after to".to_string()));
        assert_eq!(exit_code(&err), 1);
        assert_eq!(exit_code(&anyhow::anyhow!("boom")), 1);
    }

    #[test]
    fn unset_jira_addr_is_reported_before_any_password_prompt() {
        env::remove_var(JiraEnvVars::HOST);
        let err = jira_client(Some("jdoe")).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<WorklogError>(),
            Some(WorklogError::MissingEnvVar(var)) if var == "JIRA_ADDR"
        ));
        assert_eq!(exit_code(&err), 2);
    }

    #[test]
    fn typed_password_is_collected_until_enter() {
        let mut password = String::new();
        for c in "secrex".chars() {
            assert!(!password_key(&mut password, press(KeyCode::Char(c))).unwrap());
        }
        password_key(&mut password, press(KeyCode::Backspace)).unwrap();
        password_key(&mut password, press(KeyCode::Char('t'))).unwrap();

        assert!(password_key(&mut password, press(KeyCode::Enter)).unwrap());
        assert_eq!(password, "secret");
    }

    #[test]
    fn ctrl_c_aborts_password_entry() {
        let mut password = String::new();
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert!(password_key(&mut password, ctrl_c).is_err());
        assert!(password_key(&mut password, press(KeyCode::Esc)).is_err());
    }

    #[test]
    fn console_shows_info_and_above_next_to_the_log_file() {
        assert!(echo_to_console(Level::Info, true));
        assert!(echo_to_console(Level::Error, true));
        assert!(!echo_to_console(Level::Debug, true));
        // with --stdout-only stderr is already the target
        assert!(!echo_to_console(Level::Info, false));
    }
}
