use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
/// Tempo timesheet utility - check a hand written work log, compare it with
/// and synchronise it to Tempo, and do some Jira housekeeping on the side.
///
/// The work log is a YAML file mapping ISO8601 dates to lists of lines, each
/// line reading `<hours> <work item or issue key> [comment]`:
///
///   2024-01-15:
///     - 1.5 ops deploy of release 7
///     - 2 PROJ-7 implement the parser
///
/// Configuration tables are read from `$TEMPI_HOME/config`. Jira is found
/// through `$JIRA_ADDR`, and `$JIRA_TOKEN` holds a bearer token. Without a
/// token you are asked for the password of `--user`.
#[command(author, version, about)] // Read from Cargo.toml
pub(crate) struct Opts {
    #[command(subcommand)]
    pub cmd: Command,

    /// Log debug output
    #[arg(global = true, long)]
    pub debug: bool,

    /// Log to standard error instead of a log file
    #[arg(global = true, long)]
    pub stdout_only: bool,

    /// User name for basic authentication when JIRA_TOKEN is not set
    #[arg(global = true, long, env = "LOGNAME")]
    pub user: Option<String>,
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// Parse a work log file and list its entries
    Check(Check),
    /// Show how a work log file differs from the timesheet
    Diff(Synchronisation),
    /// Make the timesheet agree with a work log file
    Sync(Synchronisation),
    /// List the timesheet entries of a date range
    Show(Show),
    /// Jira issue housekeeping
    Issue(Issue),
    /// Assorted utilities
    Util(Util),
}

impl Command {
    /// Used to name the log file
    pub fn name(&self) -> &'static str {
        match self {
            Command::Check(_) => "check",
            Command::Diff(_) => "diff",
            Command::Sync(_) => "sync",
            Command::Show(_) => "show",
            Command::Issue(_) => "issue",
            Command::Util(_) => "util",
        }
    }
}

#[derive(Args)]
pub(crate) struct Check {
    /// Work log file
    pub file: PathBuf,
}

#[derive(Args)]
pub(crate) struct Worker {
    /// Tempo worker id, defaults to the user name
    #[arg(short, long, env = "TEMPO_WORKER")]
    pub worker: Option<String>,
}

#[derive(Args)]
pub(crate) struct Synchronisation {
    /// Work log file
    pub file: PathBuf,
    #[command(flatten)]
    pub worker: Worker,
    /// Only report what would be done. Ignored by `diff`
    #[arg(short = 'n', long)]
    pub dry_run: bool,
}

#[derive(Args)]
pub(crate) struct Show {
    /// First day: YYYY-MM-DD, today, yesterday or a weekday name. Defaults to Monday this week
    #[arg(short, long)]
    pub from: Option<String>,
    /// Last day, defaults to today
    #[arg(short, long)]
    pub to: Option<String>,
    #[command(flatten)]
    pub worker: Worker,
    /// Print hours per issue and day, a table for each week
    #[arg(long)]
    pub weekly: bool,
}

#[derive(Args)]
pub(crate) struct Issue {
    #[command(subcommand)]
    pub cmd: IssueCommand,
}

#[derive(Subcommand)]
pub(crate) enum IssueCommand {
    /// Print an issue as JSON
    Get { key: String },
    /// List the issues matching a JQL query
    Search {
        jql: String,
        /// Page size
        #[arg(long, default_value_t = jira::DEFAULT_PAGE_SIZE)]
        max_results: u32,
    },
    /// Create an issue
    Create {
        #[arg(short, long)]
        project: String,
        #[arg(short, long)]
        summary: String,
        #[arg(short = 't', long, default_value = "Task")]
        issue_type: String,
        /// Extra field as name=value, where value is JSON or plain text
        #[arg(short, long, num_args(1..))]
        field: Vec<String>,
    },
    /// Set a single field of an issue. The value is JSON or plain text
    Update {
        key: String,
        field: String,
        value: String,
    },
    /// Assign an issue to a user
    Assign { key: String, user: String },
    /// Add a comment visible to a project role
    Comment {
        key: String,
        body: String,
        #[arg(short, long, default_value = "Developers")]
        role: String,
    },
    /// Link two issues, the parent being the outward end
    Link {
        #[arg(short = 't', long, default_value = "Relates")]
        link_type: String,
        parent: String,
        child: String,
    },
    /// Attach a file to an issue
    Attach {
        key: String,
        file: PathBuf,
        /// File name shown in Jira, defaults to the name of the file
        #[arg(long)]
        name: Option<String>,
    },
    /// List the custom and the system fields
    Fields,
}

#[derive(Args)]
pub(crate) struct Util {
    #[command(subcommand)]
    pub cmd: UtilCommand,
}

#[derive(Subcommand)]
pub(crate) enum UtilCommand {
    /// SHA-256 of a file
    Digest { file: PathBuf },
    /// Check that a file holds valid JSON
    ValidateJson {
        file: PathBuf,
        /// Only report through the exit code
        #[arg(short, long)]
        quiet: bool,
    },
    /// Check whether a TCP port accepts connections
    Port { host: String, port: u16 },
    /// Maintain exports in a shell profile: NAME=value sets, a bare NAME removes
    Export {
        /// Profile file, a bare name is taken relative to $HOME
        profile: String,
        #[arg(required = true, num_args(1..))]
        vars: Vec<String>,
    },
    /// Run a shell command, logging its output
    Exec {
        command: String,
        /// Log output at info level
        #[arg(long)]
        show: bool,
        /// Print the captured output when done
        #[arg(long)]
        save: bool,
        #[arg(long)]
        ignore_errors: bool,
        /// Parse the captured output as JSON
        #[arg(long, requires = "save")]
        json: bool,
    },
}
