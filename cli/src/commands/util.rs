use std::collections::BTreeMap;
use std::process::exit;

use anyhow::{bail, Result};
use worklog::context::Context;
use worklog::util::{
    digest,
    json::{self, JsonValidity},
    net, profile,
    shell::{self, Captured, ExecOptions},
};

use crate::cli::UtilCommand;

pub fn execute(context: &Context, cmd: UtilCommand) -> Result<()> {
    match cmd {
        UtilCommand::Digest { file } => {
            println!("{}  {}", digest::sha256_digest(&file)?, file.display());
        }
        UtilCommand::ValidateJson { file, quiet } => {
            let validity = json::validate_json(&file);
            if !quiet {
                match &validity {
                    JsonValidity::Valid => println!("Json file is valid: {}", file.display()),
                    JsonValidity::NotFound => eprintln!("File not found: {}", file.display()),
                    JsonValidity::Invalid(reason) => {
                        eprintln!("Json file is not valid: {}, {reason}", file.display());
                    }
                }
            }
            if validity != JsonValidity::Valid {
                exit(1);
            }
        }
        UtilCommand::Port { host, port } => {
            if net::check_server_port(&host, port) {
                println!("{host}:{port} is open");
            } else {
                println!("{host}:{port} is closed");
                exit(1);
            }
        }
        UtilCommand::Export { profile: name, vars } => {
            let path = profile::profile_path(&name)?;
            profile::set_export(&path, &parse_exports(&vars)?)?;
        }
        UtilCommand::Exec {
            command,
            show,
            save,
            ignore_errors,
            json,
        } => {
            let options = ExecOptions {
                show,
                save,
                ignore_errors,
                json_output: json,
                ..ExecOptions::default()
            };
            let output = shell::exec_cmd(context, &command, &options)?;
            match output.captured {
                Some(Captured::Lines(lines)) => {
                    for line in lines {
                        println!("{line}");
                    }
                }
                Some(Captured::Json(value)) => println!("{}", serde_json::to_string_pretty(&value)?),
                None => {}
            }
            if output.code != 0 {
                exit(output.code);
            }
        }
    }
    Ok(())
}

/// `NAME=value` sets an export, a bare `NAME` removes it
fn parse_exports(vars: &[String]) -> Result<BTreeMap<String, Option<String>>> {
    let mut exports = BTreeMap::new();
    for var in vars {
        let (name, value) = match var.split_once('=') {
            Some((name, value)) => (name, Some(value.to_string())),
            None => (var.as_str(), None),
        };
        if name.is_empty() || name.contains(char::is_whitespace) {
            bail!("Not a variable name: '{name}'");
        }
        exports.insert(name.to_string(), value);
    }
    Ok(exports)
}
