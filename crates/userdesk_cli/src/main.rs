//! `userdesk` terminal front-end.
//!
//! # Responsibility
//! - Resolve settings, open the store once, and dispatch one command.
//! - Reject blank form input before it reaches the core.
//! - Render repository results as a table, notices or JSON.

mod cli;
mod render;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Args, Command};
use log::warn;
use render::{describe_user, outcome_json, render_table, require_fields};
use serde::Serialize;
use std::io::Write;
use std::process::ExitCode;
use userdesk_core::{
    flush_logging, init_logging, init_stderr_logging, DeleteOutcome, Settings,
    SqliteUserRepository, StoreOptions, UpdateOutcome, UserId, UserRepository, UserService,
    UserStore,
};

/// Exit code for input rejected at the form boundary.
const EXIT_INVALID_INPUT: u8 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CliStatus {
    Done,
    InvalidInput,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let result = run(args);
    flush_logging();

    match result {
        Ok(CliStatus::Done) => ExitCode::SUCCESS,
        Ok(CliStatus::InvalidInput) => ExitCode::from(EXIT_INVALID_INPUT),
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<CliStatus> {
    let settings = Settings::from_env(args.database_url.as_deref())?;
    start_logging(&args, &settings);

    let location = settings.store_location()?;
    let store = UserStore::open(
        location,
        StoreOptions {
            echo_sql: args.echo_sql,
        },
    )
    .context("failed to open user store")?;
    let repo = SqliteUserRepository::try_new(&store).context("user store is not usable")?;
    let service = UserService::new(repo);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    dispatch(&service, args.command, args.json, &mut out)
}

/// File logging when a log dir is configured, stderr when only `--echo-sql`
/// asks for output, nothing otherwise.
fn start_logging(args: &Args, settings: &Settings) {
    let level = effective_log_level(&settings.log_level, args.echo_sql);
    let result = match args.log_dir.as_ref().or(settings.log_dir.as_ref()) {
        Some(log_dir) => init_logging(level, log_dir),
        None if args.echo_sql => init_stderr_logging(level),
        None => return,
    };
    if let Err(err) = result {
        eprintln!("warning: logging disabled: {err}");
    }
}

/// SQL echo is emitted at debug level, so `--echo-sql` lifts coarser levels.
fn effective_log_level(configured: &str, echo_sql: bool) -> &str {
    let verbose = matches!(
        configured.trim().to_ascii_lowercase().as_str(),
        "trace" | "debug"
    );
    if echo_sql && !verbose {
        "debug"
    } else {
        configured
    }
}

fn dispatch<R: UserRepository>(
    service: &UserService<R>,
    command: Command,
    json: bool,
    out: &mut impl Write,
) -> Result<CliStatus> {
    match command {
        Command::List => {
            let table = service.snapshot()?;
            if json {
                write_json(out, &table)?;
            } else {
                write!(out, "{}", render_table(&table))?;
            }
        }
        Command::Show { id } => match service.get_user(id)? {
            Some(user) if json => write_json(out, &user)?,
            Some(user) => writeln!(out, "{}", describe_user(&user))?,
            None => write_not_found(out, id, json)?,
        },
        Command::Add { name, email } => {
            let Ok((name, email)) = require_fields(&name, &email) else {
                return Ok(reject_form());
            };
            let user = service.add_user(name, email)?;
            if json {
                write_json(out, &user)?;
            } else {
                writeln!(out, "Added: {}", describe_user(&user))?;
            }
        }
        Command::Edit { id, name, email } => {
            let Ok((name, email)) = require_fields(&name, &email) else {
                return Ok(reject_form());
            };
            match service.edit_user(id, name, email)? {
                UpdateOutcome::Updated(user) if json => write_json(out, &user)?,
                UpdateOutcome::Updated(user) => {
                    writeln!(out, "Updated: {}", describe_user(&user))?
                }
                UpdateOutcome::NotFound(id) => {
                    warn!("event=cli_edit module=cli status=not_found id={id}");
                    write_not_found(out, id, json)?;
                }
            }
        }
        Command::Delete { id } => match service.remove_user(id)? {
            DeleteOutcome::Deleted(id) if json => {
                write_json(out, &outcome_json("deleted", id))?
            }
            DeleteOutcome::Deleted(id) => writeln!(out, "Deleted user #{id}")?,
            DeleteOutcome::NotFound(id) => {
                warn!("event=cli_delete module=cli status=not_found id={id}");
                write_not_found(out, id, json)?;
            }
        },
    }

    Ok(CliStatus::Done)
}

fn write_json(out: &mut impl Write, value: &impl Serialize) -> Result<()> {
    writeln!(out, "{}", serde_json::to_string_pretty(value)?)?;
    Ok(())
}

fn write_not_found(out: &mut impl Write, id: UserId, json: bool) -> Result<()> {
    if json {
        write_json(out, &outcome_json("not_found", id))
    } else {
        writeln!(out, "no user with id {id}")?;
        Ok(())
    }
}

fn reject_form() -> CliStatus {
    eprintln!("{}", render::MissingFields);
    CliStatus::InvalidInput
}

#[cfg(test)]
mod tests {
    use super::{dispatch, effective_log_level, CliStatus, Command};
    use userdesk_core::{SqliteUserRepository, UserRepository, UserService, UserStore};

    fn run_command<R: UserRepository>(
        service: &UserService<R>,
        command: Command,
        json: bool,
    ) -> (CliStatus, String) {
        let mut out = Vec::new();
        let status = dispatch(service, command, json, &mut out).expect("dispatch should not fail");
        (status, String::from_utf8(out).expect("output should be utf-8"))
    }

    #[test]
    fn blank_form_input_is_rejected_without_store_writes() {
        let store = UserStore::open_in_memory().expect("memory store should open");
        let service =
            UserService::new(SqliteUserRepository::try_new(&store).expect("repo should build"));

        let (status, output) = run_command(
            &service,
            Command::Add {
                name: "  ".to_string(),
                email: "a@x".to_string(),
            },
            false,
        );

        assert_eq!(status, CliStatus::InvalidInput);
        assert!(output.is_empty());
        let repo = SqliteUserRepository::try_new(&store).expect("repo should build");
        assert_eq!(repo.count_users().expect("count should succeed"), 0);
    }

    #[test]
    fn add_edit_delete_commands_mutate_the_store() {
        let store = UserStore::open_in_memory().expect("memory store should open");
        let service =
            UserService::new(SqliteUserRepository::try_new(&store).expect("repo should build"));

        let add = Command::Add {
            name: " Ana ".to_string(),
            email: "ana@x.com".to_string(),
        };
        let (status, output) = run_command(&service, add, false);
        assert_eq!(status, CliStatus::Done);
        let created = service.list_users().expect("list should succeed");
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].name, "Ana");
        assert_eq!(output, format!("Added: #{} Ana <ana@x.com>\n", created[0].id));

        let edit = Command::Edit {
            id: created[0].id,
            name: "Ana B".to_string(),
            email: "ana@x.com".to_string(),
        };
        run_command(&service, edit, true);
        assert_eq!(
            service
                .get_user(created[0].id)
                .expect("get should succeed")
                .map(|user| user.name),
            Some("Ana B".to_string())
        );

        let (status, output) = run_command(&service, Command::Delete { id: 999 }, false);
        assert_eq!(status, CliStatus::Done);
        assert_eq!(output, "no user with id 999\n");

        let (_, output) = run_command(&service, Command::Delete { id: created[0].id }, false);
        assert_eq!(output, format!("Deleted user #{}\n", created[0].id));
        assert!(service.list_users().expect("list should succeed").is_empty());
    }

    #[test]
    fn json_mode_reports_missing_and_deleted_ids_as_json() {
        let store = UserStore::open_in_memory().expect("memory store should open");
        let service =
            UserService::new(SqliteUserRepository::try_new(&store).expect("repo should build"));
        let user = service
            .add_user("Ana", "ana@x.com")
            .expect("add should succeed");

        let edit = Command::Edit {
            id: 99,
            name: "Bo".to_string(),
            email: "bo@x.com".to_string(),
        };
        let missing = [edit, Command::Show { id: 99 }, Command::Delete { id: 99 }];
        for command in missing {
            let (status, output) = run_command(&service, command, true);
            assert_eq!(status, CliStatus::Done);
            let value: serde_json::Value =
                serde_json::from_str(&output).expect("output should be json");
            assert_eq!(value["status"], "not_found");
            assert_eq!(value["id"], 99);
        }

        let (_, output) = run_command(&service, Command::Delete { id: user.id }, true);
        let value: serde_json::Value =
            serde_json::from_str(&output).expect("output should be json");
        assert_eq!(value["status"], "deleted");
        assert_eq!(value["id"], user.id);
    }

    #[test]
    fn echo_sql_lifts_coarse_log_levels_to_debug() {
        assert_eq!(effective_log_level("info", true), "debug");
        assert_eq!(effective_log_level("warn", true), "debug");
        assert_eq!(effective_log_level("trace", true), "trace");
        assert_eq!(effective_log_level("info", false), "info");
    }
}
