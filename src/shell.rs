//! Interactive shell driving the session flow.
//!
//! The grids-and-tabs presentation of the original desktop app is out of
//! scope here; the shell is the minimal consumer of the catalog state
//! store: connect, inspect, replace collections, save, logout.

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use rustyline::{
    completion::Completer, highlight::Highlighter, history::FileHistory, validate::Validator,
    CompletionType, Config, Editor, Helper,
};

use crate::catalog::{Collection, Record};
use crate::cli_style::{get_styles, print_error, print_key_value, print_success, print_warning};
use crate::config::AppConfig;
use crate::credentials::Credentials;
use crate::gateway::GatewayError;
use crate::session::{Session, SessionError, SessionPhase};

const PROMPT: &str = ">> ";

#[derive(Parser)]
#[command(styles=get_styles(), name = "")]
struct InnerCli {
    #[command(subcommand)]
    command: InnerCommand,
}

#[derive(Subcommand)]
enum InnerCommand {
    /// Connects to the remote catalog and loads it. Credentials are
    /// persisted until logout.
    Connect {
        owner: String,
        repository: String,
        catalog_path: String,
        access_token: String,
    },

    /// Shows the session phase, tracked sha and collection sizes.
    Status,

    /// Prints one collection as JSON.
    Show { collection: String },

    /// Replaces one collection with the given JSON array of records.
    /// The change is local until the next save.
    Put { collection: String, records: String },

    /// Writes the whole catalog back as a single commit.
    Save,

    /// Re-fetches the catalog, discarding local edits. The way out of a
    /// stale-sha conflict.
    Reload,

    /// Clears the persisted credentials and discards the session.
    Logout,

    /// Shows the path of the credentials file.
    Where,

    /// Close this program.
    Exit,
}

enum CommandExecutionResult {
    Ok,
    Exit,
    Error(String),
}

fn parse_collection(name: &str) -> Result<Collection, CommandExecutionResult> {
    Collection::from_str(name).ok_or_else(|| {
        CommandExecutionResult::Error(format!(
            "Unknown collection '{}'. Valid collections are: products, categories, events, attributes",
            name
        ))
    })
}

fn print_session_status(session: &Session, config: &AppConfig) {
    print_key_value("phase", session.phase().as_str());
    match &session.state().credentials {
        Some(credentials) => {
            print_key_value(
                "remote",
                &format!(
                    "{}/{}/{}",
                    credentials.owner, credentials.repository, credentials.catalog_path
                ),
            );
        }
        None => print_key_value("remote", "(not connected)"),
    }
    print_key_value("sha", session.state().sha.as_deref().unwrap_or("(none)"));
    if let Some(document) = &session.state().document {
        for collection in Collection::ALL {
            print_key_value(
                collection.as_str(),
                &format!("{} records", document.collection(collection).len()),
            );
        }
    }
    print_key_value("api", &config.api_url);
}

fn report_session_error(err: &SessionError) -> CommandExecutionResult {
    if let SessionError::Gateway(GatewayError::Conflict) = err {
        print_warning("The remote catalog changed since it was loaded.");
        print_warning("Run 'reload' and re-apply your edits, then save again.");
    }
    CommandExecutionResult::Error(format!("{}", err))
}

async fn execute_command(
    line: String,
    session: &mut Session,
    config: &AppConfig,
) -> CommandExecutionResult {
    if line.is_empty() {
        return CommandExecutionResult::Ok;
    }

    let args =
        shlex::split(&line).unwrap_or_else(|| line.split_whitespace().map(String::from).collect());

    let cli = InnerCli::try_parse_from(std::iter::once(" ").chain(args.iter().map(String::as_str)));

    match cli {
        Ok(cli) => {
            println!("{} {}", PROMPT, &line);
            match cli.command {
                InnerCommand::Connect {
                    owner,
                    repository,
                    catalog_path,
                    access_token,
                } => {
                    let credentials = Credentials {
                        owner,
                        repository,
                        catalog_path,
                        access_token,
                    };
                    match session.connect(credentials).await {
                        Ok(()) => {
                            let count = session
                                .state()
                                .document
                                .as_ref()
                                .map(|d| d.records_count())
                                .unwrap_or(0);
                            print_success(&format!("Connected, loaded {} records", count));
                        }
                        Err(err) => return report_session_error(&err),
                    }
                }
                InnerCommand::Status => print_session_status(session, config),
                InnerCommand::Show { collection } => {
                    let collection = match parse_collection(&collection) {
                        Ok(c) => c,
                        Err(result) => return result,
                    };
                    match session.state().records(collection) {
                        Some(records) => match serde_json::to_string_pretty(records) {
                            Ok(json) => println!("{}", json),
                            Err(err) => return CommandExecutionResult::Error(format!("{}", err)),
                        },
                        None => return CommandExecutionResult::Error(
                            "No catalog loaded, connect first".to_string(),
                        ),
                    }
                }
                InnerCommand::Put {
                    collection,
                    records,
                } => {
                    let collection = match parse_collection(&collection) {
                        Ok(c) => c,
                        Err(result) => return result,
                    };
                    let records: Vec<Record> = match serde_json::from_str(&records) {
                        Ok(records) => records,
                        Err(err) => {
                            return CommandExecutionResult::Error(format!(
                                "Expected a JSON array of objects: {}",
                                err
                            ))
                        }
                    };
                    let count = records.len();
                    if let Err(err) = session.update_collection(collection, records) {
                        return report_session_error(&err);
                    }
                    print_success(&format!(
                        "Replaced '{}' with {} records (unsaved)",
                        collection, count
                    ));
                }
                InnerCommand::Save => match session.save().await {
                    Ok(sha) => print_success(&format!("Saved, new sha {}", sha)),
                    Err(err) => return report_session_error(&err),
                },
                InnerCommand::Reload => match session.reload().await {
                    Ok(()) => {
                        print_success(&format!(
                            "Reloaded, sha {}",
                            session.state().sha.as_deref().unwrap_or("(none)")
                        ));
                    }
                    Err(err) => return report_session_error(&err),
                },
                InnerCommand::Logout => match session.logout() {
                    Ok(()) => print_success("Logged out, credentials cleared"),
                    Err(err) => return report_session_error(&err),
                },
                InnerCommand::Where => {
                    println!("{}", config.credentials_path.display());
                }
                InnerCommand::Exit => return CommandExecutionResult::Exit,
            }
        }

        Err(e) => {
            if e.print().is_err() {
                println!("{}", e);
            }
        }
    }
    CommandExecutionResult::Ok
}

#[derive(rustyline_derive::Hinter)]
struct ShellHelper {
    commands_names: Vec<String>,
}

impl ShellHelper {
    pub fn new() -> Self {
        let commands_names: Vec<String> = InnerCli::command()
            .get_subcommands()
            .map(|sc| sc.get_name().to_string())
            .collect();

        ShellHelper { commands_names }
    }
}

impl Completer for ShellHelper {
    type Candidate = String;

    fn complete(
        &self,
        line: &str,
        _pos: usize,
        _ctx: &rustyline::Context<'_>,
    ) -> rustyline::Result<(usize, Vec<String>)> {
        if line.contains(" ") {
            return Ok((0, Vec::with_capacity(0)));
        }
        let matches = self
            .commands_names
            .iter()
            .filter(|c| c.starts_with(line))
            .map(|c| c.to_string())
            .collect::<Vec<_>>();

        Ok((0, matches))
    }
}

impl Highlighter for ShellHelper {}
impl Validator for ShellHelper {}
impl Helper for ShellHelper {}

/// Runs the interactive loop until exit or EOF.
pub async fn run(session: &mut Session, config: &AppConfig) -> Result<()> {
    InnerCli::command().print_long_help()?;

    if session.phase() == SessionPhase::Unauthenticated {
        println!();
        print_warning("Not connected. Use 'connect <owner> <repository> <catalog-path> <access-token>'.");
    }

    let rl_config = Config::builder()
        .completion_type(CompletionType::List)
        .build();

    let mut rl = Editor::<ShellHelper, FileHistory>::with_config(rl_config)?;

    let helper = ShellHelper::new();
    rl.set_helper(Some(helper));

    loop {
        let readline = rl.readline(PROMPT);

        match readline {
            Ok(line) => {
                let _ = rl.add_history_entry(&line);
                match execute_command(line, session, config).await {
                    CommandExecutionResult::Ok => {}
                    CommandExecutionResult::Exit => {
                        break;
                    }
                    CommandExecutionResult::Error(err) => {
                        print_error(&err);
                        continue;
                    }
                }
            }
            Err(rustyline::error::ReadlineError::Interrupted) => {
                println!("CTRL-C");
                break;
            }
            Err(rustyline::error::ReadlineError::Eof) => {
                println!("CTRL-D: exiting.");
                break;
            }
            Err(e) => {
                println!("Error: {:?}", e);
                break;
            }
        }
    }
    Ok(())
}
