use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use adminauth::config::{load_config, schema_json, StoreBackend};
use adminauth::guard::GuardDecision;
use adminauth::navigation::HistoryNavigator;
use adminauth::startup;
use adminauth::utils::logger::init_logging;
use clap::{Parser, Subcommand};
use tracing::{error, warn};

const PASSWORD_ENV: &str = "ADMINAUTH_PASSWORD";

/// Command-line driver for the admin panel's session layer.
#[derive(Debug, Parser)]
#[command(version)]
struct Args {
    /// Configuration file; defaults to ./config.yaml.
    #[arg(long, short)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the JSON schema of the configuration file.
    Schema,
    #[command(flatten)]
    Session(SessionCommand),
}

/// Commands that need configuration and a running client.
#[derive(Debug, Subcommand)]
enum SessionCommand {
    /// Log in; the password is read from ADMINAUTH_PASSWORD.
    Login { email: String },
    /// Log out and clear the persisted token.
    Logout,
    /// Print the signed-in administrator's profile.
    Profile,
    /// Show where the route guard sends a navigation to PATH.
    Guard { path: String },
}

fn print_schema() -> ExitCode {
    match schema_json() {
        Ok(schema) => {
            println!("{}", schema);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Could not render schema: {}", e);
            ExitCode::FAILURE
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let command = match args.command {
        Command::Schema => return print_schema(),
        Command::Session(command) => command,
    };

    let config = match load_config(args.config.as_deref()) {
        Ok(config) => Arc::new(config),
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = init_logging(&config.logging) {
        eprintln!("{}", e);
        return ExitCode::FAILURE;
    }
    if config.store.backend == StoreBackend::Memory {
        warn!("Token store is in-memory; the session ends with this process.");
    }

    let navigator = Arc::new(HistoryNavigator::new());
    let app = match startup::build(config, navigator.clone()) {
        Ok(app) => app,
        Err(e) => {
            error!("Failed to initialise: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match command {
        SessionCommand::Login { email } => {
            let Ok(password) = std::env::var(PASSWORD_ENV) else {
                eprintln!("Set {} to the account password.", PASSWORD_ENV);
                return ExitCode::FAILURE;
            };
            match app.sessions.login(&email, &password).await {
                Ok(_) => println!("Logged in as {}.", email),
                Err(e) => {
                    eprintln!("{}", e.payload());
                    return ExitCode::FAILURE;
                }
            }
        }
        SessionCommand::Logout => {
            app.sessions.logout().await;
            println!("Logged out.");
        }
        SessionCommand::Profile => {
            app.profile.fetch_profile().await;
            let state = app.profile.snapshot();
            match (state.profile, state.error) {
                (Some(profile), _) => match serde_json::to_string_pretty(&profile) {
                    Ok(json) => println!("{}", json),
                    Err(e) => {
                        eprintln!("{}", e);
                        return ExitCode::FAILURE;
                    }
                },
                (None, error) => {
                    eprintln!("{}", error.unwrap_or_else(|| "Not logged in.".to_string()));
                    return ExitCode::FAILURE;
                }
            }
        }
        SessionCommand::Guard { path } => match app.guard.before_each(&path).await {
            GuardDecision::Allow(route) => println!("allow {} ({})", route.path, route.name),
            GuardDecision::Redirect(to) => println!("redirect {}", to),
        },
    }

    ExitCode::SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_is_parsed_apart_from_session_commands() {
        let args = Args::try_parse_from(["adminauth", "schema"]).unwrap();
        assert!(matches!(args.command, Command::Schema));

        let args = Args::try_parse_from(["adminauth", "-c", "admin.yaml", "login", "a@b.com"]).unwrap();
        assert_eq!(args.config, Some(PathBuf::from("admin.yaml")));
        match args.command {
            Command::Session(SessionCommand::Login { email }) => assert_eq!(email, "a@b.com"),
            other => panic!("expected login, got {:?}", other),
        }

        let args = Args::try_parse_from(["adminauth", "guard", "/orders/7"]).unwrap();
        assert!(matches!(
            args.command,
            Command::Session(SessionCommand::Guard { ref path }) if path == "/orders/7"
        ));
    }
}
