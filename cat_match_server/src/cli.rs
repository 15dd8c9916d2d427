//! The server is configured entirely from the environment. The command line only offers `--version`, and anything
//! else prints the help text along with the current (non-secret) configuration.
use std::{env, env::VarError};

const HELP_TEXT: &str = include_str!("./cli-help.txt");

/// Only these variables are ever printed. `CMS_JWT_SECRET` must never be added here.
const DISPLAY_ENVS: [&str; 9] = [
    "RUST_LOG",
    "CMS_HOST",
    "CMS_PORT",
    "CMS_DATABASE_URL",
    "CMS_MAX_CONNECTIONS",
    "CMS_STORE_TIMEOUT_MS",
    "CMS_RUN_MIGRATIONS",
    "CMS_NOTIFY_WEBHOOK_URL",
    "CMS_EVENT_BUFFER_SIZE",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CliAction {
    Serve,
    Version,
    Help,
}

fn action_for(args: &[String]) -> CliAction {
    match args {
        [] => CliAction::Serve,
        [flag] if flag == "--version" || flag == "-V" => CliAction::Version,
        _ => CliAction::Help,
    }
}

/// Returns true if the command line was handled and the server should not start.
pub fn handle_command_line_args() -> bool {
    let args = env::args().skip(1).collect::<Vec<_>>();
    match action_for(&args) {
        CliAction::Serve => false,
        CliAction::Version => {
            println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
            true
        },
        CliAction::Help => {
            println!("\n{HELP_TEXT}\n");
            display_envs();
            true
        },
    }
}

fn env_value(name: &str) -> String {
    match env::var(name) {
        Ok(s) => s,
        Err(VarError::NotPresent) => "Not set".into(),
        Err(VarError::NotUnicode(s)) => format!("Invalid value: {}", s.to_string_lossy()),
    }
}

fn display_envs() {
    println!("Current environment values (secrets are never shown):");
    for name in DISPLAY_ENVS {
        println!("  {name:<28} {}", env_value(name));
    }
}
