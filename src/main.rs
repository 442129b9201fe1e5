//! `knightos` command-line entry point.
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;

use knightos_sdk::cli::{Cli, Command};
use knightos_sdk::commands;
use knightos_sdk::error::ProvisionError;
use knightos_sdk::logging::{self, Logger};

fn main() -> ExitCode {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = Cli::parse();
    let command = args.command_name();
    logging::init_subscriber(args.verbose, command);
    let log = Arc::new(Logger::new(command));

    let result = match &args.command {
        Command::Init(opts) => commands::init::run(opts, &log),
        Command::Version => {
            print_version();
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<ProvisionError>() {
                Some(err) if err.is_validation() => log.error(&err.to_string()),
                _ => log.error(&format!("{e:#}")),
            }
            ExitCode::FAILURE
        }
    }
}

#[allow(clippy::print_stdout)]
fn print_version() {
    let version = option_env!("KNIGHTOS_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"));
    println!("knightos {version}");
}
