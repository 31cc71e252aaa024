//! `envsetup` binary entry point.
use anyhow::Result;
use clap::Parser;
use std::sync::Arc;

use envsetup::cli::{Cli, Command};
use envsetup::{commands, logging};

fn main() -> Result<()> {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = Cli::parse();
    let command = args.command_or_default();

    match command {
        Command::Completions { shell } => {
            commands::completions::run(shell);
            return Ok(());
        }
        Command::Version => {
            commands::version::run();
            return Ok(());
        }
        Command::Install(_) | Command::Uninstall | Command::Status => {}
    }

    logging::init_subscriber(args.verbose, command.log_name());
    let log = Arc::new(logging::Logger::new(command.log_name()));

    match command {
        Command::Install(opts) => commands::install::run(&args.global, &opts, &log),
        Command::Uninstall => commands::uninstall::run(&args.global, &log),
        Command::Status => commands::status::run(&args.global, &log),
        Command::Completions { .. } | Command::Version => Ok(()),
    }
}
