//! # appcenter-selfservice
//!
//! Command-line client for the Univention App Center Self Service, the portal
//! where App providers maintain their Apps.
//!
//! ## Quick Start
//!
//! ```bash
//! # List all Apps of your account
//! appcenter-selfservice list
//!
//! # Copy the newest 5.0 version of myapp into a new version
//! appcenter-selfservice new-version 5.0/myapp 5.0/myapp=2.0
//!
//! # Upload files to it
//! appcenter-selfservice upload 5.0/myapp=2.0 myapp.ini README_EN
//! ```
//!
//! Credentials are read from `--username`/`--pwdfile`, from
//! `~/.univention-appcenter-user` and `~/.univention-appcenter-pwd`, from
//! `~/.config/appcenter-selfservice/config.yaml`, or prompted for.

use appcenter_selfservice::{
    commands::{self, CommandOutcome},
    constants::{EXIT_ABORT, EXIT_FAILED},
    error::SelfServiceError,
    logging, Cli,
};
use clap::Parser;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let cmd = cli.cmd.unwrap_or_else(|| {
        eprintln!("No command provided. Use --help to see available commands.");
        std::process::exit(EXIT_FAILED);
    });

    let code = match commands::run(cmd, &cli.connection).await {
        Ok(CommandOutcome::Success) => 0,
        Ok(CommandOutcome::Failed) => EXIT_FAILED,
        Err(err) => {
            if !matches!(
                err.downcast_ref::<SelfServiceError>(),
                Some(SelfServiceError::Cancelled)
            ) {
                eprintln!("Error: {err:#}");
            }
            EXIT_ABORT
        }
    };
    std::process::exit(code);
}
