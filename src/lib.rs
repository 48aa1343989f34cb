//! # App Center Self Service client library
//!
//! Core functionality behind the `appcenter-selfservice` command-line tool.

use clap::{Args, Parser};
use std::path::PathBuf;

use crate::config::HttpClientKind;

pub mod app;
pub mod commands;
pub mod config;
pub mod constants;
pub mod credentials;
pub mod error;
pub mod identifier;
pub mod logging;
pub mod session;
pub mod transport;
pub mod version;

/// Manage Apps in the Univention App Center Self Service
///
/// Lists, copies, removes and edits App versions in the App Provider Portal
/// and uploads their files.
#[derive(Parser, Debug)]
#[command(
    name = "appcenter-selfservice",
    version,
    about = "Program to use the Univention App Center Self Service",
    long_about = "Program to use the Univention App Center Self Service.\n\nType appcenter-selfservice <action> --help for further help and possible arguments."
)]
pub struct Cli {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub cmd: Option<commands::Commands>,
}

/// Where to connect and as whom
#[derive(Args, Debug, Clone, Default)]
pub struct ConnectionArgs {
    /// The server to talk to
    #[arg(long, global = true)]
    pub server: Option<String>,

    /// The username used for registering the app
    #[arg(long, global = true)]
    pub username: Option<String>,

    /// Filename containing the password for registering the app. See --username
    #[arg(long, global = true, value_name = "FILE")]
    pub pwdfile: Option<PathBuf>,

    #[arg(long, global = true, hide = true)]
    pub password: Option<String>,

    /// Do not prompt for anything
    #[arg(long, global = true)]
    pub noninteractive: bool,

    /// HTTP client performing the requests
    #[arg(long, global = true, value_enum)]
    pub http_client: Option<HttpClientKind>,
}
