use anyhow::Result;
use clap::Subcommand;
use clap_complete::Shell;
use std::path::PathBuf;

use crate::{
    config::{load_config, Config, HttpClientKind},
    credentials::CredentialSources,
    identifier::AppSpec,
    session::Session,
    transport::{CurlTransport, NativeTransport, Transport},
    ConnectionArgs,
};

pub mod completions;
pub mod get;
pub mod list;
pub mod new_version;
pub mod remove_version;
pub mod set;
pub mod status;
pub mod upload;

/// How a command that ran to completion went
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    Success,
    /// The command finished without doing what was asked (exit code 1)
    Failed,
}

const APP_HELP: &str =
    "The App: [UCS_VERSION/]APP_ID[=APP_VERSION]. Optional params do not always make sense.";

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(about = "Lists all Apps")]
    List {
        /// Output JSON, easily parsable
        #[arg(long)]
        json: bool,
    },
    #[command(
        about = "Lists available versions, their status, etc. in the Univention App Center Provider Portal"
    )]
    Status {
        #[arg(help = APP_HELP)]
        app: AppSpec,
    },
    #[command(
        about = "Copy an App",
        long_about = "Copy an existing App to a new UCS version or to become a new App version."
    )]
    NewVersion {
        #[arg(help = APP_HELP)]
        app: AppSpec,
        /// The new App: UCS_VERSION/APP_ID=APP_VERSION. UCS_VERSION and APP_VERSION are
        /// important for the new version to be created. APP_ID is not considered.
        new_app: Option<AppSpec>,
        /// Component of the new App. If not given, a new one will be created.
        /// Useful when juggling with Apps in multiple UCS versions.
        #[arg(long)]
        new_component: Option<String>,
    },
    #[command(about = "Remove an app version")]
    RemoveVersion {
        #[arg(help = APP_HELP)]
        app: AppSpec,
    },
    #[command(about = "Uploads an App to the Univention App Center Self Service")]
    Upload {
        #[arg(help = APP_HELP)]
        app: AppSpec,
        /// List of files to upload. For most files, they need to be named after their type, or
        /// have it as extension. Images / Logos need to be named exactly as in the ini file.
        /// Example: "README_EN"; "myapp.ini"; "app.tar.gz"; "my-screenshot.png"
        #[arg(required = true)]
        uploads: Vec<PathBuf>,
        /// Do not clear packages with the same name (but a different version) as the uploaded
        /// packages. Clearing only works for "deb" (and deb in "tar.gz") uploads
        #[arg(long)]
        dont_clear: bool,
        #[arg(long, hide = true)]
        upload_packages_although_published: bool,
    },
    #[command(
        about = "Get attributes of an App",
        long_about = "Gets attributes and/or file contents of App. NOTE: The name of the keys and the semantics of the values are quite internal.\n\nExample: appcenter-selfservice get myapp=1.0 --json | jq -r .name"
    )]
    Get {
        #[arg(help = APP_HELP)]
        app: AppSpec,
        /// Format is JSON
        #[arg(long, required = true)]
        json: bool,
    },
    #[command(
        about = "Set attributes of an App",
        long_about = "Changes attributes and/or file contents of App. NOTE: The name of the keys and the semantics of the values are quite internal. You can also use the \"get\" subcommand to get an idea how the input should look like.\n\nExample: appcenter-selfservice set myapp=1.0 --json '{\"version\": \"1.1\", \"docker_image\": \"myimage:1.1\"}'"
    )]
    Set {
        #[arg(help = APP_HELP)]
        app: AppSpec,
        /// Apply these CHANGES to the APP
        changes: String,
        /// Format is JSON
        #[arg(long, required = true)]
        json: bool,
    },
    #[command(about = "Emit shell completion scripts")]
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

impl Commands {
    /// Commands whose stdout is meant for machines log no request lines
    pub fn is_quiet(&self) -> bool {
        matches!(self, Commands::List { json: true } | Commands::Get { .. })
    }
}

/// Build a session from flags and config, then run `cmd` with it
pub async fn run(cmd: Commands, conn: &ConnectionArgs) -> Result<CommandOutcome> {
    if let Commands::Completions { shell } = cmd {
        completions::run(shell);
        return Ok(CommandOutcome::Success);
    }

    let config = load_config()?;
    let server = conn
        .server
        .clone()
        .unwrap_or_else(|| config.server().to_string());
    let sources = CredentialSources::new(
        conn.username.clone(),
        conn.password.clone(),
        conn.pwdfile.clone(),
        conn.noninteractive,
        &config,
    );

    match conn.http_client.or(config.http_client).unwrap_or_default() {
        HttpClientKind::Curl => {
            let transport = CurlTransport::new(config.curl_path());
            run_with(cmd, &mut session(transport, server, sources, &config)).await
        }
        HttpClientKind::Native => {
            let transport = NativeTransport::new()?;
            run_with(cmd, &mut session(transport, server, sources, &config)).await
        }
    }
}

fn session<T: Transport>(
    transport: T,
    server: String,
    sources: CredentialSources,
    config: &Config,
) -> Session<T> {
    Session::new(transport, server, sources, config.default_ucs_version())
}

/// Dispatch `cmd` on an already configured session.
///
/// Quietness is applied before anything is sent, so it covers the login too.
pub async fn run_with<T: Transport>(
    cmd: Commands,
    session: &mut Session<T>,
) -> Result<CommandOutcome> {
    session.quiet = cmd.is_quiet();
    match cmd {
        Commands::List { json } => list::run(session, json).await,
        Commands::Status { app } => status::run(session, &app).await,
        Commands::NewVersion {
            app,
            new_app,
            new_component,
        } => {
            new_version::run(session, &app, new_app.as_ref(), new_component.as_deref())
                .await
                .map(|_| CommandOutcome::Success)
        }
        Commands::RemoveVersion { app } => remove_version::run(session, &app).await,
        Commands::Upload {
            app,
            uploads,
            dont_clear,
            upload_packages_although_published,
        } => {
            let options = upload::UploadOptions {
                clear: !dont_clear,
                force: upload_packages_although_published,
            };
            upload::run(session, &app, &uploads, options).await
        }
        Commands::Get { app, .. } => get::run(session, &app).await.map(|_| CommandOutcome::Success),
        Commands::Set { app, changes, .. } => set::run(session, &app, &changes).await,
        Commands::Completions { shell } => {
            completions::run(shell);
            Ok(CommandOutcome::Success)
        }
    }
}
