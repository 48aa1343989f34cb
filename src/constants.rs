/// Server used when neither the command line nor the config file names one.
pub const DEFAULT_SERVER: &str = "provider-portal.software-univention.de";

/// UCS version assumed for identifiers that do not carry one.
pub const DEFAULT_UCS_VERSION: &str = "4.1";

/// API level this client speaks. The server reports its own level via the `api` command.
pub const API_LEVEL: i64 = 5;

/// Maximum number of bytes sent in a single upload request.
pub const UPLOAD_LIMIT: u64 = 1024 * 1024 * 250;

/// Legacy dotfile (relative to `$HOME`) holding the username.
pub const USER_DOTFILE: &str = ".univention-appcenter-user";

/// Legacy dotfile (relative to `$HOME`) holding the password.
pub const PASSWORD_DOTFILE: &str = ".univention-appcenter-pwd";

/// Environment variable pointing at an alternative config file.
pub const CONFIG_PATH_ENV: &str = "APPCENTER_SELFSERVICE_CONFIG";

pub const COMMAND_PATH: &str = "command/appcenter-selfservice";
pub const UPLOAD_PATH: &str = "upload/appcenter-selfservice/upload";

pub const HEADER_REQUESTED_WITH: (&str, &str) = ("X-Requested-With", "XmlHttpRequest");
pub const HEADER_ACCEPT: (&str, &str) = ("Accept", "application/json; q=1");

/// Process exit code for commands that aborted.
pub const EXIT_ABORT: i32 = 10;
/// Process exit code for commands that ran but reported failure.
pub const EXIT_FAILED: i32 = 1;
