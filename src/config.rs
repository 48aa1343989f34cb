//! Configuration management for the Self Service client
//!
//! Settings come from an optional YAML file, located at
//! `$APPCENTER_SELFSERVICE_CONFIG` or `~/.config/appcenter-selfservice/config.yaml`.
//! Command-line flags and the legacy dotfiles in `$HOME` take precedence over it.
//!
//! ## Environment Variable Expansion
//!
//! The file supports environment variable expansion with the following syntax:
//! - `${VAR}` - Simple substitution
//! - `${VAR:-default}` - Use default if VAR is unset or empty
//! - `${VAR-default}` - Use default if VAR is unset
//! - `${VAR:+alt}` - Use alt if VAR is set and non-empty
//! - `${VAR+alt}` - Use alt if VAR is set

use anyhow::Context;
use clap::ValueEnum;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::{env, fs, path::PathBuf};

use crate::constants::{CONFIG_PATH_ENV, DEFAULT_SERVER, DEFAULT_UCS_VERSION};

/// User configuration loaded from `config.yaml`
///
/// # Example
///
/// ```yaml
/// server: provider-portal.software-univention.de
/// username: ${APPCENTER_USER}
/// pwdfile: ~/.secrets/appcenter-pwd
/// defaultUcsVersion: "5.0"
/// httpClient: curl
/// ```
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Portal host name or URL
    #[serde(default)]
    pub server: Option<String>,
    /// Portal account name
    #[serde(default)]
    pub username: Option<String>,
    /// File containing the portal password
    #[serde(default)]
    pub pwdfile: Option<PathBuf>,
    /// UCS version assumed for app identifiers without one
    #[serde(default)]
    pub default_ucs_version: Option<String>,
    /// Which HTTP client performs the requests
    #[serde(default)]
    pub http_client: Option<HttpClientKind>,
    /// Path to the `curl` executable
    #[serde(default)]
    pub curl_path: Option<PathBuf>,
}

/// HTTP client backends
#[derive(Deserialize, Serialize, Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum HttpClientKind {
    /// Shell out to the `curl` executable
    #[default]
    Curl,
    /// Send requests in-process
    Native,
}

impl Config {
    pub fn server(&self) -> &str {
        self.server.as_deref().unwrap_or(DEFAULT_SERVER)
    }

    pub fn default_ucs_version(&self) -> &str {
        self.default_ucs_version
            .as_deref()
            .unwrap_or(DEFAULT_UCS_VERSION)
    }

    pub fn curl_path(&self) -> PathBuf {
        self.curl_path
            .clone()
            .unwrap_or_else(|| PathBuf::from("curl"))
    }
}

/// Location of the config file, honouring `APPCENTER_SELFSERVICE_CONFIG`
pub fn config_path() -> PathBuf {
    env::var(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let mut p = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
            p.push("appcenter-selfservice/config.yaml");
            p
        })
}

pub fn load_config() -> anyhow::Result<Config> {
    load_config_from(&config_path())
}

/// Load the config at `path`; a missing file yields the defaults
pub fn load_config_from(path: &Path) -> anyhow::Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let data = preprocess_config(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    if data.trim().is_empty() {
        return Ok(Config::default());
    }
    let mut cfg: Config = serde_yaml::from_str(&data)
        .with_context(|| format!("parsing config {}", path.display()))?;
    cfg.pwdfile = cfg.pwdfile.map(|p| expand_home(&p));
    cfg.curl_path = cfg.curl_path.map(|p| expand_home(&p));
    Ok(cfg)
}

/// Replace a leading `~` with the home directory
pub fn expand_home(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), dirs::home_dir()) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}

pub fn expand_env_placeholders(input: &str) -> Result<String, regex::Error> {
    let re = Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?:(:?[-+])([^}]*))?\}")?;
    let expanded = re.replace_all(input, |caps: &regex::Captures| {
        let var_name = &caps[1];
        let op = caps.get(2).map_or("", |m| m.as_str());
        let val = caps.get(3).map_or("", |m| m.as_str());
        let var = env::var(var_name).ok();

        match (var.as_deref(), op) {
            (Some(v), "") => v.to_string(),                      // ${VAR}
            (Some(v), ":-") if !v.is_empty() => v.to_string(), // ${VAR:-default}
            (_, ":-") => val.to_string(),
            (Some(v), "-") => v.to_string(), // ${VAR-default}
            (None, "-") => val.to_string(),
            (Some(v), ":+") if !v.is_empty() => val.to_string(), // ${VAR:+alt}
            (Some(_), "+") => val.to_string(),                   // ${VAR+alt}
            _ => "".to_string(),
        }
    });
    Ok(expanded.into_owned())
}

pub fn preprocess_config(path: &Path) -> anyhow::Result<String> {
    let raw_data = fs::read_to_string(path)?;
    Ok(expand_env_placeholders(&raw_data)?)
}
