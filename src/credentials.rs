//! Username and password resolution.
//!
//! Username: `--username`, then `~/.univention-appcenter-user`, then the config
//! file, then an interactive prompt. Password: `--password`, then `--pwdfile`,
//! then `~/.univention-appcenter-pwd`, then the config file's `pwdfile`, then
//! a hidden prompt.

use anyhow::{Context, Result};
use dialoguer::{Input, Password};
use std::{fs, path::PathBuf};

use crate::{
    config::Config,
    constants::{PASSWORD_DOTFILE, USER_DOTFILE},
    error::SelfServiceError,
};

#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Source of interactively entered credentials
pub trait Prompt {
    fn username(&self) -> Result<String>;
    fn password(&self, username: &str) -> Result<String>;
}

/// Prompts on the controlling terminal
pub struct TerminalPrompt;

impl Prompt for TerminalPrompt {
    fn username(&self) -> Result<String> {
        let username: String = Input::new()
            .with_prompt("Username")
            .allow_empty(true)
            .interact_text()
            .map_err(|_| SelfServiceError::Cancelled)?;
        if username.is_empty() {
            return Err(SelfServiceError::Cancelled.into());
        }
        Ok(username)
    }

    fn password(&self, username: &str) -> Result<String> {
        Ok(Password::new()
            .with_prompt(format!("Password for {username}"))
            .allow_empty_password(true)
            .interact()
            .map_err(|_| SelfServiceError::Cancelled)?)
    }
}

/// Everything credentials may be taken from, in precedence order
#[derive(Debug, Clone, Default)]
pub struct CredentialSources {
    pub username: Option<String>,
    pub password: Option<String>,
    pub pwdfile: Option<PathBuf>,
    pub home: Option<PathBuf>,
    pub config_username: Option<String>,
    pub config_pwdfile: Option<PathBuf>,
    pub interactive: bool,
}

impl CredentialSources {
    pub fn new(
        username: Option<String>,
        password: Option<String>,
        pwdfile: Option<PathBuf>,
        noninteractive: bool,
        config: &Config,
    ) -> Self {
        CredentialSources {
            username,
            password,
            pwdfile,
            home: dirs::home_dir(),
            config_username: config.username.clone(),
            config_pwdfile: config.pwdfile.clone(),
            interactive: !noninteractive,
        }
    }

    fn user_dotfile(&self) -> Option<String> {
        let path = self.home.as_ref()?.join(USER_DOTFILE);
        let username = fs::read_to_string(path).ok()?.trim().to_string();
        (!username.is_empty()).then_some(username)
    }

    fn password_dotfile(&self) -> Option<PathBuf> {
        let path = self.home.as_ref()?.join(PASSWORD_DOTFILE);
        path.exists().then_some(path)
    }

    pub fn resolve_username(&self, prompt: &dyn Prompt) -> Result<String> {
        if let Some(username) = self.username.as_ref().filter(|u| !u.is_empty()) {
            return Ok(username.clone());
        }
        if let Some(username) = self.user_dotfile() {
            return Ok(username);
        }
        if let Some(username) = self.config_username.as_ref().filter(|u| !u.is_empty()) {
            return Ok(username.clone());
        }
        if !self.interactive {
            return Err(SelfServiceError::MissingCredentials("username").into());
        }
        prompt.username()
    }

    pub fn resolve_password(&self, username: &str, prompt: &dyn Prompt) -> Result<String> {
        if let Some(password) = self.password.as_ref().filter(|p| !p.is_empty()) {
            return Ok(password.clone());
        }
        let pwdfile = self
            .pwdfile
            .clone()
            .or_else(|| self.password_dotfile())
            .or_else(|| self.config_pwdfile.clone());
        if let Some(path) = pwdfile {
            let password = fs::read_to_string(&path)
                .with_context(|| format!("reading password file {}", path.display()))?;
            return Ok(password.trim_end_matches('\n').to_string());
        }
        if !self.interactive {
            return Err(SelfServiceError::MissingCredentials("password").into());
        }
        prompt.password(username)
    }

    pub fn resolve(&self, prompt: &dyn Prompt) -> Result<Credentials> {
        let username = self.resolve_username(prompt)?;
        let password = self.resolve_password(&username, prompt)?;
        Ok(Credentials { username, password })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use tempfile::TempDir;

    struct FixedPrompt {
        calls: Cell<usize>,
    }

    impl Prompt for FixedPrompt {
        fn username(&self) -> Result<String> {
            self.calls.set(self.calls.get() + 1);
            Ok("prompted-user".into())
        }

        fn password(&self, username: &str) -> Result<String> {
            self.calls.set(self.calls.get() + 1);
            Ok(format!("secret-of-{username}"))
        }
    }

    fn prompt() -> FixedPrompt {
        FixedPrompt {
            calls: Cell::new(0),
        }
    }

    fn sources(home: &TempDir) -> CredentialSources {
        CredentialSources {
            home: Some(home.path().to_path_buf()),
            interactive: true,
            ..Default::default()
        }
    }

    #[test]
    fn flags_win() {
        let home = TempDir::new().unwrap();
        fs::write(home.path().join(USER_DOTFILE), "dotfile-user\n").unwrap();
        let mut src = sources(&home);
        src.username = Some("flag-user".into());
        src.password = Some("flag-pw".into());

        let p = prompt();
        let creds = src.resolve(&p).unwrap();
        assert_eq!(creds.username, "flag-user");
        assert_eq!(creds.password, "flag-pw");
        assert_eq!(p.calls.get(), 0);
    }

    #[test]
    fn dotfiles_before_config() {
        let home = TempDir::new().unwrap();
        fs::write(home.path().join(USER_DOTFILE), "  dotfile-user \n").unwrap();
        fs::write(home.path().join(PASSWORD_DOTFILE), "dot pw\n\n").unwrap();
        let mut src = sources(&home);
        src.config_username = Some("config-user".into());

        let creds = src.resolve(&prompt()).unwrap();
        assert_eq!(creds.username, "dotfile-user");
        assert_eq!(creds.password, "dot pw");
    }

    #[test]
    fn explicit_pwdfile_beats_dotfile() {
        let home = TempDir::new().unwrap();
        fs::write(home.path().join(PASSWORD_DOTFILE), "dot pw").unwrap();
        let explicit = home.path().join("explicit");
        fs::write(&explicit, "explicit pw\n").unwrap();
        let mut src = sources(&home);
        src.username = Some("u".into());
        src.pwdfile = Some(explicit);

        assert_eq!(src.resolve(&prompt()).unwrap().password, "explicit pw");
    }

    #[test]
    fn config_used_when_nothing_else() {
        let home = TempDir::new().unwrap();
        let pwdfile = home.path().join("cfg-pw");
        fs::write(&pwdfile, "cfg pw").unwrap();
        let mut src = sources(&home);
        src.config_username = Some("config-user".into());
        src.config_pwdfile = Some(pwdfile);

        let creds = src.resolve(&prompt()).unwrap();
        assert_eq!(creds.username, "config-user");
        assert_eq!(creds.password, "cfg pw");
    }

    #[test]
    fn prompts_when_interactive() {
        let home = TempDir::new().unwrap();
        let p = prompt();
        let creds = sources(&home).resolve(&p).unwrap();
        assert_eq!(creds.username, "prompted-user");
        assert_eq!(creds.password, "secret-of-prompted-user");
        assert_eq!(p.calls.get(), 2);
    }

    #[test]
    fn noninteractive_fails_without_credentials() {
        let home = TempDir::new().unwrap();
        let mut src = sources(&home);
        src.interactive = false;

        let err = src.resolve(&prompt()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SelfServiceError>(),
            Some(SelfServiceError::MissingCredentials("username"))
        ));

        src.username = Some("u".into());
        let err = src.resolve(&prompt()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SelfServiceError>(),
            Some(SelfServiceError::MissingCredentials("password"))
        ));
    }

    #[test]
    fn missing_pwdfile_is_an_error() {
        let home = TempDir::new().unwrap();
        let mut src = sources(&home);
        src.username = Some("u".into());
        src.pwdfile = Some(home.path().join("nope"));
        assert!(src.resolve(&prompt()).is_err());
    }
}
