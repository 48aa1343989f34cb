use std::{fmt, str::FromStr};

/// An app as named on the command line: `[UCS_VERSION[@SERVER]/]APP_ID[=APP_VERSION]`
///
/// Every part except the app id is optional. A server can only be given
/// together with a UCS version, e.g. `5.0@portal.example.com/myapp=1.2`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppSpec {
    pub app_id: String,
    pub app_version: Option<String>,
    pub ucs_version: Option<String>,
    pub server: Option<String>,
}

impl AppSpec {
    /// Parse an identifier string. Parsing never fails; missing parts are `None`.
    pub fn parse(input: &str) -> Self {
        let (id_part, app_version) = match input.split_once('=') {
            Some((id, version)) => (id, Some(version.to_string())),
            None => (input, None),
        };

        let (ucs_part, app_id) = match id_part.split_once('/') {
            Some((ucs, id)) => (Some(ucs), id),
            None => (None, id_part),
        };

        let (ucs_version, server) = match ucs_part {
            Some(ucs) if !ucs.is_empty() => match ucs.split_once('@') {
                Some((version, server)) => (version, Some(server.to_string())),
                None => (ucs, None),
            },
            _ => ("", None),
        };

        AppSpec {
            app_id: app_id.to_string(),
            app_version,
            ucs_version: (!ucs_version.is_empty()).then(|| ucs_version.to_string()),
            server,
        }
    }

    /// UCS version of this spec, or `default` when none was given
    pub fn ucs_version_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.ucs_version.as_deref().unwrap_or(default)
    }
}

impl FromStr for AppSpec {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(AppSpec::parse(s))
    }
}

impl fmt::Display for AppSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ucs) = &self.ucs_version {
            write!(f, "{ucs}")?;
            if let Some(server) = &self.server {
                write!(f, "@{server}")?;
            }
            write!(f, "/")?;
        }
        write!(f, "{}", self.app_id)?;
        if let Some(version) = &self.app_version {
            write!(f, "={version}")?;
        }
        Ok(())
    }
}
