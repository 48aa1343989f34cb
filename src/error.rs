//! Abort conditions raised while talking to the Self Service.
//!
//! Every variant ends the current command. `main` turns them into exit code 10.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SelfServiceError {
    /// The user cancelled a prompt (empty input, EOF or Ctrl-C).
    #[error("aborted")]
    Cancelled,

    #[error("no {0} available and --noninteractive is set")]
    MissingCredentials(&'static str),

    /// The response was valid JSON but not a successful envelope.
    #[error("Unrecoverable result: {0}")]
    UnrecoverableResult(String),

    /// The response body was not JSON at all.
    #[error("Unrecoverable Response")]
    UnrecoverableResponse,

    #[error(
        "The Self Service has been updated (LEVEL={remote}). Please update your script (LEVEL={local})"
    )]
    ApiLevelMismatch { remote: String, local: i64 },

    #[error("Could not find App {spec}{}", suggestion_suffix(.suggestions))]
    AppNotFound {
        spec: String,
        suggestions: Vec<String>,
    },

    #[error("Unable to parse CHANGES as a JSON dict")]
    InvalidChanges,

    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

fn suggestion_suffix(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else {
        format!(". Did you mean: {}?", suggestions.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_not_found_lists_suggestions() {
        let err = SelfServiceError::AppNotFound {
            spec: "4.4/nextclod".into(),
            suggestions: vec!["nextcloud".into()],
        };
        assert_eq!(
            err.to_string(),
            "Could not find App 4.4/nextclod. Did you mean: nextcloud?"
        );

        let err = SelfServiceError::AppNotFound {
            spec: "foo".into(),
            suggestions: vec![],
        };
        assert_eq!(err.to_string(), "Could not find App foo");
    }

    #[test]
    fn api_level_message() {
        let err = SelfServiceError::ApiLevelMismatch {
            remote: "6".into(),
            local: 5,
        };
        assert_eq!(
            err.to_string(),
            "The Self Service has been updated (LEVEL=6). Please update your script (LEVEL=5)"
        );
    }
}
