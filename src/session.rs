//! A logged-in conversation with the Self Service.
//!
//! The session logs in lazily: the first command resolves the credentials
//! and checks the server's API level. Everything after reuses them.

use anyhow::{Context, Result};
use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use serde::Deserialize;
use serde_json::Value;

use crate::{
    app::AppVersion,
    constants::API_LEVEL,
    credentials::{CredentialSources, Credentials, Prompt, TerminalPrompt},
    error::SelfServiceError,
    identifier::AppSpec,
    transport::{command_uri, upload_uri, Field, Request, RequestKind, Transport},
    version::select_version,
};

pub struct Session<T: Transport> {
    transport: T,
    server: String,
    sources: CredentialSources,
    prompt: Box<dyn Prompt>,
    credentials: Option<Credentials>,
    default_ucs_version: String,
    /// Suppresses the per-request log line
    pub quiet: bool,
}

impl<T: Transport> Session<T> {
    pub fn new(
        transport: T,
        server: impl Into<String>,
        sources: CredentialSources,
        default_ucs_version: impl Into<String>,
    ) -> Self {
        Session {
            transport,
            server: server.into(),
            sources,
            prompt: Box::new(TerminalPrompt),
            credentials: None,
            default_ucs_version: default_ucs_version.into(),
            quiet: false,
        }
    }

    pub fn with_prompt(mut self, prompt: Box<dyn Prompt>) -> Self {
        self.prompt = prompt;
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn server(&self) -> &str {
        &self.server
    }

    pub fn default_ucs_version(&self) -> &str {
        &self.default_ucs_version
    }

    /// Point the session at the server named in `app`, if it names one
    pub fn use_server_of(&mut self, app: &AppSpec) {
        if let Some(server) = &app.server {
            if *server != self.server {
                tracing::debug!("switching to server {server} from app identifier");
                self.server = server.clone();
            }
        }
    }

    async fn send(&self, uri: String, kind: RequestKind, fields: Vec<Field>) -> Result<Value> {
        let credentials = self
            .credentials
            .clone()
            .ok_or(SelfServiceError::MissingCredentials("credentials"))?;
        if !self.quiet {
            tracing::info!("Curling {uri}");
        }
        let request = Request {
            uri,
            kind,
            fields,
            credentials,
        };
        self.transport.send(&request).await
    }

    async fn login(&mut self) -> Result<()> {
        if self.credentials.is_some() {
            return Ok(());
        }
        self.credentials = Some(self.sources.resolve(self.prompt.as_ref())?);

        let uri = command_uri(&self.server, "api");
        let response = self.send(uri, RequestKind::Command, Vec::new()).await;
        let remote = match response.and_then(extract_result) {
            Ok(remote) => remote,
            Err(err) => {
                self.credentials = None;
                return Err(err);
            }
        };
        if remote.as_i64() != Some(API_LEVEL) {
            self.credentials = None;
            return Err(SelfServiceError::ApiLevelMismatch {
                remote: remote.to_string(),
                local: API_LEVEL,
            }
            .into());
        }
        tracing::debug!("logged in, API level {API_LEVEL}");
        Ok(())
    }

    /// Run a Self Service command and return the raw response
    pub async fn command(&mut self, command: &str, fields: Vec<Field>) -> Result<Value> {
        self.login().await?;
        let uri = command_uri(&self.server, command);
        self.send(uri, RequestKind::Command, fields).await
    }

    /// Send files (and accompanying form fields) to the upload endpoint
    pub async fn upload(&mut self, fields: Vec<Field>) -> Result<Value> {
        self.login().await?;
        let uri = upload_uri(&self.server);
        self.send(uri, RequestKind::Upload, fields).await
    }

    /// All apps visible to the account, as the server sent them
    pub async fn query(&mut self) -> Result<Vec<Value>> {
        let result = extract_result(self.command("query", Vec::new()).await?)?;
        match result {
            Value::Array(records) => Ok(records),
            other => Err(SelfServiceError::UnrecoverableResult(other.to_string()).into()),
        }
    }

    /// Every version of `app`, across all UCS versions
    pub async fn find_all_app_versions(&mut self, app: &AppSpec) -> Result<Vec<AppVersion>> {
        let records = self.query().await?;
        versions_of(&records, &app.app_id)
    }

    /// Versions of `app` for its UCS version (or the default one)
    pub async fn find_app_versions(&mut self, app: &AppSpec) -> Result<Vec<AppVersion>> {
        let ucs_version = app.ucs_version_or(&self.default_ucs_version).to_string();
        let versions = self.find_all_app_versions(app).await?;
        Ok(filter_ucs(versions, &ucs_version))
    }

    /// The single app version `app` refers to
    pub async fn find_app(&mut self, app: &AppSpec) -> Result<AppVersion> {
        let records = self.query().await?;
        let ucs_version = app.ucs_version_or(&self.default_ucs_version);
        let versions = filter_ucs(versions_of(&records, &app.app_id)?, ucs_version);

        match select_version(&versions, app.app_version.as_deref()) {
            Some(found) => Ok(found.clone()),
            None => Err(SelfServiceError::AppNotFound {
                spec: app.to_string(),
                suggestions: suggest_app_ids(&records, &app.app_id),
            }
            .into()),
        }
    }
}

/// Unwrap the `result` of a response envelope with `status == 200`
pub fn extract_result(response: Value) -> Result<Value> {
    match response {
        Value::Object(mut map) if map.get("status").and_then(Value::as_i64) == Some(200) => {
            match map.remove("result") {
                Some(result) => Ok(result),
                None => Err(SelfServiceError::UnrecoverableResult(Value::Object(map).to_string()).into()),
            }
        }
        other => Err(SelfServiceError::UnrecoverableResult(other.to_string()).into()),
    }
}

fn record_id(record: &Value) -> Option<&str> {
    record.get("id").and_then(Value::as_str)
}

/// Decode the versions of `app_id`; other apps' records are never looked at
fn versions_of(records: &[Value], app_id: &str) -> Result<Vec<AppVersion>> {
    let mut versions = Vec::new();
    for record in records.iter().filter(|record| record_id(record) == Some(app_id)) {
        let Some(Value::Array(entries)) = record.get("versions") else {
            continue;
        };
        for entry in entries {
            let version = AppVersion::deserialize(entry)
                .with_context(|| format!("malformed version record of App {app_id}"))?;
            versions.push(version);
        }
    }
    Ok(versions)
}

fn filter_ucs(versions: Vec<AppVersion>, ucs_version: &str) -> Vec<AppVersion> {
    versions
        .into_iter()
        .filter(|version| version.ucs_version == ucs_version)
        .collect()
}

/// Up to three app ids resembling `app_id`, best match first
fn suggest_app_ids(records: &[Value], app_id: &str) -> Vec<String> {
    let matcher = SkimMatcherV2::default();
    let mut scored: Vec<(i64, &str)> = records
        .iter()
        .filter_map(record_id)
        .filter(|id| *id != app_id)
        .filter_map(|id| matcher.fuzzy_match(id, app_id).map(|score| (score, id)))
        .collect();
    scored.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(b.1)));
    let mut ids: Vec<String> = Vec::new();
    for (_, id) in scored {
        if !ids.iter().any(|known| known == id) {
            ids.push(id.to_string());
        }
        if ids.len() == 3 {
            break;
        }
    }
    ids
}
