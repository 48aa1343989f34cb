//! HTTP plumbing for the Self Service.
//!
//! Requests are always `POST`s with basic auth. Commands send url-encoded
//! form fields; uploads send `multipart/form-data`. Two transports exist:
//! [`CurlTransport`] shells out to `curl`, [`NativeTransport`] uses reqwest.

use anyhow::{Context, Result};
use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_LENGTH},
    multipart, Body, Client,
};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tokio::process::Command;

use crate::{
    constants::{COMMAND_PATH, HEADER_ACCEPT, HEADER_REQUESTED_WITH, UPLOAD_PATH},
    credentials::Credentials,
    error::SelfServiceError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    /// `application/x-www-form-urlencoded`
    Command,
    /// `multipart/form-data`
    Upload,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    File(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub value: FieldValue,
}

impl Field {
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Field {
            name: name.into(),
            value: FieldValue::Text(value.into()),
        }
    }

    pub fn file(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Field {
            name: name.into(),
            value: FieldValue::File(path.into()),
        }
    }

    /// Render a JSON value as form fields.
    ///
    /// `null` produces nothing, arrays repeat the key per element, booleans
    /// become `True`/`False` and objects are sent as compact JSON.
    pub fn from_json(name: &str, value: &Value) -> Vec<Field> {
        match value {
            Value::Null => Vec::new(),
            Value::Array(items) => items
                .iter()
                .flat_map(|item| match item {
                    Value::Array(_) => vec![Field::text(name, item.to_string())],
                    _ => Field::from_json(name, item),
                })
                .collect(),
            Value::Bool(true) => vec![Field::text(name, "True")],
            Value::Bool(false) => vec![Field::text(name, "False")],
            Value::String(s) => vec![Field::text(name, s.as_str())],
            Value::Number(n) => vec![Field::text(name, n.to_string())],
            Value::Object(_) => vec![Field::text(name, value.to_string())],
        }
    }

    pub fn from_json_map(map: &Map<String, Value>) -> Vec<Field> {
        map.iter()
            .flat_map(|(name, value)| Field::from_json(name, value))
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct Request {
    pub uri: String,
    pub kind: RequestKind,
    pub fields: Vec<Field>,
    pub credentials: Credentials,
}

/// Full URL of `path` on `server`; bare host names get `https://`
pub fn build_uri(server: &str, path: &str) -> String {
    let server = server.trim_end_matches('/');
    if server.starts_with("http") {
        format!("{server}/univention/{path}")
    } else {
        format!("https://{server}/univention/{path}")
    }
}

pub fn command_uri(server: &str, command: &str) -> String {
    build_uri(server, &format!("{COMMAND_PATH}/{command}"))
}

pub fn upload_uri(server: &str) -> String {
    build_uri(server, UPLOAD_PATH)
}

/// Sends a request and returns the decoded JSON body
#[allow(async_fn_in_trait)]
pub trait Transport {
    async fn send(&self, request: &Request) -> Result<Value>;
}

/// Decode a response body, reporting non-JSON bodies as server errors
pub fn parse_body(body: &str) -> Result<Value> {
    match serde_json::from_str(body) {
        Ok(value) => Ok(value),
        Err(_) => {
            tracing::error!(
                "No JSON found. This looks like a server error (e.g., Apache in front of Univention Management Console)"
            );
            tracing::info!("{body}");
            Err(SelfServiceError::UnrecoverableResponse.into())
        }
    }
}

pub struct CurlTransport {
    program: PathBuf,
}

impl CurlTransport {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        CurlTransport {
            program: program.into(),
        }
    }

    /// Command line for `request`, without the program name
    pub fn args(request: &Request) -> Vec<String> {
        let mut args = vec![
            "--silent".to_string(),
            "--show-error".to_string(),
            "--basic".to_string(),
            "--user".to_string(),
            format!(
                "{}:{}",
                request.credentials.username, request.credentials.password
            ),
            "-H".to_string(),
            format!("{}: {}", HEADER_REQUESTED_WITH.0, HEADER_REQUESTED_WITH.1),
            "-H".to_string(),
            format!("{}: {}", HEADER_ACCEPT.0, HEADER_ACCEPT.1),
        ];

        for field in &request.fields {
            let (flag, arg) = match (&request.kind, &field.value) {
                (RequestKind::Command, FieldValue::Text(text)) => {
                    ("--data-urlencode", format!("{}={}", field.name, text))
                }
                (RequestKind::Command, FieldValue::File(path)) => {
                    ("--data-urlencode", format!("{}@{}", field.name, path.display()))
                }
                (RequestKind::Upload, FieldValue::Text(text)) => {
                    ("-F", format!("{}={}", field.name, text))
                }
                (RequestKind::Upload, FieldValue::File(path)) => {
                    ("-F", format!("{}=@{}", field.name, path.display()))
                }
            };
            args.push(flag.to_string());
            args.push(arg);
        }

        if request.fields.is_empty() {
            args.extend(["-X", "POST", "-H", "Content-Length: 0"].map(String::from));
        }

        args.push(request.uri.clone());
        args
    }
}

impl Transport for CurlTransport {
    async fn send(&self, request: &Request) -> Result<Value> {
        let output = Command::new(&self.program)
            .args(Self::args(request))
            .output()
            .await
            .map_err(|source| SelfServiceError::Spawn {
                program: self.program.display().to_string(),
                source,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        tracing::debug!(status = %output.status, "curl finished");
        if !stderr.trim().is_empty() {
            tracing::debug!("curl stderr: {}", stderr.trim());
        }
        parse_body(&stdout)
    }
}

pub struct NativeTransport {
    client: Client,
}

impl NativeTransport {
    pub fn new() -> Result<Self> {
        let mut headers = HeaderMap::new();
        for (name, value) in [HEADER_REQUESTED_WITH, HEADER_ACCEPT] {
            headers.insert(
                HeaderName::from_bytes(name.as_bytes())?,
                HeaderValue::from_static(value),
            );
        }
        let client = Client::builder().default_headers(headers).build()?;
        Ok(NativeTransport { client })
    }

    fn basic_auth(credentials: &Credentials) -> Result<HeaderValue> {
        let token = base64::encode_config(
            format!("{}:{}", credentials.username, credentials.password),
            base64::STANDARD,
        );
        Ok(HeaderValue::from_str(&format!("Basic {}", token))?)
    }

    async fn multipart_form(fields: &[Field]) -> Result<multipart::Form> {
        let mut form = multipart::Form::new();
        for field in fields {
            form = match &field.value {
                FieldValue::Text(text) => form.text(field.name.clone(), text.clone()),
                FieldValue::File(path) => {
                    let file = tokio::fs::File::open(path)
                        .await
                        .with_context(|| format!("reading {}", path.display()))?;
                    let length = file.metadata().await?.len();
                    let part = multipart::Part::stream_with_length(Body::from(file), length)
                        .file_name(file_name(path));
                    form.part(field.name.clone(), part)
                }
            };
        }
        Ok(form)
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

impl Transport for NativeTransport {
    async fn send(&self, request: &Request) -> Result<Value> {
        let mut req = self
            .client
            .post(&request.uri)
            .header(AUTHORIZATION, Self::basic_auth(&request.credentials)?);

        req = match request.kind {
            _ if request.fields.is_empty() => req.header(CONTENT_LENGTH, "0").body(""),
            RequestKind::Command => {
                let mut pairs = Vec::with_capacity(request.fields.len());
                for field in &request.fields {
                    let value = match &field.value {
                        FieldValue::Text(text) => text.clone(),
                        FieldValue::File(path) => tokio::fs::read_to_string(path)
                            .await
                            .with_context(|| format!("reading {}", path.display()))?,
                    };
                    pairs.push((field.name.clone(), value));
                }
                req.form(&pairs)
            }
            RequestKind::Upload => req.multipart(Self::multipart_form(&request.fields).await?),
        };

        let resp = req
            .send()
            .await
            .with_context(|| format!("requesting {}", request.uri))?;
        tracing::debug!(status = %resp.status(), "response received");
        let body = resp.text().await?;
        parse_body(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(kind: RequestKind, fields: Vec<Field>) -> Request {
        Request {
            uri: command_uri("portal.example.com", "query"),
            kind,
            fields,
            credentials: Credentials {
                username: "vendor".into(),
                password: "s3cret".into(),
            },
        }
    }

    #[test]
    fn uri_gets_https_prefix() {
        assert_eq!(
            command_uri("portal.example.com", "api"),
            "https://portal.example.com/univention/command/appcenter-selfservice/api"
        );
        assert_eq!(
            upload_uri("http://localhost:8080/"),
            "http://localhost:8080/univention/upload/appcenter-selfservice/upload"
        );
    }

    #[test]
    fn curl_args_without_fields_force_post() {
        let args = CurlTransport::args(&request(RequestKind::Command, vec![]));
        assert_eq!(args[4], "vendor:s3cret");
        assert!(args.contains(&"X-Requested-With: XmlHttpRequest".to_string()));
        assert!(args.contains(&"Accept: application/json; q=1".to_string()));
        let tail = &args[args.len() - 5..];
        assert_eq!(
            tail,
            [
                "-X",
                "POST",
                "-H",
                "Content-Length: 0",
                "https://portal.example.com/univention/command/appcenter-selfservice/query"
            ]
        );
    }

    #[test]
    fn curl_args_for_command_fields() {
        let args = CurlTransport::args(&request(
            RequestKind::Command,
            vec![
                Field::text("ucs_version", "5.0"),
                Field::text("component_id", "a&b"),
            ],
        ));
        let pos = args.iter().position(|a| a == "ucs_version=5.0").unwrap();
        assert_eq!(args[pos - 1], "--data-urlencode");
        assert_eq!(args[pos + 1], "--data-urlencode");
        assert_eq!(args[pos + 2], "component_id=a&b");
        assert!(!args.contains(&"-X".to_string()));
    }

    #[test]
    fn curl_args_for_upload_files() {
        let args = CurlTransport::args(&request(
            RequestKind::Upload,
            vec![
                Field::text("clear", "true"),
                Field::file("filename", "/tmp/app.ini"),
            ],
        ));
        assert!(args.windows(2).any(|w| w == ["-F", "clear=true"]));
        assert!(args.windows(2).any(|w| w == ["-F", "filename=@/tmp/app.ini"]));
    }

    #[test]
    fn json_values_become_fields() {
        assert!(Field::from_json("x", &Value::Null).is_empty());
        assert_eq!(
            Field::from_json("flag", &json!(true)),
            vec![Field::text("flag", "True")]
        );
        assert_eq!(
            Field::from_json("n", &json!(3)),
            vec![Field::text("n", "3")]
        );
        assert_eq!(
            Field::from_json("tags", &json!(["a", null, false])),
            vec![Field::text("tags", "a"), Field::text("tags", "False")]
        );
        assert_eq!(
            Field::from_json("obj", &json!({"k": 1})),
            vec![Field::text("obj", r#"{"k":1}"#)]
        );
    }

    #[test]
    fn non_json_body_is_unrecoverable() {
        let err = parse_body("<html>502 Bad Gateway</html>").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SelfServiceError>(),
            Some(SelfServiceError::UnrecoverableResponse)
        ));
        assert_eq!(parse_body(r#"{"status": 200}"#).unwrap()["status"], 200);
    }

    #[test]
    fn basic_auth_header() {
        let header = NativeTransport::basic_auth(&Credentials {
            username: "vendor".into(),
            password: "s3cret".into(),
        })
        .unwrap();
        assert_eq!(header.to_str().unwrap(), "Basic dmVuZG9yOnMzY3JldA==");
    }

    #[tokio::test]
    async fn multipart_form_streams_files() {
        let dir = tempfile::TempDir::new().unwrap();
        let tarball = dir.path().join("app.tar.gz");
        std::fs::write(&tarball, vec![b'x'; 1024]).unwrap();

        let form = NativeTransport::multipart_form(&[
            Field::text("component_id", "myapp_110"),
            Field::file("app.tar.gz", &tarball),
        ])
        .await
        .unwrap();
        assert!(!form.boundary().is_empty());

        let err = NativeTransport::multipart_form(&[Field::file("README_EN", dir.path().join("gone"))])
            .await
            .unwrap_err();
        assert!(err.to_string().contains("gone"), "{err:#}");
    }
}
