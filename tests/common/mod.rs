#![allow(dead_code)]

use anyhow::Result;
use appcenter_selfservice::{
    credentials::CredentialSources,
    session::Session,
    transport::{Request, Transport},
};
use serde_json::{json, Value};
use std::{
    cell::RefCell,
    collections::HashMap,
    io,
    sync::{Arc, Mutex},
};

/// Transport that records requests and answers from canned responses keyed
/// by the last path segment of the URI (`api`, `query`, `upload`, ...).
#[derive(Default)]
pub struct MockTransport {
    pub requests: RefCell<Vec<Request>>,
    responses: RefCell<HashMap<String, Vec<Value>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        let mock = MockTransport::default();
        mock.respond("api", ok(json!(5)));
        mock
    }

    /// Queue a response; the last queued response for a key is repeated
    pub fn respond(&self, endpoint: &str, response: Value) {
        self.responses
            .borrow_mut()
            .entry(endpoint.to_string())
            .or_default()
            .push(response);
    }

    pub fn endpoints(&self) -> Vec<String> {
        self.requests
            .borrow()
            .iter()
            .map(|r| endpoint_of(&r.uri).to_string())
            .collect()
    }

    pub fn last(&self, endpoint: &str) -> Request {
        self.requests
            .borrow()
            .iter()
            .rev()
            .find(|r| endpoint_of(&r.uri) == endpoint)
            .cloned()
            .unwrap_or_else(|| panic!("no request to {endpoint}"))
    }
}

fn endpoint_of(uri: &str) -> &str {
    uri.rsplit('/').next().unwrap_or(uri)
}

impl Transport for MockTransport {
    async fn send(&self, request: &Request) -> Result<Value> {
        self.requests.borrow_mut().push(request.clone());
        let endpoint = endpoint_of(&request.uri).to_string();
        let mut responses = self.responses.borrow_mut();
        let queue = responses
            .get_mut(&endpoint)
            .unwrap_or_else(|| panic!("unexpected request to {endpoint}"));
        if queue.len() > 1 {
            Ok(queue.remove(0))
        } else {
            Ok(queue[0].clone())
        }
    }
}

pub fn ok(result: Value) -> Value {
    json!({"status": 200, "result": result})
}

pub fn sources() -> CredentialSources {
    CredentialSources {
        username: Some("vendor".into()),
        password: Some("s3cret".into()),
        interactive: false,
        ..Default::default()
    }
}

pub fn session(mock: MockTransport) -> Session<MockTransport> {
    Session::new(mock, "portal.example.com", sources(), "5.0")
}

/// Two apps; `myapp` has versions on 4.4 and 5.0
pub fn catalog() -> Value {
    json!([
        {
            "id": "myapp",
            "vendor": "Example Inc",
            "ucs_version": "5.0",
            "version": "2.0",
            "base64_logo": "iVBORw0KGgo=",
            "versions": [
                {"id": "myapp", "version": "1.0", "ucs_version": "4.4", "component_id": "myapp_44", "in_appcenter": true},
                {"id": "myapp", "version": "1.10", "ucs_version": "5.0", "component_id": "myapp_110", "in_appcenter": true},
                {"id": "myapp", "version": "1.9", "ucs_version": "5.0", "component_id": "myapp_19", "in_appcenter": false},
                {"id": "myapp", "version": "2.0 ucs-1", "ucs_version": "4.4", "component_id": "myapp_44b", "docker_image": "example/myapp:2.0"}
            ]
        },
        {
            "id": "otherapp",
            "vendor": "another vendor",
            "ucs_version": "5.0",
            "version": "0.1",
            "versions": [
                {"id": "otherapp", "version": "0.1", "ucs_version": "5.0", "component_id": "otherapp_01"}
            ]
        }
    ])
}

pub fn field_values(request: &Request, name: &str) -> Vec<String> {
    use appcenter_selfservice::transport::FieldValue;
    request
        .fields
        .iter()
        .filter(|f| f.name == name)
        .map(|f| match &f.value {
            FieldValue::Text(text) => text.clone(),
            FieldValue::File(path) => format!("@{}", path.display()),
        })
        .collect()
}

/// Collects formatted log output while the guard from `install` is alive
#[derive(Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let writer = self.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .without_time()
            .with_writer(move || writer.clone())
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
