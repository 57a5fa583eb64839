//! Common test utilities for the etcd backend
//!
//! `FakeEtcd` stands in for a store of either generation: it answers the
//! version probe, the membership endpoints, and the keys API, and records
//! every request so tests can assert on the exact wire calls.

#![allow(dead_code)]

use std::{collections::HashMap, io, sync::Arc};

use parking_lot::Mutex;
use registrar_common::ServiceRecord;
use serde_json::json;
use tracing_subscriber::EnvFilter;
use url::Url;
use wiremock::{
    Mock, MockServer, Request, ResponseTemplate,
    matchers::{method, path, path_regex},
};

pub const LEGACY_VERSION_BODY: &str = "etcd 0.4.6";
pub const CURRENT_VERSION_BODY: &str = r#"{"etcdserver":"2.3.7","etcdcluster":"2.3.0"}"#;

/// Install a test subscriber once per test binary
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// In-memory log sink installed as the thread's default subscriber
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    /// Capture everything logged on this thread until the guard drops
    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let sink = self.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || sink.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::DEBUG)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub fn lines(&self) -> Vec<String> {
        String::from_utf8_lossy(&self.0.lock())
            .lines()
            .map(str::to_string)
            .collect()
    }

    /// Lines at `level` carrying the `etcd:` prefix
    pub fn etcd_lines(&self, level: &str) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter(|l| l.contains(level) && l.contains("etcd:"))
            .collect()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// The record used across scenarios
pub fn web_record() -> ServiceRecord {
    ServiceRecord::new("web", "1", "10.0.0.5", 8080).with_ttl(30)
}

pub struct FakeEtcd {
    pub server: MockServer,
}

impl FakeEtcd {
    /// A bare server answering only the version probe
    pub async fn with_version(body: &str) -> Self {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/version"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&server)
            .await;
        Self { server }
    }

    /// etcd 0.4 with a healthy machine list and keys API
    pub async fn legacy() -> Self {
        let fake = Self::with_version(LEGACY_VERSION_BODY).await;
        fake.mount_machines(200, &fake.server.uri()).await;
        fake.mount_keys().await;
        fake
    }

    /// etcd 2.x with a healthy member list and keys API
    pub async fn current() -> Self {
        let fake = Self::with_version(CURRENT_VERSION_BODY).await;
        fake.mount_members(200).await;
        fake.mount_keys().await;
        fake
    }

    pub async fn mount_machines(&self, status: u16, body: &str) {
        Mock::given(method("GET"))
            .and(path("/v2/machines"))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&self.server)
            .await;
    }

    pub async fn mount_members(&self, status: u16) {
        self.mount_members_with(status, &[self.server.uri().as_str()]).await;
    }

    /// Answer `/v2/members` with one member advertising `client_urls`
    pub async fn mount_members_with(&self, status: u16, client_urls: &[&str]) {
        let body = json!({
            "members": [{
                "id": "ce2a822cea30bfca",
                "name": "default",
                "peerURLs": ["http://localhost:2380"],
                "clientURLs": client_urls,
            }]
        });
        Mock::given(method("GET"))
            .and(path("/v2/members"))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    /// Successful keys API answers for read, write and delete
    pub async fn mount_keys(&self) {
        Mock::given(method("GET"))
            .and(path_regex(r"^/v2/keys/.*$"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "action": "get",
                "node": {"key": "/", "dir": true, "nodes": []}
            })))
            .mount(&self.server)
            .await;

        Mock::given(method("PUT"))
            .and(path_regex(r"^/v2/keys/.*$"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "action": "set",
                "node": {
                    "key": "/services/web/1",
                    "value": "10.0.0.5:8080",
                    "ttl": 30,
                    "modifiedIndex": 12,
                    "createdIndex": 12
                }
            })))
            .mount(&self.server)
            .await;

        Mock::given(method("DELETE"))
            .and(path_regex(r"^/v2/keys/.*$"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "action": "delete",
                "node": {"key": "/services/web/1", "modifiedIndex": 13, "createdIndex": 12},
                "prevNode": {"key": "/services/web/1", "value": "10.0.0.5:8080", "modifiedIndex": 12, "createdIndex": 12}
            })))
            .mount(&self.server)
            .await;
    }

    /// Answer every keys API call with an etcd error body
    pub async fn mount_keys_error(&self, status: u16, error_code: u64, message: &str) {
        Mock::given(path_regex(r"^/v2/keys/.*$"))
            .respond_with(ResponseTemplate::new(status).set_body_json(json!({
                "errorCode": error_code,
                "message": message,
                "cause": "/services/web/1",
                "index": 7
            })))
            .mount(&self.server)
            .await;
    }

    /// `etcd://<fake>/<prefix>`
    pub fn uri(&self, prefix: &str) -> Url {
        Url::parse(&format!("etcd://{}{}", self.server.address(), prefix)).unwrap()
    }

    pub async fn requests(&self, http_method: &str, request_path: &str) -> Vec<Request> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .into_iter()
            .filter(|r| r.method.as_str() == http_method && r.url.path() == request_path)
            .collect()
    }

    pub async fn request_count(&self) -> usize {
        self.server
            .received_requests()
            .await
            .map(|r| r.len())
            .unwrap_or_default()
    }
}

pub fn form(request: &Request) -> HashMap<String, String> {
    url::form_urlencoded::parse(&request.body)
        .into_owned()
        .collect()
}

pub fn query(request: &Request) -> HashMap<String, String> {
    request.url.query_pairs().into_owned().collect()
}
