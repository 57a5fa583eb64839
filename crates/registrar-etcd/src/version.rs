//! Store generation detection
//!
//! etcd 0.4 and etcd 2.x speak incompatible key APIs, so the adapter asks
//! the endpoint once, at construction, which one it is talking to.

use reqwest::Client;
use tracing::debug;

use crate::error::ConfigurationError;

/// Substring identifying an etcd 0.4 `/version` body (e.g. `etcd 0.4.6`)
pub const LEGACY_SIGNATURE: &str = "0.4.";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProtocolVersion {
    /// etcd 0.4
    Legacy,
    /// etcd 2.x keys API
    Current,
}

impl ProtocolVersion {
    /// Classify a `/version` response body
    pub fn classify(body: &str) -> Self {
        if body.contains(LEGACY_SIGNATURE) {
            ProtocolVersion::Legacy
        } else {
            ProtocolVersion::Current
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProtocolVersion::Legacy => "v0",
            ProtocolVersion::Current => "v2",
        }
    }
}

impl std::fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// `GET <endpoint>/version` and classify the answer
///
/// Only a transport failure is an error; any HTTP response is classified by
/// its body, whatever the status.
pub async fn probe_version(
    client: &Client,
    endpoint: &str,
) -> Result<ProtocolVersion, ConfigurationError> {
    let url = format!("{}/version", endpoint);

    let response = client
        .get(&url)
        .send()
        .await
        .map_err(|source| ConfigurationError::VersionProbe {
            url: url.clone(),
            source,
        })?;

    let status = response.status();
    let body = response.bytes().await.unwrap_or_default();
    let body = String::from_utf8_lossy(&body);
    debug!("etcd: {} answered {}: {}", url, status, body.trim());

    Ok(ProtocolVersion::classify(&body))
}
