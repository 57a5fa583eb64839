// Error types for the etcd backend

use std::{fmt, path::PathBuf};

use serde::Deserialize;

/// Startup failures; the adapter cannot be built
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("failed to read CA bundle {}: {source}", .path.display())]
    ReadCaBundle {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read client key pair file {}: {source}", .path.display())]
    ReadKeyPair {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid client key pair: {0}")]
    InvalidKeyPair(#[source] reqwest::Error),

    #[error("error creating transport: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("error retrieving version from {url}: {source}")]
    VersionProbe {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Error body returned by the etcd keys API
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EtcdApiError {
    pub error_code: u64,
    pub message: String,
    #[serde(default)]
    pub cause: String,
    #[serde(default)]
    pub index: u64,
}

impl fmt::Display for EtcdApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} ({}) [{}]",
            self.error_code, self.message, self.cause, self.index
        )
    }
}

/// Per-call failures against the store, returned to the caller unchanged
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("etcd error {0}")]
    Etcd(EtcdApiError),

    #[error("request failed with status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    #[error("invalid response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("no available endpoints")]
    NoEndpoints,

    #[error("invalid cluster member: {0}")]
    InvalidMember(String),
}

impl StoreError {
    /// etcd error code, when the store answered with an API error
    pub fn error_code(&self) -> Option<u64> {
        match self {
            StoreError::Etcd(err) => Some(err.error_code),
            _ => None,
        }
    }
}
