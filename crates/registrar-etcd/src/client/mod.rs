//! etcd HTTP clients, one per protocol generation
//!
//! Both clients keep their own view of the cluster members and fail over
//! to the next member when a connection cannot be established. Any other
//! failure is returned as-is.

pub mod current;
pub mod legacy;

use parking_lot::RwLock;
use reqwest::{RequestBuilder, Response};
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

use crate::error::{EtcdApiError, StoreError};

pub use current::CurrentClient;
pub use legacy::LegacyClient;

/// Keys API response body
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeysResponse {
    pub action: String,
    #[serde(default)]
    pub node: Option<Node>,
    #[serde(default)]
    pub prev_node: Option<Node>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub dir: bool,
    #[serde(default)]
    pub ttl: Option<i64>,
    #[serde(default)]
    pub expiration: Option<String>,
    #[serde(default)]
    pub modified_index: u64,
    #[serde(default)]
    pub created_index: u64,
    #[serde(default)]
    pub nodes: Vec<Node>,
}

/// Known cluster members, tried in order starting from the last good one
pub struct MemberSet {
    members: RwLock<Vec<String>>,
    current: RwLock<usize>,
}

impl MemberSet {
    pub fn new(members: Vec<String>) -> Self {
        Self {
            members: RwLock::new(normalize(members)),
            current: RwLock::new(0),
        }
    }

    /// Members in try order, starting at the current one
    pub fn members(&self) -> Vec<String> {
        let members = self.members.read();
        let start = *self.current.read() % members.len().max(1);
        members[start..]
            .iter()
            .chain(members[..start].iter())
            .cloned()
            .collect()
    }

    /// Replace the member list; an empty list is ignored
    pub fn replace(&self, members: Vec<String>) -> bool {
        let members = normalize(members);
        if members.is_empty() {
            return false;
        }

        debug!("etcd: cluster members now {:?}", members);
        *self.members.write() = members;
        *self.current.write() = 0;
        true
    }

    fn switch_to_next(&self) {
        let len = self.members.read().len();
        if len == 0 {
            return;
        }
        let mut index = self.current.write();
        *index = (*index + 1) % len;
    }

    /// Send one request, moving on to the next member only when the
    /// connection itself fails
    pub async fn send<F>(&self, build: F) -> Result<Response, StoreError>
    where
        F: Fn(&str) -> RequestBuilder,
    {
        let mut last_error = None;

        for member in self.members() {
            match build(&member).send().await {
                Ok(response) => return Ok(response),
                Err(e) if e.is_connect() => {
                    warn!("etcd: member {} unreachable: {}, trying next", member, e);
                    self.switch_to_next();
                    last_error = Some(e);
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(last_error.map_or(StoreError::NoEndpoints, StoreError::Http))
    }
}

fn normalize(members: Vec<String>) -> Vec<String> {
    members
        .into_iter()
        .map(|m| m.trim().trim_end_matches('/').to_string())
        .filter(|m| !m.is_empty())
        .collect()
}

/// Parse a member URL; only absolute `http`/`https` URLs are usable
pub(crate) fn parse_member(member: &str) -> Result<Url, String> {
    let url = Url::parse(member.trim()).map_err(|e| format!("{}: {}", member, e))?;
    if matches!(url.scheme(), "http" | "https") {
        Ok(url)
    } else {
        Err(member.to_string())
    }
}

/// `/v2/keys` URL for a key, each segment percent-encoded
pub(crate) fn keys_url(member: &str, key: &str) -> String {
    let segments = key.strip_prefix('/').unwrap_or(key).split('/');

    let Ok(mut url) = Url::parse(member) else {
        // members are checked on the way in; keep the raw form for reqwest to reject
        return format!("{}/v2/keys/{}", member, key.trim_start_matches('/'));
    };
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(["v2", "keys"]).extend(segments);
    }
    url.into()
}

/// Decode a keys API response, turning error bodies into `StoreError`
pub(crate) async fn decode_keys(response: Response) -> Result<KeysResponse, StoreError> {
    let status = response.status();
    let body = response.text().await?;

    if status.is_success() {
        Ok(serde_json::from_str(&body)?)
    } else {
        Err(api_error(status.as_u16(), body))
    }
}

/// Read a raw (non keys API) response body
pub(crate) async fn decode_raw(response: Response) -> Result<String, StoreError> {
    let status = response.status();
    let body = response.text().await?;

    if status.is_success() {
        Ok(body)
    } else {
        Err(api_error(status.as_u16(), body))
    }
}

fn api_error(status: u16, body: String) -> StoreError {
    match serde_json::from_str::<EtcdApiError>(&body) {
        Ok(err) => StoreError::Etcd(err),
        Err(_) => StoreError::UnexpectedStatus { status, body },
    }
}
