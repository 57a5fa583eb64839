// Client for the etcd 0.4 protocol

use reqwest::Client;
use tracing::{debug, warn};

use super::{KeysResponse, MemberSet, decode_keys, decode_raw, keys_url, parse_member};
use crate::error::StoreError;

/// etcd 0.4 client
///
/// Writes send value and TTL as a form body, deletes always state their
/// recursion flag, and the cluster is discovered through `/v2/machines`.
pub struct LegacyClient {
    http: Client,
    machines: MemberSet,
}

impl LegacyClient {
    pub fn new(http: Client, machines: Vec<String>) -> Self {
        Self {
            http,
            machines: MemberSet::new(machines),
        }
    }

    /// Known machines, in try order
    pub fn machines(&self) -> Vec<String> {
        self.machines.members()
    }

    /// Raw `GET /version`
    pub async fn version(&self) -> Result<String, StoreError> {
        let response = self
            .machines
            .send(|m| self.http.get(format!("{}/version", m)))
            .await?;
        decode_raw(response).await
    }

    /// Set `key` to `value`, expiring after `ttl` seconds (0 = never)
    pub async fn set(
        &self,
        key: &str,
        value: &str,
        ttl: u64,
    ) -> Result<KeysResponse, StoreError> {
        let response = self
            .machines
            .send(|m| {
                let request = self.http.put(keys_url(m, key));
                if ttl > 0 {
                    request.form(&[("value", value.to_string()), ("ttl", ttl.to_string())])
                } else {
                    request.form(&[("value", value)])
                }
            })
            .await?;
        decode_keys(response).await
    }

    pub async fn delete(&self, key: &str, recursive: bool) -> Result<KeysResponse, StoreError> {
        let response = self
            .machines
            .send(|m| {
                self.http
                    .delete(keys_url(m, key))
                    .query(&[("recursive", recursive)])
            })
            .await?;
        decode_keys(response).await
    }

    /// Refresh the machine list; `false` keeps the previous one
    pub async fn sync_cluster(&self) -> bool {
        match self.fetch_machines().await {
            Ok(machines) => self.machines.replace(machines),
            Err(e) => {
                debug!("etcd: machine list unavailable: {}", e);
                false
            }
        }
    }

    // body is a comma separated list of client URLs; unusable entries are dropped
    async fn fetch_machines(&self) -> Result<Vec<String>, StoreError> {
        let response = self
            .machines
            .send(|m| self.http.get(format!("{}/v2/machines", m)))
            .await?;
        let body = decode_raw(response).await?;

        Ok(body
            .split(',')
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .filter_map(|m| match parse_member(m) {
                Ok(_) => Some(m.to_string()),
                Err(e) => {
                    warn!("etcd: ignoring machine {}", e);
                    None
                }
            })
            .collect())
    }
}
