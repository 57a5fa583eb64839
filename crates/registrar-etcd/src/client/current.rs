// Client for the etcd 2.x keys API

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use super::{KeysResponse, MemberSet, decode_keys, keys_url, parse_member};
use crate::error::{ConfigurationError, StoreError};

/// Deadline for each request to the store
pub const HEADER_TIMEOUT_PER_REQUEST: Duration = Duration::from_secs(3);

#[derive(Debug, Deserialize)]
struct MembersResponse {
    #[serde(default)]
    members: Vec<Member>,
}

#[derive(Debug, Deserialize)]
struct Member {
    #[serde(rename = "clientURLs", default)]
    client_urls: Vec<String>,
}

/// etcd 2.x client
pub struct CurrentClient {
    http: Client,
    endpoints: MemberSet,
    request_timeout: Duration,
}

impl CurrentClient {
    /// Every endpoint must be an absolute `http`/`https` URL
    pub fn new(http: Client, endpoints: Vec<String>) -> Result<Self, ConfigurationError> {
        if endpoints.is_empty() {
            return Err(ConfigurationError::InvalidEndpoint(
                "no endpoints given".to_string(),
            ));
        }

        for endpoint in &endpoints {
            parse_member(endpoint).map_err(ConfigurationError::InvalidEndpoint)?;
        }

        Ok(Self {
            http,
            endpoints: MemberSet::new(endpoints),
            request_timeout: HEADER_TIMEOUT_PER_REQUEST,
        })
    }

    /// Known endpoints, in try order
    pub fn endpoints(&self) -> Vec<String> {
        self.endpoints.members()
    }

    /// Plain (non-quorum, non-recursive, unsorted) read
    pub async fn get(&self, key: &str) -> Result<KeysResponse, StoreError> {
        let response = self
            .endpoints
            .send(|m| {
                self.http
                    .get(keys_url(m, key))
                    .query(&[("quorum", false), ("recursive", false), ("sorted", false)])
                    .timeout(self.request_timeout)
            })
            .await?;
        decode_keys(response).await
    }

    /// Set `key` to `value`, expiring after `ttl` (zero = never)
    pub async fn set(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<KeysResponse, StoreError> {
        let ttl = ttl.as_secs();
        let response = self
            .endpoints
            .send(|m| {
                let request = self.http.put(keys_url(m, key)).timeout(self.request_timeout);
                if ttl > 0 {
                    request.form(&[("value", value.to_string()), ("ttl", ttl.to_string())])
                } else {
                    request.form(&[("value", value)])
                }
            })
            .await?;
        decode_keys(response).await
    }

    /// Delete a single key
    pub async fn delete(&self, key: &str) -> Result<KeysResponse, StoreError> {
        let response = self
            .endpoints
            .send(|m| self.http.delete(keys_url(m, key)).timeout(self.request_timeout))
            .await?;
        decode_keys(response).await
    }

    /// Refresh the endpoint list from `/v2/members`
    ///
    /// An advertised list holding any unusable URL is rejected as a whole
    /// and the known endpoints stay in place.
    pub async fn sync(&self) -> Result<(), StoreError> {
        let response = self
            .endpoints
            .send(|m| {
                self.http
                    .get(format!("{}/v2/members", m))
                    .timeout(self.request_timeout)
            })
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(StoreError::UnexpectedStatus {
                status: status.as_u16(),
                body,
            });
        }

        let members: MembersResponse = serde_json::from_str(&body)?;
        let urls: Vec<String> = members
            .members
            .into_iter()
            .flat_map(|m| m.client_urls)
            .collect();
        for url in &urls {
            parse_member(url).map_err(StoreError::InvalidMember)?;
        }

        if self.endpoints.replace(urls) {
            Ok(())
        } else {
            Err(StoreError::NoEndpoints)
        }
    }
}
