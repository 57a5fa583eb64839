//! Service model handed to registry backends

use serde::{Deserialize, Serialize};

/// One running service instance
///
/// Supplied fresh on every adapter call; backends never cache it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRecord {
    /// Service name, shared by all instances of the service
    pub name: String,
    /// Instance ID, unique within the service
    pub id: String,
    /// Address the instance listens on
    pub ip: String,
    pub port: u16,
    /// Seconds until the published record expires unless refreshed (0 = never)
    #[serde(default)]
    pub ttl: u64,
}

impl ServiceRecord {
    pub fn new(name: &str, id: &str, ip: &str, port: u16) -> Self {
        Self {
            name: name.to_string(),
            id: id.to_string(),
            ip: ip.to_string(),
            port,
            ttl: 0,
        }
    }

    /// Set the record TTL in seconds
    pub fn with_ttl(mut self, ttl: u64) -> Self {
        self.ttl = ttl;
        self
    }

    /// `ip:port`, with IPv6 hosts bracketed
    pub fn host_port(&self) -> String {
        if self.ip.contains(':') && !self.ip.starts_with('[') {
            format!("[{}]:{}", self.ip, self.port)
        } else {
            format!("{}:{}", self.ip, self.port)
        }
    }
}
