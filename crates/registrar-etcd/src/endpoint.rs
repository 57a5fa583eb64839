// Endpoint derivation from the registry URI

use url::Url;

use crate::config::EtcdTlsConfig;

/// Host used when the registry URI names none
pub const DEFAULT_HOST: &str = "127.0.0.1:2379";

/// Where the store lives and which key prefix services are written under
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoint {
    url: String,
    prefix: String,
}

impl Endpoint {
    /// `etcd://host:port/prefix` → `<scheme>://host:port` plus `/prefix`
    ///
    /// The scheme comes from the TLS configuration, never from the URI.
    pub fn from_uri(uri: &Url, tls: &EtcdTlsConfig) -> Self {
        let host = match uri.host_str().filter(|h| !h.is_empty()) {
            Some(host) => match uri.port() {
                Some(port) => format!("{}:{}", host, port),
                None => host.to_string(),
            },
            None => DEFAULT_HOST.to_string(),
        };

        Self {
            url: format!("{}{}", tls.scheme(), host),
            prefix: uri.path().trim_end_matches('/').to_string(),
        }
    }

    /// Base URL of the first store member, without trailing slash
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Key prefix, empty or starting with `/`
    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}
