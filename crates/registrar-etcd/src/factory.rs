// Adapter construction: transport, version probe, binding

use std::sync::Arc;

use async_trait::async_trait;
use registrar_common::{AdapterFactory, AdapterRegistry, RegistryAdapter, RegistryError};
use tracing::info;
use url::Url;

use crate::{
    adapter::{Binding, EtcdAdapter},
    client::{CurrentClient, LegacyClient},
    config::EtcdTlsConfig,
    endpoint::Endpoint,
    error::ConfigurationError,
    sync::SyncPolicy,
    transport::build_transport,
    version::{ProtocolVersion, probe_version},
};

/// URI scheme served by this backend
pub const SCHEME: &str = "etcd";

/// Builds etcd adapters from `etcd://host:port/prefix` URIs
#[derive(Clone, Debug, Default)]
pub struct EtcdFactory {
    tls: EtcdTlsConfig,
    sync_policy: SyncPolicy,
}

impl EtcdFactory {
    pub fn new(tls: EtcdTlsConfig) -> Self {
        Self {
            tls,
            sync_policy: SyncPolicy::default(),
        }
    }

    pub fn with_sync_policy(mut self, sync_policy: SyncPolicy) -> Self {
        self.sync_policy = sync_policy;
        self
    }

    /// Build the transport, probe the store once, and bind the matching client
    ///
    /// Fails before any network traffic when the TLS material is unusable,
    /// and fails when the store cannot be reached for the probe.
    pub async fn connect(&self, uri: &Url) -> Result<EtcdAdapter, ConfigurationError> {
        let http = build_transport(&self.tls)?;
        let endpoint = Endpoint::from_uri(uri, &self.tls);

        let binding = match probe_version(&http, endpoint.url()).await? {
            ProtocolVersion::Legacy => {
                info!("etcd: using v0 client for {}", endpoint.url());
                Binding::Legacy(LegacyClient::new(http, vec![endpoint.url().to_string()]))
            }
            ProtocolVersion::Current => {
                info!("etcd: using v2 client for {}", endpoint.url());
                Binding::Current(CurrentClient::new(http, vec![endpoint.url().to_string()])?)
            }
        };

        Ok(EtcdAdapter::new(binding, endpoint.prefix()).with_sync_policy(self.sync_policy))
    }
}

#[async_trait]
impl AdapterFactory for EtcdFactory {
    async fn create(&self, uri: &Url) -> Result<Box<dyn RegistryAdapter>, RegistryError> {
        let adapter = self.connect(uri).await.map_err(RegistryError::backend)?;
        Ok(Box::new(adapter))
    }
}

/// Install the etcd factory under the `etcd` scheme
pub fn register(registry: &AdapterRegistry, tls: EtcdTlsConfig) {
    registry.register(SCHEME, Arc::new(EtcdFactory::new(tls)));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_installs_scheme() {
        let registry = AdapterRegistry::new();
        register(&registry, EtcdTlsConfig::default());
        assert!(registry.has_factory("etcd"));
        assert_eq!(registry.schemes(), vec![SCHEME.to_string()]);
    }

    #[tokio::test]
    async fn test_unreachable_store_is_fatal() {
        let factory = EtcdFactory::default();
        let uri = Url::parse("etcd://127.0.0.1:1/services").unwrap();

        match factory.connect(&uri).await {
            Err(ConfigurationError::VersionProbe { url, .. }) => {
                assert_eq!(url, "http://127.0.0.1:1/version")
            }
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("expected the probe to fail"),
        }
    }
}
