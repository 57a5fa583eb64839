//! The etcd registry adapter
//!
//! One adapter is bound to exactly one protocol generation for its whole
//! life. Every operation first runs the cluster sync guard, then dispatches
//! on the binding; callers see the same behaviour whichever generation is
//! underneath.

use std::time::Duration;

use async_trait::async_trait;
use registrar_common::{RegistryAdapter, RegistryError, ServiceRecord};
use tracing::{debug, error};

use crate::{
    client::{CurrentClient, LegacyClient},
    error::StoreError,
    sync::SyncPolicy,
    version::ProtocolVersion,
};

/// The client an adapter was bound to at construction
pub enum Binding {
    Legacy(LegacyClient),
    Current(CurrentClient),
}

impl Binding {
    pub fn version(&self) -> ProtocolVersion {
        match self {
            Binding::Legacy(_) => ProtocolVersion::Legacy,
            Binding::Current(_) => ProtocolVersion::Current,
        }
    }

    /// Refresh the client's member list, reporting success
    pub async fn sync_cluster(&self) -> bool {
        match self {
            Binding::Legacy(client) => client.sync_cluster().await,
            Binding::Current(client) => match client.sync().await {
                Ok(()) => true,
                Err(e) => {
                    debug!("etcd: member sync failed: {}", e);
                    false
                }
            },
        }
    }

    /// Minimal read proving the store answers
    async fn read_root(&self) -> Result<(), StoreError> {
        match self {
            Binding::Legacy(client) => client.version().await.map(|_| ()),
            Binding::Current(client) => client.get("/").await.map(|_| ()),
        }
    }

    async fn write(&self, key: &str, value: &str, ttl: u64) -> Result<(), StoreError> {
        match self {
            Binding::Legacy(client) => client.set(key, value, ttl).await.map(|_| ()),
            Binding::Current(client) => client
                .set(key, value, Duration::from_secs(ttl))
                .await
                .map(|_| ()),
        }
    }

    // non-recursive on both generations
    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        match self {
            Binding::Legacy(client) => client.delete(key, false).await.map(|_| ()),
            Binding::Current(client) => client.delete(key).await.map(|_| ()),
        }
    }
}

/// `prefix/name/id`
pub fn store_key(prefix: &str, name: &str, id: &str) -> String {
    format!("{}/{}/{}", prefix, name, id)
}

pub struct EtcdAdapter {
    binding: Binding,
    prefix: String,
    sync_policy: SyncPolicy,
}

impl EtcdAdapter {
    pub fn new(binding: Binding, prefix: &str) -> Self {
        Self {
            binding,
            prefix: prefix.to_string(),
            sync_policy: SyncPolicy::default(),
        }
    }

    pub fn with_sync_policy(mut self, sync_policy: SyncPolicy) -> Self {
        self.sync_policy = sync_policy;
        self
    }

    pub fn binding(&self) -> &Binding {
        &self.binding
    }

    pub fn version(&self) -> ProtocolVersion {
        self.binding.version()
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn sync_policy(&self) -> SyncPolicy {
        self.sync_policy
    }

    /// Key the service instance is published under
    pub fn key_for(&self, service: &ServiceRecord) -> String {
        store_key(&self.prefix, &service.name, &service.id)
    }

    pub async fn ping(&self) -> Result<(), StoreError> {
        self.sync_policy.apply(&self.binding).await;

        let result = self.binding.read_root().await;
        if let Err(e) = &result {
            error!("etcd: ping failed: {}", e);
        }
        result
    }

    /// Write `ip:port` under the service key with the record's TTL
    pub async fn register(&self, service: &ServiceRecord) -> Result<(), StoreError> {
        self.sync_policy.apply(&self.binding).await;

        let key = self.key_for(service);
        let result = self
            .binding
            .write(&key, &service.host_port(), service.ttl)
            .await;

        if let Err(e) = &result {
            error!("etcd: failed to register service: {}", e);
        }
        result
    }

    pub async fn deregister(&self, service: &ServiceRecord) -> Result<(), StoreError> {
        self.sync_policy.apply(&self.binding).await;

        let key = self.key_for(service);
        let result = self.binding.delete(&key).await;

        if let Err(e) = &result {
            error!("etcd: failed to deregister service: {}", e);
        }
        result
    }

    /// TTL renewal is a plain re-write of the record
    pub async fn refresh(&self, service: &ServiceRecord) -> Result<(), StoreError> {
        self.register(service).await
    }

    /// Published services cannot be enumerated back from etcd; always empty
    pub async fn services(&self) -> Result<Vec<ServiceRecord>, StoreError> {
        Ok(Vec::new())
    }
}

#[async_trait]
impl RegistryAdapter for EtcdAdapter {
    async fn ping(&self) -> Result<(), RegistryError> {
        EtcdAdapter::ping(self).await.map_err(RegistryError::backend)
    }

    async fn register(&self, service: &ServiceRecord) -> Result<(), RegistryError> {
        EtcdAdapter::register(self, service)
            .await
            .map_err(RegistryError::backend)
    }

    async fn deregister(&self, service: &ServiceRecord) -> Result<(), RegistryError> {
        EtcdAdapter::deregister(self, service)
            .await
            .map_err(RegistryError::backend)
    }

    async fn refresh(&self, service: &ServiceRecord) -> Result<(), RegistryError> {
        EtcdAdapter::refresh(self, service)
            .await
            .map_err(RegistryError::backend)
    }

    async fn services(&self) -> Result<Vec<ServiceRecord>, RegistryError> {
        EtcdAdapter::services(self)
            .await
            .map_err(RegistryError::backend)
    }
}
