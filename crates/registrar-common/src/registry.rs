//! Backend lookup by URI scheme
//!
//! Each backend crate installs its factory under the scheme it serves
//! (`etcd://...`), and the host builds adapters straight from the URI it was
//! configured with.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;
use url::Url;

use crate::{AdapterFactory, RegistryAdapter, RegistryError};

/// Registered adapter factories, keyed by lowercase URI scheme
pub struct AdapterRegistry {
    factories: DashMap<String, Arc<dyn AdapterFactory>>,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self {
            factories: DashMap::new(),
        }
    }

    /// Install a factory for a scheme, replacing any previous one
    pub fn register(&self, scheme: &str, factory: Arc<dyn AdapterFactory>) {
        let scheme = scheme.to_lowercase();
        self.factories.insert(scheme.clone(), factory);
        debug!("Registered adapter factory: {}", scheme);
    }

    pub fn get_factory(&self, scheme: &str) -> Option<Arc<dyn AdapterFactory>> {
        self.factories
            .get(&scheme.to_lowercase())
            .map(|entry| entry.value().clone())
    }

    pub fn has_factory(&self, scheme: &str) -> bool {
        self.factories.contains_key(&scheme.to_lowercase())
    }

    /// Get all registered schemes
    pub fn schemes(&self) -> Vec<String> {
        self.factories.iter().map(|entry| entry.key().clone()).collect()
    }

    /// Build an adapter for `uri` using the factory registered for its scheme
    pub async fn create(&self, uri: &Url) -> Result<Box<dyn RegistryAdapter>, RegistryError> {
        let factory = self
            .get_factory(uri.scheme())
            .ok_or_else(|| RegistryError::UnknownScheme(uri.scheme().to_string()))?;

        factory.create(uri).await
    }
}

impl Default for AdapterRegistry {
    fn default() -> Self {
        Self::new()
    }
}
