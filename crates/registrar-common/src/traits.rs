//! Backend contract
//!
//! A host only ever talks to a registry through these two traits. It does
//! not know which store, or which protocol generation of a store, sits
//! behind them.

use async_trait::async_trait;
use url::Url;

use crate::{RegistryError, ServiceRecord};

/// A connected registry backend
#[async_trait]
pub trait RegistryAdapter: Send + Sync {
    /// Check that the backing store answers
    async fn ping(&self) -> Result<(), RegistryError>;

    /// Publish a service instance
    async fn register(&self, service: &ServiceRecord) -> Result<(), RegistryError>;

    /// Withdraw a service instance
    async fn deregister(&self, service: &ServiceRecord) -> Result<(), RegistryError>;

    /// Renew a published instance before its TTL lapses
    async fn refresh(&self, service: &ServiceRecord) -> Result<(), RegistryError>;

    /// Instances currently published by this backend
    async fn services(&self) -> Result<Vec<ServiceRecord>, RegistryError>;
}

/// Builds adapters for one URI scheme
#[async_trait]
pub trait AdapterFactory: Send + Sync {
    async fn create(&self, uri: &Url) -> Result<Box<dyn RegistryAdapter>, RegistryError>;
}
