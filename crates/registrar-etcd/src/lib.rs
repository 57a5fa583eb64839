//! Registrar etcd - etcd backend for the registrar adapter seam
//!
//! This crate provides:
//! - Transport construction with optional mutual TLS
//! - One-shot detection of the store generation (etcd 0.4 vs 2.x)
//! - HTTP clients for both generations' key APIs
//! - `EtcdAdapter`, bound to exactly one of those clients, publishing
//!   `prefix/name/id = ip:port` records with a TTL
//! - A best-effort cluster sync run before every store operation

pub mod adapter;
pub mod client;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod factory;
pub mod sync;
pub mod transport;
pub mod version;

pub use adapter::{Binding, EtcdAdapter, store_key};
pub use config::EtcdTlsConfig;
pub use endpoint::{DEFAULT_HOST, Endpoint};
pub use error::{ConfigurationError, EtcdApiError, StoreError};
pub use factory::{EtcdFactory, SCHEME, register};
pub use sync::{SyncOutcome, SyncPolicy};
pub use version::ProtocolVersion;
