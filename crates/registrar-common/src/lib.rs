//! Registrar Common - Shared types and traits for registry backends
//!
//! This crate provides the seam between a host that publishes services and
//! the coordination stores it publishes them into:
//! - `ServiceRecord`: one running service instance
//! - `RegistryAdapter` / `AdapterFactory`: the backend contract
//! - `AdapterRegistry`: backend lookup by URI scheme
//! - `RegistryError`: the error type crossing the seam

pub mod error;
pub mod model;
pub mod registry;
pub mod traits;

// Re-exports for convenience
pub use error::RegistryError;
pub use model::ServiceRecord;
pub use registry::AdapterRegistry;
pub use traits::{AdapterFactory, RegistryAdapter};
