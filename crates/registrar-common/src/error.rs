//! Error type shared by all registry backends

use std::error::Error as StdError;

/// Errors crossing the adapter seam
///
/// Backend failures are carried as-is inside `Backend`; use
/// [`RegistryError::downcast_ref`] to get the backend's own error back.
#[derive(thiserror::Error, Debug)]
pub enum RegistryError {
    #[error("unknown registry scheme: {0}")]
    UnknownScheme(String),

    #[error("{0}")]
    Backend(Box<dyn StdError + Send + Sync + 'static>),
}

impl RegistryError {
    /// Wrap a backend error without altering it
    pub fn backend<E>(err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        RegistryError::Backend(Box::new(err))
    }

    pub fn downcast_ref<E: StdError + 'static>(&self) -> Option<&E> {
        match self {
            RegistryError::Backend(inner) => (**inner).downcast_ref::<E>(),
            RegistryError::UnknownScheme(_) => None,
        }
    }
}
