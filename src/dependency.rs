//! Collaborator handles that may be missing at runtime
//!
//! Services are built once at startup. A collaborator whose credentials or
//! endpoint could not be set up is recorded as [`Dependency::Unavailable`]
//! and reported as "disconnected" by health checks.

use crate::error::ApiError;
use std::sync::Arc;

/// A collaborator that is either ready to use or known to be missing
pub enum Dependency<T: ?Sized> {
    Connected(Arc<T>),
    Unavailable,
}

impl<T: ?Sized> Dependency<T> {
    /// Wrap an initialization result, logging why a collaborator is missing
    pub fn from_result(name: &str, result: crate::error::Result<Arc<T>>) -> Self {
        match result {
            Ok(handle) => {
                tracing::info!("{} initialized", name);
                Dependency::Connected(handle)
            }
            Err(e) => {
                tracing::warn!("{} unavailable: {}", name, e);
                Dependency::Unavailable
            }
        }
    }

    pub fn is_connected(&self) -> bool {
        matches!(self, Dependency::Connected(_))
    }

    /// Health-check status string
    pub fn status(&self) -> &'static str {
        if self.is_connected() {
            "connected"
        } else {
            "disconnected"
        }
    }

    pub fn get(&self) -> Option<&Arc<T>> {
        match self {
            Dependency::Connected(handle) => Some(handle),
            Dependency::Unavailable => None,
        }
    }

    /// Handle or a 503 naming the service
    pub fn require(&self, service: &str) -> Result<&Arc<T>, ApiError> {
        self.get().ok_or_else(|| ApiError::unavailable(service))
    }
}

impl<T: ?Sized> Clone for Dependency<T> {
    fn clone(&self) -> Self {
        match self {
            Dependency::Connected(handle) => Dependency::Connected(Arc::clone(handle)),
            Dependency::Unavailable => Dependency::Unavailable,
        }
    }
}

impl<T: ?Sized> Default for Dependency<T> {
    fn default() -> Self {
        Dependency::Unavailable
    }
}

impl<T: ?Sized> From<Arc<T>> for Dependency<T> {
    fn from(handle: Arc<T>) -> Self {
        Dependency::Connected(handle)
    }
}

impl<T: ?Sized> std::fmt::Debug for Dependency<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Dependency({})", self.status())
    }
}
