//! Registry of motion backends.
//!
//! Provides a `BackendRegistry` struct for registering and retrieving backend
//! factories. Constructor-injected, no global state.

use std::collections::HashMap;
use wcs_common::hal::backend::{BackendError, BackendFactory, MotionBackend};

use crate::drivers::register_all_backends;

/// Registry of available motion backends.
pub struct BackendRegistry {
    factories: HashMap<&'static str, BackendFactory>,
}

impl BackendRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Create a registry holding every built-in backend.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        register_all_backends(&mut registry);
        registry
    }

    /// Register a backend factory.
    ///
    /// # Panics
    /// Panics if a backend with the same name is already registered.
    pub fn register(&mut self, name: &'static str, factory: BackendFactory) {
        if self.factories.contains_key(name) {
            panic!("Backend '{name}' is already registered");
        }
        self.factories.insert(name, factory);
    }

    /// Get a backend factory by name.
    pub fn get_factory(&self, name: &str) -> Option<BackendFactory> {
        self.factories.get(name).copied()
    }

    /// Create a backend instance by name.
    ///
    /// # Errors
    /// Returns `BackendError::BackendNotFound` if no backend with the given name is registered.
    pub fn create_backend(&self, name: &str) -> Result<Box<dyn MotionBackend>, BackendError> {
        let factory = self
            .get_factory(name)
            .ok_or_else(|| BackendError::BackendNotFound(name.to_string()))?;
        Ok(factory())
    }

    /// List all registered backend names, sorted.
    pub fn list_backends(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.factories.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

impl Default for BackendRegistry {
    fn default() -> Self {
        Self::new()
    }
}
