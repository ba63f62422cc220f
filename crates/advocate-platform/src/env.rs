//! Environment variable abstraction.
//!
//! The backend selector reads credentials through [`Environment`] so that
//! tests (and embedders) can supply a fixed map instead of the process
//! environment.

use std::collections::HashMap;

/// Read-only environment variable access.
pub trait Environment: Send + Sync {
    /// Get the value of an environment variable, or `None` if it is not set.
    fn get_var(&self, name: &str) -> Option<String>;
}

/// Native implementation using [`std::env`].
pub struct NativeEnvironment;

impl Environment for NativeEnvironment {
    fn get_var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// Fixed in-memory environment.
#[derive(Debug, Clone, Default)]
pub struct MapEnvironment {
    vars: HashMap<String, String>,
}

impl MapEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter.
    pub fn with_var(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }
}

impl Environment for MapEnvironment {
    fn get_var(&self, name: &str) -> Option<String> {
        self.vars.get(name).cloned()
    }
}
