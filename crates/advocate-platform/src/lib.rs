//! Platform abstraction layer for advocate.
//!
//! Provides traits for the platform-dependent operations the conversation
//! runtime needs (environment lookup, filesystem access, local key-value
//! state) so the core crate never touches the OS directly.
//!
//! # Architecture
//!
//! The [`Platform`] trait bundles the capabilities via accessor methods.
//! Each capability has its own trait ([`env::Environment`],
//! [`fs::FileSystem`]) with a native implementation. Local persistence of
//! preferences goes through [`kv::KeyValueStore`].

pub mod config_loader;
pub mod env;
pub mod fs;
pub mod kv;

/// Bundle of platform capabilities.
pub trait Platform: Send + Sync {
    /// Filesystem operations.
    fn fs(&self) -> &dyn fs::FileSystem;

    /// Environment variable access.
    fn env(&self) -> &dyn env::Environment;
}

/// Native platform backed by `tokio::fs` and the process environment.
pub struct NativePlatform {
    fs: fs::NativeFileSystem,
    env: env::NativeEnvironment,
}

impl NativePlatform {
    pub fn new() -> Self {
        Self {
            fs: fs::NativeFileSystem,
            env: env::NativeEnvironment,
        }
    }
}

impl Default for NativePlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl Platform for NativePlatform {
    fn fs(&self) -> &dyn fs::FileSystem {
        &self.fs
    }

    fn env(&self) -> &dyn env::Environment {
        &self.env
    }
}
