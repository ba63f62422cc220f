//! Backends that execute (or simulate) units.
//!
//! Exactly two variants exist: [`live::LiveBackend`] calls the model
//! endpoint, [`noop::NoOpBackend`] answers locally with placeholders. The
//! trait is sealed; everything downstream holds an `Arc<dyn Backend>` chosen
//! once by [`selector::select_backend`].

pub mod live;
pub mod noop;
pub mod selector;

use std::fmt;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::FlowError;
use crate::registry::Unit;

/// Which backend variant is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendMode {
    Live,
    NoOp,
}

impl fmt::Display for BackendMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendMode::Live => f.write_str("live"),
            BackendMode::NoOp => f.write_str("noop"),
        }
    }
}

mod sealed {
    pub trait Sealed {}

    impl Sealed for super::live::LiveBackend {}
    impl Sealed for super::noop::NoOpBackend {}
}

/// Executes defined units.
#[async_trait]
pub trait Backend: sealed::Sealed + Send + Sync {
    fn mode(&self) -> BackendMode;

    /// Called once when a unit is registered against this backend.
    fn on_define(&self, unit: &Unit);

    /// Produce the unit's output for `input`.
    async fn run(&self, unit: &Unit, input: Value) -> Result<Value, FlowError>;
}
