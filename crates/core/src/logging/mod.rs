//! Host log bridge
//!
//! Routes structured log output into the host's [`PluginLog`] sink:
//!
//! ```text
//! tracing event → HostLogLayer → LoggerProvider (per category) → PluginLogger → PluginLog
//! ```
//!
//! [`PluginLogger`] decides whether a level is enabled by asking a
//! [`LoggingConfiguration`]. That configuration usually lives in a component
//! which itself logs while being built, so loggers hold a
//! [`DeferredConfiguration`] that is bound once the composition root has
//! created it.
//!
//! # Example
//!
//! ```ignore
//! use dynamis_core::logging::{DeferredConfiguration, HostLogLayer, LoggerProvider};
//! use tracing_subscriber::prelude::*;
//!
//! let configuration = DeferredConfiguration::new();
//! let provider = Arc::new(LoggerProvider::new(configuration.clone(), plugin_log));
//! tracing_subscriber::registry()
//!     .with(HostLogLayer::new(provider.clone()))
//!     .try_init()?;
//! configuration.bind(container);
//! ```
//!
//! [`PluginLog`]: dynamis_sdk::PluginLog

mod fault;
mod layer;
mod logger;
mod provider;

use std::sync::{Arc, OnceLock};

use dynamis_sdk::LogLevel;

pub use fault::Fault;
pub use layer::HostLogLayer;
pub use logger::{EventId, PluginLogger};
pub use provider::{display_name, LoggerProvider, DISPLAY_NAME_WIDTH};

/// Decides which log levels reach the host
pub trait LoggingConfiguration: Send + Sync {
    /// Whether messages at `level` from category `name` should be written
    fn is_enabled(&self, name: &str, level: LogLevel) -> bool;
}

/// Shared, bind-once handle to the [`LoggingConfiguration`].
///
/// Clones share the same slot. Until [`bind`](Self::bind) is called, levels
/// at or above the default ([`LogLevel::Information`]) are enabled.
#[derive(Clone, Default)]
pub struct DeferredConfiguration {
    slot: Arc<OnceLock<Arc<dyn LoggingConfiguration>>>,
}

impl DeferredConfiguration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind the configuration
    ///
    /// Returns `false` if a configuration was already bound; the first one
    /// stays in place.
    pub fn bind(&self, configuration: Arc<dyn LoggingConfiguration>) -> bool {
        self.slot.set(configuration).is_ok()
    }

    pub fn is_bound(&self) -> bool {
        self.slot.get().is_some()
    }
}

impl LoggingConfiguration for DeferredConfiguration {
    fn is_enabled(&self, name: &str, level: LogLevel) -> bool {
        match self.slot.get() {
            Some(configuration) => configuration.is_enabled(name, level),
            None => level >= LogLevel::default(),
        }
    }
}

impl std::fmt::Debug for DeferredConfiguration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeferredConfiguration")
            .field("bound", &self.is_bound())
            .finish()
    }
}
