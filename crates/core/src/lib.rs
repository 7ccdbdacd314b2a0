//! Dynamis - Core Logic
//!
//! This crate contains the plugin's bootstrap layer: configuration
//! persistence, the bridge from `tracing` to the host log, and in-process
//! messaging.
//!
//! # Re-exports
//!
//! This crate re-exports the SDK and host crates for convenience:
//! - [`sdk`] - Host boundary traits and log levels
//! - [`host`] - Host service bundle and file-backed config store

pub use dynamis_host as host;
pub use dynamis_sdk as sdk;

pub mod config;
pub mod logging;
pub mod messaging;
pub mod plugin;

// Re-export commonly used items
pub use config::{
    ConfigError, ConfigResult, Configuration, ConfigurationContainer, ConfigurationMut,
    HexViewerColor, SymbolHandlerMode,
};
pub use logging::{
    DeferredConfiguration, EventId, Fault, HostLogLayer, LoggerProvider, LoggingConfiguration,
    PluginLogger,
};
pub use messaging::{ConfigurationChangedMessage, MessageHub, MessagingError, SubscriptionKey};
pub use plugin::Plugin;
