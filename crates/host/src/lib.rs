//! Dynamis Host - Service Bundle and Storage
//!
//! This crate handles:
//! - Collecting the services a plugin host provides into [`HostServices`]
//! - A file-backed [`PluginInterface`](dynamis_sdk::PluginInterface) for hosts
//!   that only hand over a directory
//! - Resolving config file paths
//!
//! # Architecture
//!
//! Services are gathered once during plugin load via [`HostServicesBuilder`]
//! and passed explicitly to the composition root in `dynamis-core`. Nothing
//! here is stored in a global.
//!
//! # Thread Safety
//!
//! Every service is `Send + Sync` and shared through `Arc`. The host's
//! framework thread ID is captured at build time for runtime checks via
//! [`HostServices::is_framework_thread`].

pub mod error;
pub mod services;
pub mod store;

pub use error::{HostError, HostResult};
pub use services::{HostServices, HostServicesBuilder};
pub use store::{plugin_config_path, FileConfigStore};
