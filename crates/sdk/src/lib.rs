//! Dynamis SDK - Host Boundary Definitions
//!
//! This crate describes the services a plugin host hands to Dynamis.
//! It has no dependencies and compiles quickly, allowing parallel compilation
//! of dependent crates.
//!
//! # Modules
//!
//! - [`level`] - Log severity levels shared by every logging surface
//! - [`services`] - Host service traits (log sink, config persistence)

pub mod level;
pub mod services;

pub use level::LogLevel;
pub use services::{PluginInterface, PluginLog};
