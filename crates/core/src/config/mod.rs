//! Configuration system for Dynamis
//!
//! This module provides:
//! - The persisted settings record ([`Configuration`])
//! - A container that loads it lazily through the host and saves it on demand
//!   ([`ConfigurationContainer`])
//! - Enum helpers for settings shown in the UI
//!
//! # Example
//!
//! ```ignore
//! use dynamis_core::config::ConfigurationContainer;
//! use dynamis_sdk::LogLevel;
//!
//! fn lower_log_level(container: &ConfigurationContainer) -> dynamis_core::ConfigResult<()> {
//!     container.configuration_mut()?.set_minimum_log_level(LogLevel::Debug);
//!     container.save(Some("minimum_log_level"))
//! }
//! ```

mod container;
mod palette;

use serde::{Deserialize, Serialize};

use dynamis_sdk::LogLevel;

pub use container::{ConfigurationContainer, ConfigurationMut};
pub use palette::{default_hex_viewer_palette, HexViewerColor, HEX_VIEWER_PALETTE_LEN};

/// Configuration system errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Host failed to read or write the config document
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to serialize config to TOML
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// Stored value does not name a symbol handler mode
    #[error("Invalid symbol handler mode {0}")]
    InvalidSymbolHandlerMode(i32),
}

/// Result type for config operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// How the debug symbol handler is initialized
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[repr(i32)]
pub enum SymbolHandlerMode {
    Disable = 0,
    #[default]
    Default = 1,
    ForceInitialize = 2,
}

impl SymbolHandlerMode {
    /// All modes in display order
    pub const ALL: [SymbolHandlerMode; 3] = [
        SymbolHandlerMode::Disable,
        SymbolHandlerMode::Default,
        SymbolHandlerMode::ForceInitialize,
    ];

    /// Label shown in the settings UI
    pub const fn label(self) -> &'static str {
        match self {
            SymbolHandlerMode::Disable => "Disable",
            SymbolHandlerMode::Default => "Default",
            SymbolHandlerMode::ForceInitialize => "Force Initialize",
        }
    }
}

impl TryFrom<i32> for SymbolHandlerMode {
    type Error = ConfigError;

    fn try_from(value: i32) -> ConfigResult<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|mode| *mode as i32 == value)
            .ok_or(ConfigError::InvalidSymbolHandlerMode(value))
    }
}

/// Persisted plugin settings.
///
/// Loaded lazily by [`ConfigurationContainer`], mutated in place by the
/// settings UI and only written back on an explicit save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    /// Config version for future migration support
    pub version: i32,

    /// Lowest [`LogLevel`] ordinal forwarded to the host log
    pub minimum_log_level: i32,

    /// Fetch ClientStructs' data.yml updates automatically
    pub auto_update_data_yaml: bool,

    /// Path of the data.yml in use (empty: use the bundled copy)
    pub data_yaml_path: String,

    /// ETag of the last fetched data.yml, for conditional requests
    pub data_yaml_etag: Option<String>,

    /// Hex viewer colors (ABGR), indexed by [`HexViewerColor`].
    ///
    /// May be shorter than the default when written by an older version;
    /// read it through [`Configuration::hex_viewer_palette`].
    pub hex_viewer_palette: Vec<u32>,

    /// Enable the hardware breakpoint driver
    pub enable_ipfd: bool,

    /// Whether the last snapshot was viewed with annotations
    pub last_snapshot_annotated: bool,

    pub symbol_handler_mode: SymbolHandlerMode,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            version: 0,
            minimum_log_level: LogLevel::Information.ordinal(),
            auto_update_data_yaml: true,
            data_yaml_path: String::new(),
            data_yaml_etag: None,
            hex_viewer_palette: default_hex_viewer_palette().to_vec(),
            enable_ipfd: false,
            last_snapshot_annotated: true,
            symbol_handler_mode: SymbolHandlerMode::default(),
        }
    }
}

impl Configuration {
    /// Hex viewer palette, grown to the default length if needed.
    ///
    /// A stored palette shorter than the default keeps its entries as a
    /// prefix; the rest come from the default palette. The grown palette
    /// replaces the stored one, so later calls see the full length.
    pub fn hex_viewer_palette(&mut self) -> &mut [u32] {
        let default = default_hex_viewer_palette();
        let stored = self.hex_viewer_palette.len();

        if stored < default.len() {
            let mut palette = default.to_vec();
            palette[..stored].copy_from_slice(&self.hex_viewer_palette);
            self.hex_viewer_palette = palette;
        }

        &mut self.hex_viewer_palette
    }

    /// Minimum level as an enum, if the stored ordinal is in range
    pub fn minimum_log_level(&self) -> Option<LogLevel> {
        LogLevel::from_ordinal(self.minimum_log_level)
    }

    pub fn set_minimum_log_level(&mut self, level: LogLevel) {
        self.minimum_log_level = level.ordinal();
    }

    /// Check a level against the stored threshold
    pub fn is_level_enabled(&self, level: LogLevel) -> bool {
        level.ordinal() >= self.minimum_log_level
    }
}
