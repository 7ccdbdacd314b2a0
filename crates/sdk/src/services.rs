//! Host service traits
//!
//! The plugin host owns both the log output and the settings storage.
//! Dynamis only ever talks to them through these traits.

use std::io;
use std::path::Path;

/// Log sink provided by the host.
///
/// One method per severity. Each receives a fully formatted message;
/// the host decides where and how it is displayed.
pub trait PluginLog: Send + Sync {
    fn verbose(&self, message: &str);
    fn debug(&self, message: &str);
    fn information(&self, message: &str);
    fn warning(&self, message: &str);
    fn error(&self, message: &str);
    fn fatal(&self, message: &str);
}

/// Persistence boundary provided by the host.
///
/// Configuration documents are opaque strings at this level. Encoding is
/// chosen by the caller, storage location and format by the host.
pub trait PluginInterface: Send + Sync {
    /// Name the host knows this plugin by
    fn internal_name(&self) -> &str;

    /// Directory the host reserves for this plugin's files
    fn config_directory(&self) -> &Path;

    /// Load the persisted configuration document
    ///
    /// Returns `Ok(None)` when nothing has been saved yet.
    fn load_config(&self) -> io::Result<Option<String>>;

    /// Persist a configuration document, replacing any previous one
    fn save_config(&self, document: &str) -> io::Result<()>;
}
