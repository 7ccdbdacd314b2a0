//! Logger registry keyed by shortened category name

use std::sync::Arc;

use dashmap::DashMap;

use dynamis_sdk::PluginLog;

use super::{DeferredConfiguration, PluginLogger};

/// Width of every logger display name
pub const DISPLAY_NAME_WIDTH: usize = 15;

/// Characters kept from each end of an abbreviated name
const ABBREVIATED_KEEP: usize = 7;

/// Derive the display name for a dotted category.
///
/// Keeps the last non-empty segment. Longer than [`DISPLAY_NAME_WIDTH`]
/// characters, it becomes the first 7 + `…` + the last 7; otherwise it is
/// left-padded with spaces to that width.
///
/// ```ignore
/// assert_eq!(display_name("Dynamis.UI.Windows.HomeWindow"), "     HomeWindow");
/// ```
pub fn display_name(category: &str) -> String {
    let segment = category
        .rsplit('.')
        .find(|s| !s.is_empty())
        .unwrap_or("");
    let len = segment.chars().count();

    if len > DISPLAY_NAME_WIDTH {
        let head: String = segment.chars().take(ABBREVIATED_KEEP).collect();
        let tail: String = segment.chars().skip(len - ABBREVIATED_KEEP).collect();
        format!("{}…{}", head, tail)
    } else {
        format!("{:>width$}", segment, width = DISPLAY_NAME_WIDTH)
    }
}

/// Creates one [`PluginLogger`] per display name and caches it.
///
/// Lookup ignores case. Concurrent first requests for the same name all
/// receive the same logger.
pub struct LoggerProvider {
    loggers: DashMap<String, Arc<PluginLogger>>,
    configuration: DeferredConfiguration,
    plugin_log: Arc<dyn PluginLog>,
}

impl LoggerProvider {
    pub fn new(configuration: DeferredConfiguration, plugin_log: Arc<dyn PluginLog>) -> Self {
        Self {
            loggers: DashMap::new(),
            configuration,
            plugin_log,
        }
    }

    /// Get or create the logger for `category`
    pub fn create_logger(&self, category: &str) -> Arc<PluginLogger> {
        let name = display_name(category);
        let key = name.to_lowercase();

        if let Some(logger) = self.loggers.get(&key) {
            return logger.value().clone();
        }

        self.loggers
            .entry(key)
            .or_insert_with(|| {
                Arc::new(PluginLogger::new(
                    name,
                    self.configuration.clone(),
                    self.plugin_log.clone(),
                ))
            })
            .value()
            .clone()
    }

    /// Handle shared by every logger this provider creates
    pub fn configuration(&self) -> &DeferredConfiguration {
        &self.configuration
    }

    /// Number of cached loggers
    pub fn len(&self) -> usize {
        self.loggers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loggers.is_empty()
    }

    /// Drop all cached loggers
    ///
    /// Loggers already handed out keep working. Not a synchronization point:
    /// a concurrent `create_logger` for a new category may repopulate the map.
    pub fn dispose(&self) {
        self.loggers.clear();
        tracing::debug!("Logger provider disposed");
    }
}

impl std::fmt::Debug for LoggerProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoggerProvider")
            .field("loggers", &self.loggers.len())
            .field("configuration", &self.configuration)
            .finish_non_exhaustive()
    }
}
