//! Composition root
//!
//! Wires the host services into the configuration, logging and messaging
//! components. The dependency graph is fixed, so everything is built here
//! with plain constructor arguments.

use std::sync::Arc;

use dynamis_host::HostServices;

use crate::config::ConfigurationContainer;
use crate::logging::{DeferredConfiguration, LoggerProvider, PluginLogger};
use crate::messaging::MessageHub;

/// A loaded plugin instance and the components it owns
pub struct Plugin {
    services: HostServices,
    message_hub: Arc<MessageHub>,
    configuration: Arc<ConfigurationContainer>,
    logger_provider: Arc<LoggerProvider>,
}

impl Plugin {
    /// Build every component from the host services.
    ///
    /// Nothing is read from the host yet; the configuration loads on first use.
    pub fn new(services: HostServices) -> Self {
        // Loggers exist before the container they ask for levels, so they
        // get a handle that is bound below
        let logging_configuration = DeferredConfiguration::new();
        let logger_provider = Arc::new(LoggerProvider::new(
            logging_configuration.clone(),
            services.plugin_log.clone(),
        ));

        let message_hub = Arc::new(MessageHub::new(services.framework_thread_id));
        let configuration = Arc::new(ConfigurationContainer::new(
            message_hub.clone(),
            services.plugin_interface.clone(),
        ));
        logging_configuration.bind(configuration.clone());

        Self {
            services,
            message_hub,
            configuration,
            logger_provider,
        }
    }

    pub fn services(&self) -> &HostServices {
        &self.services
    }

    pub fn configuration(&self) -> &Arc<ConfigurationContainer> {
        &self.configuration
    }

    pub fn message_hub(&self) -> &Arc<MessageHub> {
        &self.message_hub
    }

    pub fn logger_provider(&self) -> &Arc<LoggerProvider> {
        &self.logger_provider
    }

    /// Logger for a dotted category name
    pub fn logger(&self, category: &str) -> Arc<PluginLogger> {
        self.logger_provider.create_logger(category)
    }

    /// Per-frame work on the host framework thread
    ///
    /// Returns the number of deferred messages delivered.
    pub fn on_framework_update(&self) -> usize {
        self.message_hub.process_deferred()
    }

    /// Tear down before the host unloads the plugin.
    ///
    /// Delivers any messages still queued for the framework thread, then
    /// drops cached loggers. Unsaved configuration changes are discarded.
    pub fn shutdown(&self) {
        tracing::info!("Dynamis shutting down...");
        let delivered = self.message_hub.process_deferred();
        if delivered > 0 {
            tracing::debug!("Delivered {} deferred messages during shutdown", delivered);
        }
        self.logger_provider.dispose();
    }
}

impl std::fmt::Debug for Plugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Plugin")
            .field("services", &self.services)
            .field("message_hub", &self.message_hub)
            .field("logger_provider", &self.logger_provider)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io;
    use std::path::Path;

    use parking_lot::Mutex;

    use dynamis_sdk::{LogLevel, PluginInterface};

    use crate::logging::testing::{RecordingLog, Sink};
    use crate::messaging::ConfigurationChangedMessage;

    #[derive(Default)]
    struct MemoryStore {
        document: Mutex<Option<String>>,
    }

    impl PluginInterface for MemoryStore {
        fn internal_name(&self) -> &str {
            "Dynamis"
        }

        fn config_directory(&self) -> &Path {
            Path::new("/dev/null")
        }

        fn load_config(&self) -> io::Result<Option<String>> {
            Ok(self.document.lock().clone())
        }

        fn save_config(&self, document: &str) -> io::Result<()> {
            *self.document.lock() = Some(document.to_string());
            Ok(())
        }
    }

    fn plugin() -> (Plugin, Arc<RecordingLog>, Arc<MemoryStore>) {
        let log = Arc::new(RecordingLog::default());
        let store = Arc::new(MemoryStore::default());
        let services = HostServices::builder()
            .plugin_interface(store.clone())
            .plugin_log(log.clone())
            .build()
            .unwrap();
        (Plugin::new(services), log, store)
    }

    #[test]
    fn test_construction_defers_config_load() {
        let (plugin, _, _) = plugin();
        assert!(!plugin.configuration().is_loaded());
        assert!(plugin.logger_provider().configuration().is_bound());
        assert_eq!(plugin.configuration().internal_name(), "Dynamis");
    }

    #[test]
    fn test_logger_levels_follow_configuration() {
        let (plugin, log, _) = plugin();
        let logger = plugin.logger("Dynamis.UI.Windows.SettingsWindow");

        logger.debug("hidden");
        assert!(log.take().is_empty());
        assert!(plugin.configuration().is_loaded());

        plugin
            .configuration()
            .configuration_mut()
            .unwrap()
            .set_minimum_log_level(LogLevel::Trace);
        logger.debug("shown");

        assert_eq!(
            log.take(),
            vec![(Sink::Debug, "[ SettingsWindow]{1} shown".to_string())]
        );
    }

    #[test]
    fn test_save_notifies_subscribers_and_persists() {
        let (plugin, _, store) = plugin();
        let hints = Arc::new(Mutex::new(Vec::new()));
        let h = hints.clone();
        plugin
            .message_hub()
            .subscribe(move |m: &ConfigurationChangedMessage| h.lock().push(m.clone()));

        plugin.configuration().configuration_mut().unwrap().enable_ipfd = true;
        plugin.configuration().save(Some("enable_ipfd")).unwrap();

        let hints = hints.lock();
        assert_eq!(hints.len(), 1);
        assert!(hints[0].is_property_changed("enable_ipfd"));
        assert!(store
            .document
            .lock()
            .as_deref()
            .unwrap()
            .contains("enable_ipfd = true"));
    }

    #[test]
    fn test_framework_update_delivers_deferred_messages() {
        let (plugin, _, _) = plugin();
        let count = Arc::new(Mutex::new(0));
        let c = count.clone();
        plugin
            .message_hub()
            .subscribe(move |_: &ConfigurationChangedMessage| *c.lock() += 1);

        let hub = plugin.message_hub().clone();
        std::thread::spawn(move || {
            hub.publish_on_framework_thread(ConfigurationChangedMessage::default())
                .unwrap();
        })
        .join()
        .unwrap();

        assert_eq!(*count.lock(), 0);
        assert_eq!(plugin.on_framework_update(), 1);
        assert_eq!(*count.lock(), 1);
    }

    #[test]
    fn test_shutdown_clears_loggers() {
        let (plugin, _, _) = plugin();
        plugin.logger("Dynamis.Plugin");
        assert_eq!(plugin.logger_provider().len(), 1);

        plugin.shutdown();
        assert!(plugin.logger_provider().is_empty());
    }
}
