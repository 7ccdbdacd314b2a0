//! Host service bundle
//!
//! Host services are acquired once during plugin load and handed to the
//! composition root. Unlike engine interfaces in a native plugin, nothing
//! here is global: the bundle is an ordinary value that can be cloned and
//! dropped.

use std::sync::Arc;
use std::thread::ThreadId;

use dynamis_sdk::{PluginInterface, PluginLog};

use crate::error::{HostError, HostResult};

/// Services provided by the plugin host
#[derive(Clone)]
pub struct HostServices {
    /// Persistence boundary (required)
    pub plugin_interface: Arc<dyn PluginInterface>,

    /// Log sink (required)
    pub plugin_log: Arc<dyn PluginLog>,

    /// Host framework thread ID for thread affinity checks
    pub framework_thread_id: ThreadId,
}

impl HostServices {
    /// Start collecting services
    ///
    /// The calling thread is recorded as the framework thread unless
    /// overridden with [`HostServicesBuilder::framework_thread`].
    pub fn builder() -> HostServicesBuilder {
        HostServicesBuilder::default()
    }

    /// Check if current thread is the host framework thread
    pub fn is_framework_thread(&self) -> bool {
        std::thread::current().id() == self.framework_thread_id
    }

    /// Name the host knows this plugin by
    pub fn internal_name(&self) -> &str {
        self.plugin_interface.internal_name()
    }
}

impl std::fmt::Debug for HostServices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostServices")
            .field("internal_name", &self.internal_name())
            .field("framework_thread_id", &self.framework_thread_id)
            .finish_non_exhaustive()
    }
}

/// Builder for [`HostServices`]
#[derive(Default)]
pub struct HostServicesBuilder {
    plugin_interface: Option<Arc<dyn PluginInterface>>,
    plugin_log: Option<Arc<dyn PluginLog>>,
    framework_thread_id: Option<ThreadId>,
}

impl HostServicesBuilder {
    /// Set the persistence boundary
    pub fn plugin_interface(mut self, service: Arc<dyn PluginInterface>) -> Self {
        self.plugin_interface = Some(service);
        self
    }

    /// Set the log sink
    pub fn plugin_log(mut self, service: Arc<dyn PluginLog>) -> Self {
        self.plugin_log = Some(service);
        self
    }

    /// Override the framework thread (defaults to the thread calling `build`)
    pub fn framework_thread(mut self, id: ThreadId) -> Self {
        self.framework_thread_id = Some(id);
        self
    }

    /// Finish, failing if a required service is missing
    pub fn build(self) -> HostResult<HostServices> {
        let plugin_interface = self
            .plugin_interface
            .ok_or(HostError::MissingService("plugin_interface"))?;
        let plugin_log = self
            .plugin_log
            .ok_or(HostError::MissingService("plugin_log"))?;

        Ok(HostServices {
            plugin_interface,
            plugin_log,
            framework_thread_id: self
                .framework_thread_id
                .unwrap_or_else(|| std::thread::current().id()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::FileConfigStore;

    struct NullLog;

    impl PluginLog for NullLog {
        fn verbose(&self, _: &str) {}
        fn debug(&self, _: &str) {}
        fn information(&self, _: &str) {}
        fn warning(&self, _: &str) {}
        fn error(&self, _: &str) {}
        fn fatal(&self, _: &str) {}
    }

    fn store() -> Arc<dyn PluginInterface> {
        Arc::new(FileConfigStore::new("/tmp/dynamis-test", "Dynamis").unwrap())
    }

    #[test]
    fn test_build_requires_services() {
        let err = HostServices::builder().build().unwrap_err();
        assert!(matches!(err, HostError::MissingService("plugin_interface")));

        let err = HostServices::builder()
            .plugin_interface(store())
            .build()
            .unwrap_err();
        assert!(matches!(err, HostError::MissingService("plugin_log")));
    }

    #[test]
    fn test_framework_thread_defaults_to_builder_thread() {
        let services = HostServices::builder()
            .plugin_interface(store())
            .plugin_log(Arc::new(NullLog))
            .build()
            .unwrap();

        assert!(services.is_framework_thread());
        assert_eq!(services.internal_name(), "Dynamis");

        let clone = services.clone();
        std::thread::spawn(move || assert!(!clone.is_framework_thread()))
            .join()
            .unwrap();
    }
}
