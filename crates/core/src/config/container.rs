//! Lazily loaded, explicitly saved configuration

use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::sync::{Arc, OnceLock};

use parking_lot::{Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};

use dynamis_sdk::{LogLevel, PluginInterface};

use super::{ConfigResult, Configuration};
use crate::logging::LoggingConfiguration;
use crate::messaging::{ConfigurationChangedMessage, MessageHub};

/// Owns the plugin's [`Configuration`].
///
/// The record is read through the host on first access, not at construction.
/// Saving writes it back and broadcasts a [`ConfigurationChangedMessage`].
pub struct ConfigurationContainer {
    message_hub: Arc<MessageHub>,
    plugin_interface: Arc<dyn PluginInterface>,
    configuration: OnceLock<RwLock<Configuration>>,
    /// Serializes the one-time load
    load_lock: Mutex<()>,
    /// Copy of `minimum_log_level`, readable without touching the record lock
    minimum_log_level: AtomicI32,
    /// Set once a load started from a log call has failed
    logging_load_failed: AtomicBool,
}

impl ConfigurationContainer {
    pub fn new(message_hub: Arc<MessageHub>, plugin_interface: Arc<dyn PluginInterface>) -> Self {
        Self {
            message_hub,
            plugin_interface,
            configuration: OnceLock::new(),
            load_lock: Mutex::new(()),
            minimum_log_level: AtomicI32::new(LogLevel::default().ordinal()),
            logging_load_failed: AtomicBool::new(false),
        }
    }

    /// Name the host knows this plugin by
    pub fn internal_name(&self) -> &str {
        self.plugin_interface.internal_name()
    }

    /// Whether the record has been loaded yet
    pub fn is_loaded(&self) -> bool {
        self.configuration.get().is_some()
    }

    /// Shared access to the record, loading it on first use
    pub fn configuration(&self) -> ConfigResult<RwLockReadGuard<'_, Configuration>> {
        Ok(self.cell()?.read())
    }

    /// Exclusive access to the record, loading it on first use
    ///
    /// Changes stay in memory until [`save`](Self::save) is called. The log
    /// threshold follows the record when the guard is dropped.
    pub fn configuration_mut(&self) -> ConfigResult<ConfigurationMut<'_>> {
        Ok(ConfigurationMut {
            guard: self.cell()?.write(),
            minimum_log_level: &self.minimum_log_level,
        })
    }

    /// Persist the record and notify observers.
    ///
    /// Does nothing if the record was never accessed, so untouched defaults
    /// are never written out. `changed_property_hint` names the setting that
    /// changed, or `None` for a bulk change.
    pub fn save(&self, changed_property_hint: Option<&str>) -> ConfigResult<()> {
        let Some(cell) = self.configuration.get() else {
            return Ok(());
        };

        let document = toml::to_string_pretty(&*cell.read())?;
        self.plugin_interface.save_config(&document)?;
        tracing::debug!(
            "Saved configuration for {} (hint: {:?})",
            self.internal_name(),
            changed_property_hint
        );

        self.message_hub.publish(ConfigurationChangedMessage::new(
            changed_property_hint.map(str::to_string),
        ));
        Ok(())
    }

    fn cell(&self) -> ConfigResult<&RwLock<Configuration>> {
        if let Some(cell) = self.configuration.get() {
            return Ok(cell);
        }
        let _guard = self.load_lock.lock();
        self.load_locked()
    }

    /// Load for a log call: never waits on a load in progress and gives up
    /// for good after the first failure.
    ///
    /// Logging calls made while the load itself runs (on this thread or
    /// another) keep the default threshold instead of deadlocking.
    fn load_for_logging(&self) {
        if self.configuration.get().is_some() || self.logging_load_failed.load(Ordering::Acquire) {
            return;
        }
        let Some(_guard) = self.load_lock.try_lock() else {
            return;
        };
        if let Err(e) = self.load_locked() {
            // Flag first: the warning below re-enters this method
            if !self.logging_load_failed.swap(true, Ordering::AcqRel) {
                tracing::warn!(
                    "Could not load configuration for {}, logging at the default level: {}",
                    self.internal_name(),
                    e
                );
            }
        }
    }

    /// Caller must hold `load_lock`
    fn load_locked(&self) -> ConfigResult<&RwLock<Configuration>> {
        if let Some(cell) = self.configuration.get() {
            return Ok(cell);
        }
        let configuration = self.load()?;
        self.minimum_log_level
            .store(configuration.minimum_log_level, Ordering::Release);
        Ok(self.configuration.get_or_init(|| RwLock::new(configuration)))
    }

    fn load(&self) -> ConfigResult<Configuration> {
        let Some(document) = self.plugin_interface.load_config()? else {
            tracing::info!("No saved configuration for {}, using defaults", self.internal_name());
            return Ok(Configuration::default());
        };

        match toml::from_str(&document) {
            Ok(configuration) => {
                tracing::debug!("Loaded configuration for {}", self.internal_name());
                Ok(configuration)
            }
            Err(e) => {
                tracing::warn!(
                    "Saved configuration for {} is unreadable, using defaults: {}",
                    self.internal_name(),
                    e
                );
                Ok(Configuration::default())
            }
        }
    }
}

impl LoggingConfiguration for ConfigurationContainer {
    /// Level check against `minimum_log_level`; `name` does not matter.
    ///
    /// Uses the default threshold until the record has been loaded. Never
    /// blocks on the record lock, so it is safe to call while a
    /// [`ConfigurationMut`] is held.
    fn is_enabled(&self, _name: &str, level: LogLevel) -> bool {
        self.load_for_logging();
        level.ordinal() >= self.minimum_log_level.load(Ordering::Acquire)
    }
}

/// Write access to the record from [`ConfigurationContainer::configuration_mut`]
pub struct ConfigurationMut<'a> {
    guard: RwLockWriteGuard<'a, Configuration>,
    minimum_log_level: &'a AtomicI32,
}

impl Deref for ConfigurationMut<'_> {
    type Target = Configuration;

    fn deref(&self) -> &Configuration {
        &self.guard
    }
}

impl DerefMut for ConfigurationMut<'_> {
    fn deref_mut(&mut self) -> &mut Configuration {
        &mut self.guard
    }
}

impl Drop for ConfigurationMut<'_> {
    fn drop(&mut self) {
        self.minimum_log_level
            .store(self.guard.minimum_log_level, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::config::{default_hex_viewer_palette, HEX_VIEWER_PALETTE_LEN};

    /// In-memory persistence boundary counting host calls
    #[derive(Default)]
    struct MemoryStore {
        document: Mutex<Option<String>>,
        loads: AtomicUsize,
        saves: AtomicUsize,
        fail_saves: bool,
        fail_loads: bool,
    }

    impl MemoryStore {
        fn with_document(document: &str) -> Self {
            Self {
                document: Mutex::new(Some(document.to_string())),
                ..Default::default()
            }
        }
    }

    impl PluginInterface for MemoryStore {
        fn internal_name(&self) -> &str {
            "Dynamis"
        }

        fn config_directory(&self) -> &Path {
            Path::new("/dev/null")
        }

        fn load_config(&self) -> io::Result<Option<String>> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            if self.fail_loads {
                return Err(io::Error::new(io::ErrorKind::PermissionDenied, "locked"));
            }
            Ok(self.document.lock().clone())
        }

        fn save_config(&self, document: &str) -> io::Result<()> {
            if self.fail_saves {
                return Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"));
            }
            self.saves.fetch_add(1, Ordering::SeqCst);
            *self.document.lock() = Some(document.to_string());
            Ok(())
        }
    }

    struct Fixture {
        store: Arc<MemoryStore>,
        hub: Arc<MessageHub>,
        container: ConfigurationContainer,
        notifications: Arc<Mutex<Vec<Option<String>>>>,
    }

    fn fixture(store: MemoryStore) -> Fixture {
        let store = Arc::new(store);
        let hub = Arc::new(MessageHub::new(std::thread::current().id()));
        let notifications = Arc::new(Mutex::new(Vec::new()));
        let sink = notifications.clone();
        hub.subscribe(move |message: &ConfigurationChangedMessage| {
            sink.lock().push(message.changed_property_hint.clone());
        });
        let container = ConfigurationContainer::new(hub.clone(), store.clone());
        Fixture {
            store,
            hub,
            container,
            notifications,
        }
    }

    #[test]
    fn test_construction_does_not_load() {
        let f = fixture(MemoryStore::default());
        assert!(!f.container.is_loaded());
        assert_eq!(f.store.loads.load(Ordering::SeqCst), 0);
        assert_eq!(f.container.internal_name(), "Dynamis");
    }

    #[test]
    fn test_save_before_load_is_noop() {
        let f = fixture(MemoryStore::default());

        f.container.save(Some("Foo")).unwrap();

        assert_eq!(f.store.saves.load(Ordering::SeqCst), 0);
        assert_eq!(f.store.loads.load(Ordering::SeqCst), 0);
        assert!(f.notifications.lock().is_empty());
        assert!(!f.container.is_loaded());
    }

    #[test]
    fn test_save_after_access_writes_once_and_notifies() {
        let f = fixture(MemoryStore::default());

        let _ = f.container.configuration().unwrap().version;
        f.container.save(Some("Foo")).unwrap();

        assert_eq!(f.store.saves.load(Ordering::SeqCst), 1);
        assert_eq!(*f.notifications.lock(), vec![Some("Foo".to_string())]);

        f.container.save(None).unwrap();
        assert_eq!(f.store.saves.load(Ordering::SeqCst), 2);
        assert_eq!(f.notifications.lock()[1], None);
    }

    #[test]
    fn test_load_happens_once() {
        let f = fixture(MemoryStore::with_document("version = 7\n"));

        assert_eq!(f.container.configuration().unwrap().version, 7);
        assert_eq!(f.container.configuration().unwrap().version, 7);
        assert!(f.container.is_enabled("any", LogLevel::Error));

        assert_eq!(f.store.loads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_concurrent_first_access_loads_once() {
        let f = fixture(MemoryStore::with_document("version = 3\n"));
        let barrier = std::sync::Barrier::new(8);

        std::thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| {
                    barrier.wait();
                    assert_eq!(f.container.configuration().unwrap().version, 3);
                });
            }
        });

        assert_eq!(f.store.loads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unreadable_document_falls_back_to_defaults() {
        let f = fixture(MemoryStore::with_document("this is = not [valid toml"));

        let configuration = f.container.configuration().unwrap();
        assert_eq!(*configuration, Configuration::default());
    }

    #[test]
    fn test_edits_round_trip_through_host() {
        let f = fixture(MemoryStore::with_document("hex_viewer_palette = [1, 2, 3]\n"));

        {
            let mut configuration = f.container.configuration_mut().unwrap();
            configuration.set_minimum_log_level(LogLevel::Debug);
            configuration.data_yaml_path = "C:/data.yml".to_string();
            let palette = configuration.hex_viewer_palette();
            assert_eq!(palette.len(), HEX_VIEWER_PALETTE_LEN);
            assert_eq!(&palette[3..], &default_hex_viewer_palette()[3..]);
        }
        f.container.save(Some("data_yaml_path")).unwrap();

        let reloaded = fixture(MemoryStore::with_document(
            f.store.document.lock().as_deref().unwrap(),
        ));
        let configuration = reloaded.container.configuration().unwrap();
        assert_eq!(configuration.minimum_log_level(), Some(LogLevel::Debug));
        assert_eq!(configuration.data_yaml_path, "C:/data.yml");
        assert_eq!(&configuration.hex_viewer_palette[..3], &[1, 2, 3]);
        assert_eq!(configuration.hex_viewer_palette.len(), HEX_VIEWER_PALETTE_LEN);
    }

    #[test]
    fn test_save_failure_propagates_without_notification() {
        let f = fixture(MemoryStore {
            fail_saves: true,
            ..Default::default()
        });

        let _ = f.container.configuration().unwrap();
        let err = f.container.save(Some("Foo")).unwrap_err();

        assert!(matches!(err, crate::config::ConfigError::Io(_)));
        assert!(f.notifications.lock().is_empty());
        assert_eq!(f.hub.subscriber_count(), 1);
    }

    #[test]
    fn test_is_enabled_threshold() {
        let f = fixture(MemoryStore::default());
        f.container
            .configuration_mut()
            .unwrap()
            .set_minimum_log_level(LogLevel::Warning);

        assert!(!f.container.is_enabled("Test", LogLevel::Information));
        assert!(f.container.is_enabled("Test", LogLevel::Warning));
        assert!(f.container.is_enabled("Other", LogLevel::Critical));
    }

    #[test]
    fn test_is_enabled_during_write_uses_stored_threshold() {
        let f = fixture(MemoryStore::with_document("minimum_log_level = 3\n"));
        assert!(!f.container.is_enabled("Test", LogLevel::Information));

        let guard = f.container.configuration_mut().unwrap();

        // Same thread holds the write lock; must not deadlock
        assert!(!f.container.is_enabled("Test", LogLevel::Information));
        assert!(f.container.is_enabled("Test", LogLevel::Warning));

        let other = std::thread::scope(|s| {
            s.spawn(|| f.container.is_enabled("Test", LogLevel::Information))
                .join()
                .unwrap()
        });
        assert!(!other);

        drop(guard);
        assert!(!f.container.is_enabled("Test", LogLevel::Information));
    }

    #[test]
    fn test_threshold_follows_write_guard_on_drop() {
        let f = fixture(MemoryStore::with_document("minimum_log_level = 3\n"));

        let mut guard = f.container.configuration_mut().unwrap();
        guard.set_minimum_log_level(LogLevel::Trace);
        assert!(!f.container.is_enabled("Test", LogLevel::Debug));

        drop(guard);
        assert!(f.container.is_enabled("Test", LogLevel::Debug));
        assert!(f.container.is_enabled("Test", LogLevel::Trace));
    }

    #[test]
    fn test_failed_load_is_not_retried_by_logging() {
        let f = fixture(MemoryStore {
            fail_loads: true,
            ..Default::default()
        });

        for _ in 0..100 {
            assert!(f.container.is_enabled("Test", LogLevel::Information));
            assert!(!f.container.is_enabled("Test", LogLevel::Debug));
        }
        assert_eq!(f.store.loads.load(Ordering::SeqCst), 1);
        assert!(!f.container.is_loaded());
    }

    #[test]
    fn test_failed_load_reaches_configuration_as_io_error() {
        let f = fixture(MemoryStore {
            fail_loads: true,
            ..Default::default()
        });

        let err = f.container.configuration().unwrap_err();
        assert!(matches!(err, crate::config::ConfigError::Io(_)));
        assert!(matches!(
            f.container.configuration_mut(),
            Err(crate::config::ConfigError::Io(_))
        ));

        // Nothing loaded, so nothing to save
        f.container.save(Some("Foo")).unwrap();
        assert_eq!(f.store.saves.load(Ordering::SeqCst), 0);
    }
}
