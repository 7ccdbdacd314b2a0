//! C-compatible exports called by the plugin host

use std::ffi::{c_char, c_int, CStr};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, LazyLock};

use parking_lot::Mutex;
use tracing::instrument;
use tracing_subscriber::prelude::*;

use dynamis_core::logging::HostLogLayer;
use dynamis_core::Plugin;
use dynamis_host::{FileConfigStore, HostError, HostServices};
use dynamis_sdk::LogLevel;

use super::log::{CallbackLog, LogCallback};

// Plugin metadata - static strings with null terminators for C compatibility
static AUTHOR: &[u8] = b"Exter-N\0";
static NAME: &[u8] = b"Dynamis\0";
static DESCRIPTION: &[u8] = b"Game client inspection and debugging toolbox\0";
static URL: &[u8] = b"https://github.com/Exter-N/Dynamis\0";
static LICENSE: &[u8] = b"MIT\0";
static VERSION: &[u8] = b"0.1.0\0";

/// Currently loaded plugin instance
///
/// Exports clone the instance out and release the lock before running any
/// plugin code, so the host may call back into an export from its log
/// callback.
static PLUGIN: Mutex<Option<Arc<Plugin>>> = Mutex::new(None);

/// Process-wide `tracing` layer, installed on first load and re-attached on
/// every later load
static LOG_LAYER: LazyLock<HostLogLayer> = LazyLock::new(|| {
    let layer = HostLogLayer::detached();
    let _ = tracing_subscriber::registry().with(layer.clone()).try_init();
    layer
});

/// Called when the host loads the plugin
///
/// # Safety
/// - `config_dir` and `internal_name` must be valid null-terminated C strings
/// - `log_callback` must stay callable from any thread until `dynamis_plugin_unload`
/// - `error` must be a valid pointer to a buffer of at least `maxlen` bytes, or null
#[no_mangle]
#[instrument(skip_all)]
pub unsafe extern "C" fn dynamis_plugin_load(
    config_dir: *const c_char,
    internal_name: *const c_char,
    log_callback: Option<LogCallback>,
    error: *mut c_char,
    maxlen: usize,
) -> bool {
    // Validate host arguments
    let Some(log_callback) = log_callback else {
        write_error(error, maxlen, "Log callback is null");
        return false;
    };
    let Some(config_dir) = c_str(config_dir) else {
        write_error(error, maxlen, "Config directory is null or not UTF-8");
        return false;
    };
    let Some(internal_name) = c_str(internal_name) else {
        write_error(error, maxlen, "Internal name is null or not UTF-8");
        return false;
    };

    let mut slot = PLUGIN.lock();
    if slot.is_some() {
        write_error(error, maxlen, &HostError::AlreadyInitialized.to_string());
        return false;
    }

    let store = match FileConfigStore::new(config_dir, internal_name) {
        Ok(store) => store,
        Err(e) => {
            write_error(error, maxlen, &format!("Host error: {}", e));
            return false;
        }
    };

    let services = match HostServices::builder()
        .plugin_interface(Arc::new(store))
        .plugin_log(Arc::new(CallbackLog::new(log_callback)))
        .build()
    {
        Ok(services) => services,
        Err(e) => {
            write_error(error, maxlen, &format!("Host error: {}", e));
            return false;
        }
    };

    let plugin = Plugin::new(services);
    LOG_LAYER.attach(plugin.logger_provider().clone());
    *slot = Some(Arc::new(plugin));
    drop(slot);

    tracing::info!("Dynamis loaded for {}", internal_name);
    tracing::debug!("Framework thread ID: {:?}", std::thread::current().id());

    true
}

/// Called when the host unloads the plugin
///
/// # Safety
/// - `error` must be a valid pointer to a buffer of at least `maxlen` bytes, or null
#[no_mangle]
#[instrument(skip_all)]
pub unsafe extern "C" fn dynamis_plugin_unload(error: *mut c_char, maxlen: usize) -> bool {
    let Some(plugin) = PLUGIN.lock().take() else {
        return true;
    };

    let result = catch_unwind(AssertUnwindSafe(|| plugin.shutdown()));
    LOG_LAYER.detach();

    match result {
        Ok(()) => true,
        Err(_) => {
            write_error(error, maxlen, "Panic during shutdown");
            false
        }
    }
}

/// Called from the host framework thread once per frame
#[no_mangle]
pub extern "C" fn dynamis_on_framework_update() {
    if let Some(plugin) = loaded_plugin() {
        plugin.on_framework_update();
    }
}

/// Persist the configuration and notify observers
///
/// # Safety
/// - `hint` must be a valid null-terminated C string, or null for a bulk change
#[no_mangle]
pub unsafe extern "C" fn dynamis_save_configuration(hint: *const c_char) -> bool {
    let Some(plugin) = loaded_plugin() else {
        return false;
    };

    match plugin.configuration().save(c_str(hint)) {
        Ok(()) => true,
        Err(e) => {
            tracing::error!("Failed to save configuration: {}", e);
            false
        }
    }
}

/// Change the minimum log level and save it
///
/// Returns false for an unknown level ordinal or a failed save.
#[no_mangle]
pub extern "C" fn dynamis_set_minimum_log_level(level: c_int) -> bool {
    let Some(level) = LogLevel::from_ordinal(level) else {
        return false;
    };
    let Some(plugin) = loaded_plugin() else {
        return false;
    };

    let container = plugin.configuration();
    let result = container
        .configuration_mut()
        .map(|mut configuration| configuration.set_minimum_log_level(level))
        .and_then(|()| container.save(Some("minimum_log_level")));

    match result {
        Ok(()) => true,
        Err(e) => {
            tracing::error!("Failed to set minimum log level: {}", e);
            false
        }
    }
}

/// Write a message through the plugin's logger for `category`
///
/// # Safety
/// - `category` and `message` must be valid null-terminated C strings
#[no_mangle]
pub unsafe extern "C" fn dynamis_write_log(
    level: c_int,
    category: *const c_char,
    message: *const c_char,
) -> bool {
    let (Some(level), Some(category), Some(message)) =
        (LogLevel::from_ordinal(level), c_str(category), c_str(message))
    else {
        return false;
    };
    let Some(plugin) = loaded_plugin() else {
        return false;
    };

    plugin
        .logger(category)
        .log(level, Default::default(), message, None);
    true
}

// Metadata exports - these return static strings for the host to display

#[no_mangle]
pub extern "C" fn dynamis_get_author() -> *const c_char {
    AUTHOR.as_ptr() as *const c_char
}

#[no_mangle]
pub extern "C" fn dynamis_get_name() -> *const c_char {
    NAME.as_ptr() as *const c_char
}

#[no_mangle]
pub extern "C" fn dynamis_get_description() -> *const c_char {
    DESCRIPTION.as_ptr() as *const c_char
}

#[no_mangle]
pub extern "C" fn dynamis_get_url() -> *const c_char {
    URL.as_ptr() as *const c_char
}

#[no_mangle]
pub extern "C" fn dynamis_get_license() -> *const c_char {
    LICENSE.as_ptr() as *const c_char
}

#[no_mangle]
pub extern "C" fn dynamis_get_version() -> *const c_char {
    VERSION.as_ptr() as *const c_char
}

fn loaded_plugin() -> Option<Arc<Plugin>> {
    PLUGIN.lock().clone()
}

/// Borrow a C string as UTF-8
///
/// # Safety
/// - `ptr` must be a valid null-terminated C string or null
unsafe fn c_str<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok()
}

/// Helper to write an error message to a C buffer
///
/// # Safety
/// - `error` must be a valid pointer or null
/// - `maxlen` must accurately reflect the buffer size
unsafe fn write_error(error: *mut c_char, maxlen: usize, msg: &str) {
    if !error.is_null() && maxlen > 0 {
        let bytes = msg.as_bytes();
        let len = bytes.len().min(maxlen - 1);
        std::ptr::copy_nonoverlapping(bytes.as_ptr(), error as *mut u8, len);
        *error.add(len) = 0;
    }
}
