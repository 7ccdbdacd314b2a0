//! Host log sink backed by a C function pointer

use std::ffi::{c_char, c_int, CString};

use dynamis_sdk::{LogLevel, PluginLog};

/// Host log callback: receives the level ordinal and a null-terminated,
/// UTF-8 message that is only valid for the duration of the call.
pub type LogCallback = unsafe extern "C" fn(level: c_int, message: *const c_char);

/// [`PluginLog`] forwarding every message to a [`LogCallback`]
#[derive(Debug, Clone, Copy)]
pub struct CallbackLog {
    callback: LogCallback,
}

impl CallbackLog {
    /// # Safety
    /// `callback` must stay callable from any thread until this sink is dropped.
    pub unsafe fn new(callback: LogCallback) -> Self {
        Self { callback }
    }

    fn write(&self, level: LogLevel, message: &str) {
        // Interior NULs would truncate the message on the C side
        let message = match CString::new(message) {
            Ok(message) => message,
            Err(e) => {
                let bytes: Vec<u8> = e.into_vec().into_iter().filter(|b| *b != 0).collect();
                match CString::new(bytes) {
                    Ok(message) => message,
                    Err(_) => return,
                }
            }
        };

        // SAFETY: validity of the callback is guaranteed by the caller of `new`;
        // `message` outlives the call.
        unsafe { (self.callback)(level.ordinal(), message.as_ptr()) }
    }
}

impl PluginLog for CallbackLog {
    fn verbose(&self, message: &str) {
        self.write(LogLevel::Trace, message);
    }

    fn debug(&self, message: &str) {
        self.write(LogLevel::Debug, message);
    }

    fn information(&self, message: &str) {
        self.write(LogLevel::Information, message);
    }

    fn warning(&self, message: &str) {
        self.write(LogLevel::Warning, message);
    }

    fn error(&self, message: &str) {
        self.write(LogLevel::Error, message);
    }

    fn fatal(&self, message: &str) {
        self.write(LogLevel::Critical, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::ffi::CStr;

    use parking_lot::Mutex;

    static RECEIVED: Mutex<Vec<(c_int, String)>> = Mutex::new(Vec::new());

    unsafe extern "C" fn record(level: c_int, message: *const c_char) {
        let message = CStr::from_ptr(message).to_string_lossy().into_owned();
        RECEIVED.lock().push((level, message));
    }

    #[test]
    fn test_levels_map_to_ordinals() {
        let log = unsafe { CallbackLog::new(record) };

        log.verbose("v");
        log.information("i");
        log.fatal("f");
        log.warning("nul\0inside");

        let received: Vec<(c_int, String)> = RECEIVED
            .lock()
            .drain(..)
            .filter(|(_, m)| ["v", "i", "f", "nulinside"].contains(&m.as_str()))
            .collect();
        assert_eq!(
            received,
            vec![
                (0, "v".to_string()),
                (2, "i".to_string()),
                (5, "f".to_string()),
                (3, "nulinside".to_string()),
            ]
        );
    }
}
