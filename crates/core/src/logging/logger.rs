//! Per-category logger writing to the host sink

use std::convert::Infallible;
use std::fmt::{Display, Write};
use std::sync::Arc;

use dynamis_sdk::{LogLevel, PluginLog};

use super::{DeferredConfiguration, Fault, LoggingConfiguration};

/// Identifies a log event; accepted for API parity, not rendered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct EventId {
    pub id: i32,
    pub name: Option<&'static str>,
}

impl EventId {
    pub const fn new(id: i32) -> Self {
        Self { id, name: None }
    }
}

/// Logger for one category, created and cached by
/// [`LoggerProvider`](super::LoggerProvider).
///
/// Trace, Debug and Information messages are forwarded as a single line.
/// Warning and above carry the attached [`Fault`] chain with stack traces.
pub struct PluginLogger {
    name: String,
    configuration: DeferredConfiguration,
    plugin_log: Arc<dyn PluginLog>,
}

impl PluginLogger {
    pub(crate) fn new(
        name: String,
        configuration: DeferredConfiguration,
        plugin_log: Arc<dyn PluginLog>,
    ) -> Self {
        Self {
            name,
            configuration,
            plugin_log,
        }
    }

    /// Display name (already shortened and padded)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Scopes are not supported; never returns a guard
    pub fn begin_scope<S>(&self, _state: S) -> Option<Infallible> {
        None
    }

    pub fn is_enabled(&self, level: LogLevel) -> bool {
        self.configuration.is_enabled(&self.name, level)
    }

    /// Write `state` at `level`, with `fault` details for warnings and above.
    ///
    /// Makes exactly one call into the host sink when `level` is enabled and
    /// none otherwise.
    pub fn log<S: Display + ?Sized>(
        &self,
        level: LogLevel,
        _event_id: EventId,
        state: &S,
        fault: Option<&Fault>,
    ) {
        if !self.is_enabled(level) {
            return;
        }

        let ordinal = level.ordinal();
        match level {
            LogLevel::Trace => self
                .plugin_log
                .verbose(&format!("[{}]{{{}}} {}", self.name, ordinal, state)),
            LogLevel::Debug => self
                .plugin_log
                .debug(&format!("[{}]{{{}}} {}", self.name, ordinal, state)),
            LogLevel::Information => self
                .plugin_log
                .information(&format!("[{}]{{{}}} {}", self.name, ordinal, state)),
            LogLevel::Warning => self.plugin_log.warning(&self.report(ordinal, state, fault)),
            LogLevel::Error => self.plugin_log.error(&self.report(ordinal, state, fault)),
            LogLevel::Critical | LogLevel::None => {
                self.plugin_log.fatal(&self.report(ordinal, state, fault))
            }
        }
    }

    pub fn trace<S: Display + ?Sized>(&self, state: &S) {
        self.log(LogLevel::Trace, EventId::default(), state, None);
    }

    pub fn debug<S: Display + ?Sized>(&self, state: &S) {
        self.log(LogLevel::Debug, EventId::default(), state, None);
    }

    pub fn information<S: Display + ?Sized>(&self, state: &S) {
        self.log(LogLevel::Information, EventId::default(), state, None);
    }

    pub fn warning<S: Display + ?Sized>(&self, state: &S, fault: Option<&Fault>) {
        self.log(LogLevel::Warning, EventId::default(), state, fault);
    }

    pub fn error<S: Display + ?Sized>(&self, state: &S, fault: Option<&Fault>) {
        self.log(LogLevel::Error, EventId::default(), state, fault);
    }

    pub fn critical<S: Display + ?Sized>(&self, state: &S, fault: Option<&Fault>) {
        self.log(LogLevel::Critical, EventId::default(), state, fault);
    }

    /// Multi-line report: header, stack trace, then one block per inner fault
    fn report<S: Display + ?Sized>(&self, ordinal: i32, state: &S, fault: Option<&Fault>) -> String {
        let mut report = String::new();

        let message = fault.map_or("", |f| f.message.as_str());
        let _ = writeln!(report, "[{}]{{{}}} {}: {}", self.name, ordinal, state, message);
        let _ = writeln!(report, "{}", stack_trace(fault));

        let mut inner = fault.and_then(|f| f.inner.as_deref());
        while let Some(f) = inner {
            let _ = writeln!(report, "InnerException {}: {}", f.type_name, f.message);
            let _ = writeln!(report, "{}", stack_trace(Some(f)));
            inner = f.inner.as_deref();
        }

        report
    }
}

fn stack_trace(fault: Option<&Fault>) -> &str {
    fault.and_then(|f| f.stack_trace.as_deref()).unwrap_or("")
}

impl std::fmt::Debug for PluginLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginLogger")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
