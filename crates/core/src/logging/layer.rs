//! `tracing` integration
//!
//! Every `tracing` event is turned into a [`PluginLogger`] call:
//! - the target (`dynamis_core::config::container`) becomes a dotted category
//!   (`dynamis_core.config.container`) for [`LoggerProvider::create_logger`]
//! - the `message` field becomes the logged state, other fields are appended
//!   as `key=value`
//! - a field recorded as an error becomes the [`Fault`]
//!
//! [`PluginLogger`]: super::PluginLogger

use std::error::Error;
use std::fmt::{self, Write};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

use dynamis_sdk::LogLevel;

use super::{EventId, Fault, LoggerProvider};

/// Layer forwarding `tracing` events to the host log.
///
/// Clones share the provider slot. A global subscriber can only be installed
/// once per process, so a plugin that is unloaded and loaded again detaches
/// its old provider and attaches the new one to the same layer. Events seen
/// while detached are dropped.
#[derive(Debug, Clone, Default)]
pub struct HostLogLayer {
    provider: Arc<RwLock<Option<Arc<LoggerProvider>>>>,
}

impl HostLogLayer {
    /// Layer attached to `provider`
    pub fn new(provider: Arc<LoggerProvider>) -> Self {
        let layer = Self::detached();
        layer.attach(provider);
        layer
    }

    /// Layer with no provider yet
    pub fn detached() -> Self {
        Self::default()
    }

    /// Route events to `provider`, replacing any previous one
    pub fn attach(&self, provider: Arc<LoggerProvider>) {
        *self.provider.write() = Some(provider);
    }

    /// Stop routing events; returns the provider that was attached
    pub fn detach(&self) -> Option<Arc<LoggerProvider>> {
        self.provider.write().take()
    }

    pub fn is_attached(&self) -> bool {
        self.provider.read().is_some()
    }
}

impl<S: Subscriber> Layer<S> for HostLogLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let Some(provider) = self.provider.read().clone() else {
            return;
        };

        let metadata = event.metadata();
        let level = log_level(metadata.level());
        let logger = provider.create_logger(&category(metadata.target()));

        if !logger.is_enabled(level) {
            return;
        }

        let mut visitor = EventVisitor::default();
        event.record(&mut visitor);

        // Plain levels drop the fault, so keep its text in the line
        let include_fault = level < LogLevel::Warning;
        logger.log(
            level,
            EventId::default(),
            &visitor.render(include_fault),
            visitor.fault.as_ref(),
        );
    }
}

/// `a::b::c` → `a.b.c`
fn category(target: &str) -> String {
    target.replace("::", ".")
}

fn log_level(level: &Level) -> LogLevel {
    if *level == Level::TRACE {
        LogLevel::Trace
    } else if *level == Level::DEBUG {
        LogLevel::Debug
    } else if *level == Level::INFO {
        LogLevel::Information
    } else if *level == Level::WARN {
        LogLevel::Warning
    } else {
        LogLevel::Error
    }
}

#[derive(Default)]
struct EventVisitor {
    message: String,
    fields: Vec<(&'static str, String)>,
    fault: Option<Fault>,
    fault_field: Option<&'static str>,
}

impl EventVisitor {
    fn render(&self, include_fault: bool) -> String {
        let mut out = self.message.clone();

        for (name, value) in &self.fields {
            if !out.is_empty() {
                out.push(' ');
            }
            let _ = write!(out, "{}={}", name, value);
        }

        if include_fault {
            if let (Some(name), Some(fault)) = (self.fault_field, &self.fault) {
                if !out.is_empty() {
                    out.push(' ');
                }
                let _ = write!(out, "{}={}", name, fault.message);
            }
        }

        out
    }
}

impl Visit for EventVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.fields.push((field.name(), value.to_string()));
        }
    }

    fn record_error(&mut self, field: &Field, value: &(dyn Error + 'static)) {
        self.fault = Some(Fault::from_dyn("Error", value));
        self.fault_field = Some(field.name());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        } else {
            self.fields.push((field.name(), format!("{:?}", value)));
        }
    }
}
