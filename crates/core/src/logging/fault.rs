//! Error details attached to warning-and-above log calls

use std::backtrace::{Backtrace, BacktraceStatus};
use std::error::Error;
use std::fmt;

/// An error and the chain of errors that caused it, flattened into text.
///
/// Each level carries a type name, a message and an optional stack trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fault {
    pub type_name: String,
    pub message: String,
    pub stack_trace: Option<String>,
    pub inner: Option<Box<Fault>>,
}

impl Fault {
    pub fn new(type_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            message: message.into(),
            stack_trace: None,
            inner: None,
        }
    }

    pub fn with_stack_trace(mut self, stack_trace: impl Into<String>) -> Self {
        self.stack_trace = Some(stack_trace.into());
        self
    }

    pub fn with_inner(mut self, inner: Fault) -> Self {
        self.inner = Some(Box::new(inner));
        self
    }

    /// Capture `error` and its `source()` chain.
    ///
    /// The outermost level gets the concrete type name and, when enabled via
    /// `RUST_BACKTRACE`, a backtrace of the current thread. Sources only
    /// expose `dyn Error`, so they are labelled `source`.
    pub fn capture<E: Error + 'static>(error: &E) -> Self {
        let mut fault = Self::from_dyn(std::any::type_name::<E>(), error);

        let backtrace = Backtrace::capture();
        if backtrace.status() == BacktraceStatus::Captured {
            fault.stack_trace = Some(backtrace.to_string());
        }
        fault
    }

    /// Build from an error trait object, walking its `source()` chain
    pub fn from_dyn(type_name: &str, error: &(dyn Error + 'static)) -> Self {
        let mut fault = Fault::new(type_name, error.to_string());
        if let Some(source) = error.source() {
            fault.inner = Some(Box::new(Fault::from_dyn("source", source)));
        }
        fault
    }

    /// Iterate over this fault and every inner fault, outermost first
    pub fn chain(&self) -> impl Iterator<Item = &Fault> {
        std::iter::successors(Some(self), |f| f.inner.as_deref())
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.type_name, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("outer failure")]
    struct Outer(#[source] Middle);

    #[derive(Debug, thiserror::Error)]
    #[error("middle failure")]
    struct Middle(#[source] std::io::Error);

    #[test]
    fn test_capture_walks_sources() {
        let error = Outer(Middle(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "data.yml missing",
        )));

        let fault = Fault::capture(&error);
        let messages: Vec<&str> = fault.chain().map(|f| f.message.as_str()).collect();

        assert_eq!(
            messages,
            vec!["outer failure", "middle failure", "data.yml missing"]
        );
        assert!(fault.type_name.ends_with("Outer"));
        assert_eq!(fault.chain().nth(1).unwrap().type_name, "source");
    }

    #[test]
    fn test_builder() {
        let fault = Fault::new("Outer", "a")
            .with_stack_trace("at outer")
            .with_inner(Fault::new("Inner", "b"));

        assert_eq!(fault.chain().count(), 2);
        assert_eq!(fault.to_string(), "Outer: a");
        assert_eq!(fault.stack_trace.as_deref(), Some("at outer"));
    }
}
