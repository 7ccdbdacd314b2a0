//! In-process messaging
//!
//! A typed publish/subscribe hub used to broadcast state changes (such as a
//! configuration save) without components holding references to each other.
//!
//! # Example
//!
//! ```ignore
//! use dynamis_core::messaging::{ConfigurationChangedMessage, MessageHub};
//!
//! let key = hub.subscribe(|message: &ConfigurationChangedMessage| {
//!     if message.is_property_changed("data_yaml_path") {
//!         tracing::info!("data.yml path changed, reloading");
//!     }
//! });
//!
//! // Later, unsubscribe if needed
//! hub.unsubscribe(key);
//! ```

mod hub;
mod messages;

pub use hub::{MessageHub, SubscriptionKey, DEFERRED_QUEUE_CAPACITY};
pub use messages::ConfigurationChangedMessage;

/// Messaging errors
#[derive(Debug, thiserror::Error)]
pub enum MessagingError {
    /// Too many messages waiting for the framework thread
    #[error("Deferred message queue is full")]
    QueueFull,

    /// Deferred message queue has no receiver
    #[error("Deferred message queue disconnected")]
    Disconnected,
}
