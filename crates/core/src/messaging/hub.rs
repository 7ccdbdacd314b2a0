//! Typed message hub
//!
//! Observers are stored in a slotmap keyed by [`SubscriptionKey`] and invoked
//! synchronously by [`MessageHub::publish`]. Messages published from other
//! threads can be deferred to the host framework thread and are delivered by
//! [`MessageHub::process_deferred`] on the next framework tick.

use std::any::{Any, TypeId};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::ThreadId;

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use parking_lot::RwLock;
use slotmap::{new_key_type, SlotMap};

use super::MessagingError;

new_key_type! {
    /// Key for registered observers, used for removal
    pub struct SubscriptionKey;
}

/// Capacity of the deferred message queue
pub const DEFERRED_QUEUE_CAPACITY: usize = 1024;

type Observer = Arc<dyn Fn(&dyn Any) + Send + Sync>;

/// A publish waiting for the framework thread
type Deferred = Box<dyn FnOnce(&MessageHub) + Send + 'static>;

struct Subscription {
    type_id: TypeId,
    observer: Observer,
}

/// Broadcasts messages to every observer of the message's type
pub struct MessageHub {
    subscriptions: RwLock<SlotMap<SubscriptionKey, Subscription>>,
    sender: Sender<Deferred>,
    receiver: Receiver<Deferred>,
    framework_thread_id: ThreadId,
}

impl MessageHub {
    /// Create a hub whose deferred messages are delivered on `framework_thread_id`
    pub fn new(framework_thread_id: ThreadId) -> Self {
        let (sender, receiver) = bounded(DEFERRED_QUEUE_CAPACITY);
        Self {
            subscriptions: RwLock::new(SlotMap::with_key()),
            sender,
            receiver,
            framework_thread_id,
        }
    }

    /// Register a callback for messages of type `T`
    ///
    /// # Returns
    /// A key that can be used to unregister the callback via `unsubscribe`.
    pub fn subscribe<T, F>(&self, callback: F) -> SubscriptionKey
    where
        T: 'static,
        F: Fn(&T) + Send + Sync + 'static,
    {
        let observer: Observer = Arc::new(move |message: &dyn Any| {
            if let Some(message) = message.downcast_ref::<T>() {
                callback(message);
            }
        });

        self.subscriptions.write().insert(Subscription {
            type_id: TypeId::of::<T>(),
            observer,
        })
    }

    /// Remove an observer
    ///
    /// Returns `true` if the observer was found and removed.
    pub fn unsubscribe(&self, key: SubscriptionKey) -> bool {
        self.subscriptions.write().remove(key).is_some()
    }

    /// Number of registered observers, across all message types
    pub fn subscriber_count(&self) -> usize {
        self.subscriptions.read().len()
    }

    /// Deliver `message` to every observer of `T` on the calling thread.
    ///
    /// A panicking observer is logged and skipped; the others still run.
    /// Observers may publish or subscribe from inside their callback.
    ///
    /// # Returns
    /// The number of observers that handled the message without panicking.
    pub fn publish<T: 'static>(&self, message: T) -> usize {
        let type_id = TypeId::of::<T>();
        let observers: Vec<Observer> = self
            .subscriptions
            .read()
            .values()
            .filter(|s| s.type_id == type_id)
            .map(|s| s.observer.clone())
            .collect();

        let mut delivered = 0;
        for observer in observers {
            match catch_unwind(AssertUnwindSafe(|| observer(&message as &dyn Any))) {
                Ok(()) => delivered += 1,
                Err(payload) => {
                    tracing::error!(
                        "Error while dispatching message of type {}: {}",
                        std::any::type_name::<T>(),
                        panic_message(payload.as_ref())
                    );
                }
            }
        }
        delivered
    }

    /// Publish a default-constructed message
    pub fn publish_default<T: Default + 'static>(&self) -> usize {
        self.publish(T::default())
    }

    /// Publish on the host framework thread.
    ///
    /// Delivers immediately when already on the framework thread, otherwise
    /// queues the message for the next [`process_deferred`](Self::process_deferred).
    pub fn publish_on_framework_thread<T: Send + 'static>(
        &self,
        message: T,
    ) -> Result<(), MessagingError> {
        if self.is_framework_thread() {
            self.publish(message);
            return Ok(());
        }

        let deferred: Deferred = Box::new(move |hub| {
            hub.publish(message);
        });
        match self.sender.try_send(deferred) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => {
                tracing::warn!("Deferred message queue full, dropping message");
                Err(MessagingError::QueueFull)
            }
            Err(TrySendError::Disconnected(_)) => {
                tracing::error!("Deferred message queue disconnected");
                Err(MessagingError::Disconnected)
            }
        }
    }

    /// Deliver queued messages
    ///
    /// Called from the framework tick. Returns the number of messages processed.
    pub fn process_deferred(&self) -> usize {
        let mut count = 0;

        // Messages queued while draining wait for the next tick
        while let Ok(deferred) = self.receiver.try_recv() {
            deferred(self);
            count += 1;

            if count >= DEFERRED_QUEUE_CAPACITY {
                break;
            }
        }

        count
    }

    /// Number of messages waiting for the framework thread
    pub fn deferred_count(&self) -> usize {
        self.receiver.len()
    }

    pub fn is_framework_thread(&self) -> bool {
        std::thread::current().id() == self.framework_thread_id
    }
}

impl std::fmt::Debug for MessageHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageHub")
            .field("subscribers", &self.subscriber_count())
            .field("deferred", &self.deferred_count())
            .finish()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic"
    }
}
