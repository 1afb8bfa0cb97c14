//! # Message Bus
//!
//! Fan-out of inbound [`KinestexMessage`]s to any number of host listeners.
//!
//! Uses `tokio::sync::broadcast` internally:
//! - each `subscribe()` creates an independent receiver
//! - sends never block; messages are cloned per subscriber
//! - slow subscribers observe `RecvError::Lagged`
//!
//! [`MessageBus::messages`] wraps a receiver as a `Stream` that skips lag
//! notifications and ends when the bus is dropped.
//!
//! ```rust
//! use core_bridge::{KinestexMessage, MessageBus};
//!
//! let bus = MessageBus::new(16);
//! let mut receiver = bus.subscribe();
//! bus.publish(KinestexMessage::from_type("mistake", Default::default()));
//! assert!(receiver.try_recv().is_ok());
//! ```

use futures::stream::{self, Stream};
use std::fmt;
use tokio::sync::broadcast;
use tracing::warn;

use crate::message::KinestexMessage;

pub use tokio::sync::broadcast::error::RecvError;
pub use tokio::sync::broadcast::Receiver;

/// Messages buffered per subscriber before it starts lagging.
pub const DEFAULT_MESSAGE_BUFFER_SIZE: usize = 64;

#[derive(Clone)]
pub struct MessageBus {
    sender: broadcast::Sender<KinestexMessage>,
}

impl MessageBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Delivers `message` to every current subscriber.
    ///
    /// Returns the number of receivers reached; zero when nobody is listening.
    pub fn publish(&self, message: KinestexMessage) -> usize {
        self.sender.send(message).unwrap_or(0)
    }

    /// Receives all messages published after this call. Past messages are not replayed.
    pub fn subscribe(&self) -> Receiver<KinestexMessage> {
        self.sender.subscribe()
    }

    /// Subscribes and exposes the receiver as a `Stream`.
    pub fn messages(&self) -> impl Stream<Item = KinestexMessage> + Send + 'static {
        stream::unfold(self.subscribe(), |mut receiver| async move {
            loop {
                match receiver.recv().await {
                    Ok(message) => return Some((message, receiver)),
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Message subscriber lagged; dropping oldest messages");
                    }
                    Err(RecvError::Closed) => return None,
                }
            }
        })
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for MessageBus {
    fn default() -> Self {
        Self::new(DEFAULT_MESSAGE_BUFFER_SIZE)
    }
}

impl fmt::Debug for MessageBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}
