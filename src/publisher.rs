//! Fan-out of engine events to any number of subscribers.

use std::sync::atomic::{AtomicU64, Ordering};

use crossbeam::channel::{self, Receiver, Sender, TrySendError};
use parking_lot::Mutex;

use crate::{
    error::{Error, Result},
    event::Event,
};

/// A live subscription. Dropping it unsubscribes on the next published event.
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    events: Receiver<Event>,
}

impl Subscription {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Receiving end of this subscription's queue.
    pub fn events(&self) -> &Receiver<Event> {
        &self.events
    }
}

/// Registry of bounded per-subscriber queues.
///
/// Delivery never blocks: a subscriber whose queue is full misses that event and
/// [`Publisher::emit`] reports [`Error::ChannelBlocked`]; everyone else still receives it.
#[derive(Debug)]
pub struct Publisher {
    subscribers: Mutex<Vec<(u64, Sender<Event>)>>,
    capacity: usize,
    next_id: AtomicU64,
}

impl Publisher {
    pub fn new(capacity: usize) -> Self {
        Self {
            subscribers: Mutex::new(Vec::new()),
            capacity: capacity.max(1),
            next_id: AtomicU64::new(0),
        }
    }

    pub fn subscribe(&self) -> Subscription {
        let (tx, rx) = channel::bounded(self.capacity);
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.subscribers.lock().push((id, tx));
        tracing::debug!(id, "subscribed");
        Subscription { id, events: rx }
    }

    /// Stop delivering to `subscription`. Events already queued stay readable.
    pub fn unsubscribe(&self, subscription: &Subscription) {
        self.subscribers
            .lock()
            .retain(|(id, _)| *id != subscription.id);
        tracing::debug!(id = subscription.id, "unsubscribed");
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }

    /// Offer `event` to every subscriber.
    pub fn emit(&self, event: Event) -> Result<()> {
        let mut result = Ok(());
        self.subscribers
            .lock()
            .retain(|(id, tx)| match tx.try_send(event.clone()) {
                Ok(()) => true,
                Err(TrySendError::Full(_)) => {
                    tracing::warn!(id, "subscriber channel blocked, event dropped");
                    result = Err(Error::ChannelBlocked);
                    true
                }
                Err(TrySendError::Disconnected(_)) => {
                    tracing::debug!(id, "subscriber gone");
                    false
                }
            });
        result
    }

    /// Drop every sender so receivers see the end of the stream.
    pub fn close(&self) {
        self.subscribers.lock().clear();
    }
}
