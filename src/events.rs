use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, trace};

/// Multicast event stream with last-value replay.
///
/// Wraps a tokio broadcast channel and remembers the most recently published
/// value. A new subscriber receives that value first, so late observers see
/// the current state instead of waiting for the next transition.
pub struct EventStream<T: Clone + Send + 'static> {
    sender: broadcast::Sender<T>,
    last: Arc<RwLock<Option<T>>>,
    capacity: usize,
    stats: Arc<RwLock<EventStreamStats>>,
}

/// Statistics for monitoring stream activity
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventStreamStats {
    /// Events delivered to at least one subscriber
    pub events_published: u64,
    /// Events published while nobody was subscribed
    pub events_dropped: u64,
}

impl<T: Clone + Send + 'static> EventStream<T> {
    /// Create a new event stream with the specified channel capacity
    pub fn new(capacity: usize) -> Self {
        debug!(capacity, "Creating new event stream");
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            last: Arc::new(RwLock::new(None)),
            capacity,
            stats: Arc::new(RwLock::new(EventStreamStats::default())),
        }
    }

    /// Subscribe to the stream.
    ///
    /// If a value has ever been published, the subscriber receives the most
    /// recent one before any live events.
    pub async fn subscribe(&self) -> Subscriber<T> {
        trace!("New subscriber registered to event stream");
        Subscriber {
            replay: self.last.read().await.clone(),
            receiver: self.sender.subscribe(),
        }
    }

    /// Publish a value to all current subscribers.
    ///
    /// Returns the number of subscribers the value was delivered to. A
    /// publish with no subscribers still updates the replay value and is
    /// counted as dropped rather than treated as an error.
    pub async fn publish(&self, value: T) -> usize {
        *self.last.write().await = Some(value.clone());

        match self.sender.send(value) {
            Ok(receivers) => {
                let mut stats = self.stats.write().await;
                stats.events_published += 1;
                trace!(receivers, "Event published");
                receivers
            }
            Err(_) => {
                // send only fails when there are no receivers
                let mut stats = self.stats.write().await;
                stats.events_dropped += 1;
                trace!("No receivers for event, value retained for replay");
                0
            }
        }
    }

    /// The most recently published value, if any
    pub async fn last(&self) -> Option<T> {
        self.last.read().await.clone()
    }

    /// Get current statistics
    pub async fn stats(&self) -> EventStreamStats {
        self.stats.read().await.clone()
    }

    /// The configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The current number of subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl<T: Clone + Send + 'static> Clone for EventStream<T> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
            last: Arc::clone(&self.last),
            capacity: self.capacity,
            stats: Arc::clone(&self.stats),
        }
    }
}

/// Subscriber for receiving events from a stream
pub struct Subscriber<T: Clone + Send + 'static> {
    receiver: broadcast::Receiver<T>,
    replay: Option<T>,
}

impl<T: Clone + Send + 'static> Subscriber<T> {
    /// Receive the next event.
    ///
    /// The first call yields the replayed value when one was available at
    /// subscription time.
    pub async fn recv(&mut self) -> Result<T, broadcast::error::RecvError> {
        if let Some(value) = self.replay.take() {
            return Ok(value);
        }
        self.receiver.recv().await
    }

    /// Non-blocking receive; `None` when no event is pending
    pub fn try_recv(&mut self) -> Option<T> {
        if let Some(value) = self.replay.take() {
            return Some(value);
        }
        self.receiver.try_recv().ok()
    }
}
