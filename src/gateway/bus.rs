use super::{EngineEvent, EventStream};
use futures_util::StreamExt;
use tokio::sync::broadcast;

/// One-to-many fan-out of engine events. Emission is lossy by design: with
/// no live subscribers events are dropped, and a lagging subscriber skips
/// ahead rather than stalling the emitter.
pub struct EngineEventBus {
    tx: broadcast::Sender<EngineEvent>,
    capacity: usize,
}

impl EngineEventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    pub fn emit(&self, event: EngineEvent) {
        // No receivers is fine; the stream simply has no audience right now.
        let _ = self.tx.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.tx.subscribe()
    }

    /// Subscribes and adapts the receiver into a stream that ends when the
    /// bus is dropped. Dropping the stream releases the subscription.
    pub fn stream(&self) -> EventStream {
        let rx = self.tx.subscribe();
        futures_util::stream::unfold(rx, |mut rx| async move {
            loop {
                match rx.recv().await {
                    Ok(event) => return Some((event, rx)),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        log::warn!("engine event stream lagged, skipped {skipped} events");
                    }
                    Err(broadcast::error::RecvError::Closed) => return None,
                }
            }
        })
        .boxed()
    }
}

impl Default for EngineEventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
