use std::fmt::Debug;

use tokio::sync::broadcast::{self, error::RecvError};

const CHANNEL_CAPACITY: usize = 64;

/// Fan-out of store changes to whoever subscribed. Views that fall behind
/// see `RecvError::Lagged` and should re-read the store.
#[derive(Debug)]
pub struct Notifier<E> {
    tx: broadcast::Sender<E>,
}

impl<E: Clone> Notifier<E> {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<E> {
        self.tx.subscribe()
    }

    pub fn notify(&self, event: E) {
        // no receivers is the common case
        let _ = self.tx.send(event);
    }
}

impl<E: Clone> Default for Notifier<E> {
    fn default() -> Self {
        Self::new()
    }
}

/// Traces every event a store emits until the store is dropped.
pub fn spawn_logger<E>(mut rx: broadcast::Receiver<E>, store: &'static str)
where
    E: Clone + Debug + Send + 'static,
{
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => tracing::debug!(store, ?event, "store event"),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(store, skipped, "store event log fell behind");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });
}
