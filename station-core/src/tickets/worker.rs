//! Ticket expiry sweep
//!
//! A clock-tick driven worker that prunes aged tickets from every queue.
//! The sweep runs every second; any fixed short interval works since
//! eviction compares against ticket timestamps, not tick counts.

use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use super::TicketStore;

/// Periodic expiry sweep over the three ticket queues
pub struct ExpiryWorker {
    store: Arc<TicketStore>,
    interval: Duration,
}

impl ExpiryWorker {
    pub fn new(store: Arc<TicketStore>, interval: Duration) -> Self {
        Self { store, interval }
    }

    /// Run until the cancellation token fires
    pub async fn run(self, cancel: CancellationToken) {
        let mut tick = tokio::time::interval(self.interval);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::debug!("Ticket expiry sweep stopped");
                    break;
                }
                _ = tick.tick() => {
                    self.store.expire(shared::util::now_millis());
                }
            }
        }
    }
}
