//! Sync reconciler - drains locally staged orders to the remote store
//!
//! While the terminal is offline, finalized orders accumulate in the
//! durable queue. The drain submits them one by one: a record leaves the
//! queue only after the remote confirms the write, and a failed submission
//! aborts the rest of the drain (earlier confirmed deletions stand).
//! Reads are resilient: the published order list falls back to the local
//! queue when the remote is unreachable.

use parking_lot::RwLock;
use shared::AppResult;
use shared::models::{OrderRecord, OrderSubmission};
use std::sync::Arc;

use crate::remote::OrderGateway;
use crate::storage::StationStorage;

/// Reconciler between the local order queue and the remote order store
pub struct SyncService {
    storage: StationStorage,
    remote: Arc<dyn OrderGateway>,
    orders: RwLock<Vec<OrderRecord>>,
}

impl SyncService {
    pub fn new(remote: Arc<dyn OrderGateway>, storage: StationStorage) -> Self {
        Self {
            storage,
            remote,
            orders: RwLock::new(Vec::new()),
        }
    }

    /// Last published authoritative order list
    pub fn orders(&self) -> Vec<OrderRecord> {
        self.orders.read().clone()
    }

    /// Stage a finalized order for a later drain
    ///
    /// Entry point for the invoice finalization flow when the remote write
    /// cannot be confirmed immediately.
    pub fn enqueue_order(&self, order: OrderRecord) -> AppResult<()> {
        self.storage.enqueue_order(&order)?;
        tracing::info!(order_id = %order.id, "Order staged in offline queue");
        Ok(())
    }

    /// Orders currently waiting in the offline queue
    pub fn queued_orders(&self) -> AppResult<Vec<OrderRecord>> {
        Ok(self.storage.queued_orders()?)
    }

    /// Fetch the authoritative order list, falling back to the local queue
    pub async fn load_orders(&self) -> Vec<OrderRecord> {
        match self.remote.fetch_orders().await {
            Ok(fresh) => {
                *self.orders.write() = fresh.clone();
                fresh
            }
            Err(e) => {
                tracing::warn!(error = %e, "Order fetch failed, serving offline queue");
                self.storage.queued_orders().unwrap_or_default()
            }
        }
    }

    /// Submit every queued order to the remote store
    ///
    /// Per record: strip server-only fields, normalize the phone, submit,
    /// and only on confirmed success delete it locally and re-fetch the
    /// authoritative list. The first failed submission aborts the drain.
    /// Returns the number of confirmed submissions.
    pub async fn drain_offline_orders(&self) -> AppResult<usize> {
        let queue = self.storage.queued_orders()?;
        if queue.is_empty() {
            return Ok(0);
        }
        tracing::info!(queued = queue.len(), "Draining offline orders");

        let mut submitted = 0;
        for record in queue {
            let payload = OrderSubmission::from(&record);
            if let Err(e) = self.remote.submit_order(&payload).await {
                tracing::error!(order_id = %record.id, submitted, error = %e, "Order sync aborted");
                return Err(e);
            }

            // Confirmed write: the local copy can go
            self.storage.delete_queued_order(&record.id)?;
            submitted += 1;

            match self.remote.fetch_orders().await {
                Ok(fresh) => *self.orders.write() = fresh,
                Err(e) => {
                    tracing::warn!(error = %e, "Order list refresh failed after sync");
                }
            }
        }

        tracing::info!(submitted, "Offline orders synced");
        Ok(submitted)
    }

    /// Delete an order from the remote store
    ///
    /// Destructive and gated on remote confirmation; the published list is
    /// updated only afterwards.
    pub async fn remove_order(&self, id: &str) -> AppResult<()> {
        self.remote.remove_order(id).await?;
        self.orders.write().retain(|o| o.id != id);
        tracing::info!(order_id = %id, "Order removed from remote store");
        Ok(())
    }
}
