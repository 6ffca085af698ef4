//! Ticket Store - three independent kitchen-ticket queues
//!
//! One queue per order type (delivery / dine-in / takeaway). A ticket is a
//! value-copy snapshot of the cart at print time; later cart mutations
//! never touch it. Lifetimes: a pending ticket leaves its queue on delete,
//! on edit (items go back into the draft cart), or when the expiry sweep
//! evicts it; staging for the invoice flow leaves it queued until the
//! destination flow completes.
//!
//! Queues hydrate from the scratchpad at startup and every mutation
//! re-persists the owning queue as a full snapshot.

pub mod render;
pub mod worker;

pub use worker::ExpiryWorker;

use parking_lot::RwLock;
use shared::models::{CartLine, KotTicket, OrderType};
use shared::{AppError, AppResult};
use std::collections::HashMap;
use std::sync::Arc;

use crate::scratchpad::{Scratchpad, keys};

/// Ticket lifetime before the expiry sweep evicts it (2 hours)
pub const EXPIRY_MS: i64 = 2 * 60 * 60 * 1000;

/// Owner of the three kitchen-ticket queues
pub struct TicketStore {
    queues: RwLock<HashMap<OrderType, Vec<KotTicket>>>,
    scratchpad: Arc<Scratchpad>,
}

impl TicketStore {
    /// Create the store, hydrating every queue from the scratchpad
    pub fn new(scratchpad: Arc<Scratchpad>) -> Self {
        let mut queues = HashMap::new();
        for order_type in OrderType::ALL {
            let queue: Vec<KotTicket> = scratchpad
                .get_json(&keys::ticket_queue(order_type))
                .unwrap_or_default();
            if !queue.is_empty() {
                tracing::debug!(order_type = %order_type, tickets = queue.len(), "Restored ticket queue");
            }
            queues.insert(order_type, queue);
        }
        Self {
            queues: RwLock::new(queues),
            scratchpad,
        }
    }

    /// Snapshot the given cart into a new pending ticket
    pub fn print(&self, items: Vec<CartLine>, order_type: OrderType) -> AppResult<KotTicket> {
        let ticket = KotTicket::new(items, order_type);
        {
            let mut queues = self.queues.write();
            queues.entry(order_type).or_default().push(ticket.clone());
        }
        self.persist(order_type)?;
        tracing::info!(order_type = %order_type, ticket_id = ticket.id, "Kitchen ticket printed");
        Ok(ticket)
    }

    /// Tickets of one queue, insertion order
    pub fn tickets(&self, order_type: OrderType) -> Vec<KotTicket> {
        self.queues
            .read()
            .get(&order_type)
            .cloned()
            .unwrap_or_default()
    }

    /// Number of pending tickets in one queue
    pub fn queue_len(&self, order_type: OrderType) -> usize {
        self.queues
            .read()
            .get(&order_type)
            .map(Vec::len)
            .unwrap_or(0)
    }

    /// Remove a ticket immediately
    ///
    /// An unknown id is a warned no-op: the ticket may already have been
    /// evicted by the expiry sweep.
    pub fn delete(&self, order_type: OrderType, ticket_id: i64) -> AppResult<()> {
        let removed = {
            let mut queues = self.queues.write();
            let queue = queues.entry(order_type).or_default();
            let before = queue.len();
            queue.retain(|t| t.id != ticket_id);
            queue.len() != before
        };
        if !removed {
            tracing::warn!(order_type = %order_type, ticket_id, "Delete for a ticket not in the queue");
            return Ok(());
        }
        self.persist(order_type)
    }

    /// Remove a ticket and hand its items back for draft editing
    pub fn take_for_edit(&self, order_type: OrderType, ticket_id: i64) -> AppResult<Vec<CartLine>> {
        let ticket = {
            let mut queues = self.queues.write();
            let queue = queues.entry(order_type).or_default();
            let position = queue.iter().position(|t| t.id == ticket_id);
            position.map(|i| queue.remove(i))
        };
        let Some(ticket) = ticket else {
            return Err(AppError::not_found(format!("Ticket {ticket_id}")));
        };
        self.persist(order_type)?;
        Ok(ticket.items)
    }

    /// Hand a ticket's items and order type to the invoice finalization flow
    ///
    /// The ticket stays in its queue until the destination flow completes
    /// (it expires or is deleted there); the handoff itself is the
    /// scratchpad draft + active-order-type pair.
    pub fn stage_for_invoice(
        &self,
        order_type: OrderType,
        ticket_id: i64,
    ) -> AppResult<Vec<CartLine>> {
        let items = {
            let queues = self.queues.read();
            queues
                .get(&order_type)
                .and_then(|q| q.iter().find(|t| t.id == ticket_id))
                .map(|t| t.items.clone())
        };
        let Some(items) = items else {
            return Err(AppError::not_found(format!("Ticket {ticket_id}")));
        };

        self.scratchpad.set_json(keys::DRAFT_CART, &items)?;
        self.scratchpad
            .set(keys::ACTIVE_ORDER_TYPE, order_type.as_str())?;
        tracing::info!(order_type = %order_type, ticket_id, "Ticket staged for invoicing");
        Ok(items)
    }

    /// Evict every ticket whose age has reached `EXPIRY_MS`
    ///
    /// The boundary is inclusive: a ticket exactly at expiry is evicted.
    /// Eviction is pruning; an evicted ticket is unrecoverable. Returns the
    /// number of evicted tickets.
    pub fn expire(&self, now: i64) -> usize {
        let mut evicted = 0;
        for order_type in OrderType::ALL {
            let changed = {
                let mut queues = self.queues.write();
                let queue = queues.entry(order_type).or_default();
                let before = queue.len();
                queue.retain(|t| t.age_ms(now) < EXPIRY_MS);
                evicted += before - queue.len();
                queue.len() != before
            };
            if changed
                && let Err(e) = self.persist(order_type)
            {
                tracing::error!(order_type = %order_type, error = %e, "Failed to persist queue after expiry");
            }
        }
        if evicted > 0 {
            tracing::info!(evicted, "Expired kitchen tickets evicted");
        }
        evicted
    }

    /// Remaining lifetime of a ticket at `now`, clamped to zero
    pub fn remaining_ms(ticket: &KotTicket, now: i64) -> i64 {
        (EXPIRY_MS - ticket.age_ms(now)).max(0)
    }

    /// Persist one queue as a full scratchpad snapshot
    fn persist(&self, order_type: OrderType) -> AppResult<()> {
        let queue = self.tickets(order_type);
        self.scratchpad
            .set_json(&keys::ticket_queue(order_type), &queue)?;
        Ok(())
    }
}
