//! Kitchen Order Ticket model

use super::cart::CartLine;
use crate::util;
use serde::{Deserialize, Serialize};

/// Order type — each type owns an independent ticket queue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderType {
    Delivery,
    DineIn,
    Takeaway,
}

impl OrderType {
    pub const ALL: [OrderType; 3] = [OrderType::Delivery, OrderType::DineIn, OrderType::Takeaway];

    /// Stable token used for scratchpad queue keys
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderType::Delivery => "delivery",
            OrderType::DineIn => "dine-in",
            OrderType::Takeaway => "takeaway",
        }
    }

    /// Human-readable label for ticket headers
    pub fn label(&self) -> &'static str {
        match self {
            OrderType::Delivery => "Delivery",
            OrderType::DineIn => "Dine-In",
            OrderType::Takeaway => "Takeaway",
        }
    }
}

impl std::fmt::Display for OrderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Kitchen Order Ticket — an immutable snapshot of the cart at print time
///
/// Tickets carry a stable id assigned at creation; queue operations address
/// tickets by id, never by queue position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KotTicket {
    pub id: i64,
    /// Creation time, Unix millis
    pub timestamp: i64,
    /// Human-readable creation time snapshot
    pub date: String,
    pub items: Vec<CartLine>,
    pub order_type: OrderType,
}

impl KotTicket {
    /// Snapshot a cart into a new pending ticket
    pub fn new(items: Vec<CartLine>, order_type: OrderType) -> Self {
        let now = util::now_millis();
        Self {
            id: util::snowflake_id(),
            timestamp: now,
            date: chrono::Local::now().format("%d/%m/%Y, %H:%M:%S").to_string(),
            items,
            order_type,
        }
    }

    /// Age of this ticket at `now` (millis)
    pub fn age_ms(&self, now: i64) -> i64 {
        now - self.timestamp
    }
}
