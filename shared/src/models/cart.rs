//! Cart line model
//!
//! A cart is an ordered list of `CartLine`s. Two lines with the same
//! `(name, price, size)` key are always merged by summing quantity; a free
//! promotional line is a distinct entity from its paid counterpart and
//! carries a `derived_from` back-reference to the paid line that earned it.

use serde::{Deserialize, Serialize};

/// Deduplication/merge identity of a cart line
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineKey {
    pub name: String,
    pub price: i64,
    #[serde(default)]
    pub size: Option<String>,
}

impl std::fmt::Display for LineKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.size {
            Some(size) => write!(f, "{} ({}) @{}", self.name, size, self.price),
            None => write!(f, "{} @{}", self.name, self.price),
        }
    }
}

/// One line of the draft cart (or of a printed ticket snapshot)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    /// Unit price in minor currency units (0 for free lines)
    pub price: i64,
    pub quantity: i32,
    #[serde(default)]
    pub is_free: bool,
    /// The foregone unit price of a free line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_price: Option<i64>,
    /// Key of the paid line that triggered this free line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub derived_from: Option<LineKey>,
}

impl CartLine {
    /// Create a paid line
    pub fn paid(name: impl Into<String>, size: Option<String>, price: i64, quantity: i32) -> Self {
        Self {
            name: name.into(),
            size,
            price,
            quantity,
            is_free: false,
            original_price: None,
            derived_from: None,
        }
    }

    /// Create the free counterpart of a paid line
    pub fn free_for(paid: &CartLine, quantity: i32) -> Self {
        Self {
            name: paid.name.clone(),
            size: paid.size.clone(),
            price: 0,
            quantity,
            is_free: true,
            original_price: Some(paid.price),
            derived_from: Some(paid.key()),
        }
    }

    /// Merge identity of this line
    pub fn key(&self) -> LineKey {
        LineKey {
            name: self.name.clone(),
            price: self.price,
            size: self.size.clone(),
        }
    }

    /// Line total in minor units (free lines contribute 0)
    pub fn line_total(&self) -> i64 {
        self.price * self.quantity as i64
    }
}

/// Sum of `price × quantity` over all lines
pub fn cart_total(lines: &[CartLine]) -> i64 {
    lines.iter().map(CartLine::line_total).sum()
}
