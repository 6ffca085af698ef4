//! Cart Aggregator - owns the in-progress draft order
//!
//! All mutations are synchronous: each one re-runs the promotion overlay,
//! stores the result as the new cart state, and persists the snapshot to
//! the scratchpad (cross-navigation handoff) and the durable store. The
//! cart invariant: no two lines ever share a `(name, price, size)` key.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use shared::models::{CartLine, Product, Variety, cart_total};
use shared::{AppError, AppResult};
use std::sync::Arc;

use crate::promo::PromoEngine;
use crate::scratchpad::{Scratchpad, keys};
use crate::storage::StationStorage;

/// One size picked in the variety popup, with its chosen quantity
#[derive(Debug, Clone)]
pub struct VarietySelection {
    pub variety: Variety,
    pub quantity: i32,
}

/// A size-picker selection parked in the scratchpad while the popup is
/// open, so navigating away and back does not lose it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarietyDraft {
    pub product_id: String,
    pub size: String,
    pub price: i64,
    pub quantity: i32,
}

/// Owner of the draft cart
pub struct CartService {
    lines: RwLock<Vec<CartLine>>,
    promo: Arc<PromoEngine>,
    storage: StationStorage,
    scratchpad: Arc<Scratchpad>,
}

impl CartService {
    /// Create the service, restoring any draft left in the scratchpad
    pub fn new(promo: Arc<PromoEngine>, storage: StationStorage, scratchpad: Arc<Scratchpad>) -> Self {
        let restored: Vec<CartLine> = scratchpad.get_json(keys::DRAFT_CART).unwrap_or_default();
        if !restored.is_empty() {
            tracing::debug!(lines = restored.len(), "Restored draft cart from scratchpad");
        }
        Self {
            lines: RwLock::new(restored),
            promo,
            storage,
            scratchpad,
        }
    }

    /// Value copy of the current cart
    pub fn snapshot(&self) -> Vec<CartLine> {
        self.lines.read().clone()
    }

    /// Current cart total in minor units (free lines contribute 0)
    pub fn total(&self) -> i64 {
        cart_total(&self.lines.read())
    }

    /// Add one unit of a single-SKU product
    ///
    /// Merges into an existing `(name, price, no-size)` line by
    /// incrementing its quantity, otherwise appends a new line with
    /// quantity 1.
    pub fn add_product(&self, product: &Product) -> AppResult<Vec<CartLine>> {
        let Some(price) = product.single_price() else {
            return Err(AppError::validation(format!(
                "{} requires a size selection",
                product.name
            )));
        };

        let mut lines = self.snapshot();
        match lines
            .iter_mut()
            .find(|l| !l.is_free && l.name == product.name && l.price == price && l.size.is_none())
        {
            Some(line) => line.quantity += 1,
            None => lines.push(CartLine::paid(product.name.clone(), None, price, 1)),
        }
        self.commit(lines)
    }

    /// Apply variety selections of a multi-SKU product
    ///
    /// Each selection upserts one `(name, price, size)` line with its
    /// quantity **set** (not incremented) to the selection's quantity.
    /// Selections below quantity 1 are dropped.
    pub fn add_selections(
        &self,
        product: &Product,
        selections: &[VarietySelection],
    ) -> AppResult<Vec<CartLine>> {
        if !product.is_multi_sku() {
            return Err(AppError::validation(format!(
                "{} has no size varieties",
                product.name
            )));
        }
        let selections: Vec<&VarietySelection> =
            selections.iter().filter(|s| s.quantity >= 1).collect();
        if selections.is_empty() {
            return Err(AppError::validation("No variety selected"));
        }

        let mut lines = self.snapshot();
        for selection in selections {
            let size = Some(selection.variety.size.clone());
            match lines.iter_mut().find(|l| {
                !l.is_free
                    && l.name == product.name
                    && l.price == selection.variety.price
                    && l.size == size
            }) {
                Some(line) => line.quantity = selection.quantity,
                None => lines.push(CartLine::paid(
                    product.name.clone(),
                    size,
                    selection.variety.price,
                    selection.quantity,
                )),
            }
        }
        self.commit(lines)
    }

    /// Apply a quantity delta to the paid line(s) matching `(name, price)`
    ///
    /// A resulting quantity below 1 removes the line entirely. Free lines
    /// never match (their quantity is derived). An unknown key is a warned
    /// no-op.
    pub fn change_quantity(&self, name: &str, price: i64, delta: i32) -> AppResult<Vec<CartLine>> {
        let mut matched = false;
        let lines: Vec<CartLine> = self
            .snapshot()
            .into_iter()
            .filter_map(|mut line| {
                if !line.is_free && line.name == name && line.price == price {
                    matched = true;
                    let quantity = line.quantity + delta;
                    if quantity < 1 {
                        return None;
                    }
                    line.quantity = quantity;
                }
                Some(line)
            })
            .collect();

        if !matched {
            let ignored = AppError::inconsistent_key(format!("{name} @{price}"));
            tracing::warn!(error = %ignored, "Quantity change ignored");
            return Ok(self.snapshot());
        }
        self.commit(lines)
    }

    /// Remove every line with the `(name, price)` key
    ///
    /// Used when the product is deleted from the catalog; derived free
    /// lines disappear on the overlay re-run.
    pub fn purge_key(&self, name: &str, price: i64) -> AppResult<Vec<CartLine>> {
        let lines: Vec<CartLine> = self
            .snapshot()
            .into_iter()
            .filter(|l| !(l.name == name && l.price == price && !l.is_free))
            .collect();
        self.commit(lines)
    }

    /// Replace the whole draft (ticket edit-to-draft)
    pub fn replace_lines(&self, lines: Vec<CartLine>) -> AppResult<Vec<CartLine>> {
        self.commit(lines)
    }

    /// Re-run the promotion overlay on the current cart
    pub fn reapply_promotion(&self) -> AppResult<Vec<CartLine>> {
        self.commit(self.snapshot())
    }

    // ========== Variety draft (size-picker handoff) ==========

    /// Selections parked for one product's size picker
    pub fn variety_draft(&self, product_id: &str) -> Vec<VarietyDraft> {
        let drafts: Vec<VarietyDraft> = self
            .scratchpad
            .get_json(keys::VARIETY_DRAFT)
            .unwrap_or_default();
        drafts
            .into_iter()
            .filter(|d| d.product_id == product_id)
            .collect()
    }

    /// Park the size-picker selections (drops sub-1 quantities)
    pub fn set_variety_draft(&self, drafts: &[VarietyDraft]) -> AppResult<()> {
        let kept: Vec<&VarietyDraft> = drafts.iter().filter(|d| d.quantity >= 1).collect();
        self.scratchpad.set_json(keys::VARIETY_DRAFT, &kept)?;
        Ok(())
    }

    /// Discard every parked selection (fresh-load teardown)
    pub fn clear_variety_draft(&self) -> AppResult<()> {
        self.scratchpad.remove(keys::VARIETY_DRAFT)?;
        Ok(())
    }

    /// Empty the cart and its persisted snapshots
    pub fn clear(&self) -> AppResult<()> {
        *self.lines.write() = Vec::new();
        self.scratchpad.remove(keys::DRAFT_CART)?;
        self.storage.save_cart(&[])?;
        Ok(())
    }

    /// Run the overlay, store the new state and persist both snapshots
    fn commit(&self, lines: Vec<CartLine>) -> AppResult<Vec<CartLine>> {
        let lines = self.promo.apply(lines);
        *self.lines.write() = lines.clone();
        self.scratchpad.set_json(keys::DRAFT_CART, &lines)?;
        self.storage.save_cart(&lines)?;
        Ok(lines)
    }
}
