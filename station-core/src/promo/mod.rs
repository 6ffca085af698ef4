//! Buy-one-get-one promotion engine
//!
//! The promotion is a derived overlay on the cart: free lines are never
//! user-edited, they are recomputed from the paid lines on every pass.
//! Activation is gated on the designated weekday, re-evaluated on load and
//! by an hourly watcher; staff can toggle the promotion off (and back on)
//! while the day gate holds, never on outside it.

use chrono::{Datelike, Weekday};
use parking_lot::RwLock;
use shared::models::{CartLine, LineKey};
use shared::{AppError, AppResult};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::cart::CartService;

/// The weekday the promotion is active
const PROMO_DAY: Weekday = Weekday::Thu;

/// Eligible product names and their eligible size tokens (lowercase).
///
/// A no-variety product matches on name alone; a sized line must also match
/// one of the listed tokens.
const ELIGIBLE_PRODUCTS: &[(&str, &[&str])] = &[
    ("Italian sweet", &["med", "large"]),
    ("Heat 'n' sweet", &["med", "large"]),
    ("Hot stuff", &["med", "large"]),
    ("Garlic to hot", &["med", "large"]),
    ("Four season", &["med", "large"]),
    ("Super spicy", &["med", "large"]),
    ("Love in box (heart shape)", &["med", "large"]),
    ("Cheese pizza", &["med", "large"]),
    ("Chicago's spl. paneer", &["med", "large"]),
    ("Peri peri boom", &["med", "large"]),
    ("Mughlai retreat", &["med", "large"]),
    ("Karahi paneer pizza", &["med", "large"]),
    ("Makhni supreme", &["med", "large"]),
    ("7 veggies", &["med", "large"]),
    ("Mexicana overload", &["med", "large"]),
    ("Tandoori paneer", &["med", "large"]),
    ("Cheese pasta pizza", &["med", "large"]),
    ("Spicy pasta pizza", &["med", "large"]),
    ("Chicago's flood", &["med", "large"]),
    ("Bursty cheese pizza", &["med"]),
];

#[derive(Debug, Default)]
struct PromoState {
    /// Whether today is the designated promotion day
    day_eligible: bool,
    /// Whether the overlay is currently applied
    enabled: bool,
}

/// Day-gated BOGO promotion engine
pub struct PromoEngine {
    state: RwLock<PromoState>,
}

impl PromoEngine {
    /// Create the engine, evaluating the day gate immediately
    pub fn new() -> Self {
        let engine = Self {
            state: RwLock::new(PromoState::default()),
        };
        engine.update_day(chrono::Local::now().weekday());
        engine
    }

    /// Whether today is the designated promotion day
    pub fn is_promo_day(&self) -> bool {
        self.state.read().day_eligible
    }

    /// Whether the overlay is currently applied
    pub fn is_active(&self) -> bool {
        self.state.read().enabled
    }

    /// Re-evaluate the day gate against a weekday
    ///
    /// Forces the promotion on for the designated day and off otherwise
    /// (a manual toggle-off therefore lasts until the next evaluation).
    /// Returns `true` when the active state changed.
    pub fn update_day(&self, weekday: Weekday) -> bool {
        let mut state = self.state.write();
        let was_active = state.enabled;
        state.day_eligible = weekday == PROMO_DAY;
        state.enabled = state.day_eligible;
        was_active != state.enabled
    }

    /// Manually toggle the promotion
    ///
    /// Toggling on outside the designated day is rejected and leaves state
    /// unchanged. Returns `true` when the active state changed.
    pub fn set_enabled(&self, on: bool) -> AppResult<bool> {
        let mut state = self.state.write();
        if on && !state.day_eligible {
            return Err(AppError::invalid_eligibility(
                "Buy-one-get-one is only available on Thursdays",
            ));
        }
        let changed = state.enabled != on;
        state.enabled = on;
        Ok(changed)
    }

    /// Eligible size tokens for a product name
    fn eligible_sizes(name: &str) -> Option<&'static [&'static str]> {
        ELIGIBLE_PRODUCTS
            .iter()
            .find(|(eligible, _)| *eligible == name)
            .map(|(_, sizes)| *sizes)
    }

    /// Whether a paid line earns a free counterpart
    fn line_is_eligible(line: &CartLine) -> bool {
        let Some(sizes) = Self::eligible_sizes(&line.name) else {
            return false;
        };
        match &line.size {
            // No size constraint on the line: name match is enough
            None => true,
            Some(size) => sizes.contains(&size.to_lowercase().as_str()),
        }
    }

    /// Apply the overlay to a cart, returning the derived cart
    ///
    /// Idempotent: paid lines pass through untouched; for each eligible
    /// paid line exactly one free line exists afterwards (quantity mirrors
    /// the paid line on the sized path, fixed at 1 otherwise); free lines
    /// whose trigger no longer qualifies are removed. When the promotion is
    /// inactive every free line is stripped.
    pub fn apply(&self, lines: Vec<CartLine>) -> Vec<CartLine> {
        if !self.is_active() {
            return lines.into_iter().filter(|l| !l.is_free).collect();
        }

        // Desired free quantity per triggering paid key
        let mut desired: HashMap<LineKey, i32> = HashMap::new();
        for line in lines.iter().filter(|l| !l.is_free) {
            if Self::line_is_eligible(line) {
                let quantity = if line.size.is_some() { line.quantity } else { 1 };
                desired.insert(line.key(), quantity);
            }
        }

        let mut satisfied: HashSet<LineKey> = HashSet::new();
        let mut out: Vec<CartLine> = Vec::with_capacity(lines.len());

        // Keep paid lines as-is; reconcile existing free lines in place
        for line in &lines {
            if !line.is_free {
                out.push(line.clone());
                continue;
            }
            let Some(trigger) = line.derived_from.as_ref() else {
                continue; // untagged free line: drop, it will be re-derived
            };
            if let Some(&quantity) = desired.get(trigger)
                && !satisfied.contains(trigger)
            {
                let mut kept = line.clone();
                kept.price = 0;
                kept.quantity = quantity;
                kept.original_price = Some(trigger.price);
                satisfied.insert(trigger.clone());
                out.push(kept);
            }
            // Trigger gone or duplicate: the free line is dropped
        }

        // Inject missing free lines, in paid-line order
        let paid: Vec<CartLine> = lines.iter().filter(|l| !l.is_free).cloned().collect();
        for line in &paid {
            let key = line.key();
            if let Some(&quantity) = desired.get(&key)
                && !satisfied.contains(&key)
            {
                satisfied.insert(key);
                out.push(CartLine::free_for(line, quantity));
            }
        }

        out
    }
}

impl Default for PromoEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Periodic day-gate watcher
///
/// Re-evaluates the weekday on a fixed interval; when the active state
/// flips, the overlay is re-applied to the live cart so stale free lines
/// never linger until the next mutation.
pub async fn run_day_watcher(
    promo: Arc<PromoEngine>,
    cart: Arc<CartService>,
    interval: Duration,
    cancel: CancellationToken,
) {
    let mut tick = tokio::time::interval(interval);
    // The immediate first tick: the gate was already evaluated on load
    tick.tick().await;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::debug!("Promotion day watcher stopped");
                break;
            }
            _ = tick.tick() => {
                let changed = promo.update_day(chrono::Local::now().weekday());
                if changed {
                    tracing::info!(active = promo.is_active(), "Promotion day gate flipped");
                    if let Err(e) = cart.reapply_promotion() {
                        tracing::error!(error = %e, "Failed to re-apply promotion overlay");
                    }
                }
            }
        }
    }
}
