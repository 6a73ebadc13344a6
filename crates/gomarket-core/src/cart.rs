//! # Cart
//!
//! The ordered, id-unique list of line items and the aggregates the floating
//! cart shows.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Operations                                      │
//! │                                                                         │
//! │  Storefront Action        Cart Method             Cart Change           │
//! │  ─────────────────        ───────────             ───────────           │
//! │                                                                         │
//! │  Tap "add" ──────────────► add_item() ──────────► upsert by id          │
//! │                                                                         │
//! │  Tap "+" ────────────────► increment() ─────────► items[i].qty += 1    │
//! │                                                                         │
//! │  Tap "-" ────────────────► decrement() ─────────► items[i].qty -= 1    │
//! │                                                  (stops at zero)        │
//! │                                                                         │
//! │  Swipe away ─────────────► remove_item() ───────► items.remove(i)      │
//! │                                                                         │
//! │  Checkout done ──────────► clear() ─────────────► items.clear()        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every mutating method reports whether it changed anything, so callers can
//! skip persisting no-ops.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CoreResult;
use crate::money::Money;
use crate::types::{LineItem, NewLineItem};
use crate::validation::validate_new_item;

/// The shopping cart.
///
/// ## Invariants
/// - Items are unique by `id` (adding the same product increases quantity)
/// - Insertion order is preserved
/// - Quantity is never negative; decrementing stops at zero and keeps the
///   line so the shopper can bump it back up
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<LineItem>,
}

/// What [`Cart::normalized`] had to fix in loaded data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Normalization {
    /// Duplicate ids folded into their first occurrence.
    pub merged_duplicates: usize,

    /// Negative quantities raised to zero.
    pub clamped_quantities: usize,
}

impl Normalization {
    /// True when the input already satisfied every invariant.
    pub fn is_clean(&self) -> bool {
        self.merged_duplicates == 0 && self.clamped_quantities == 0
    }
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart { items: Vec::new() }
    }

    /// Builds a cart from untrusted items (e.g. device storage), restoring the
    /// invariants.
    ///
    /// ## Rules
    /// - Negative quantities become zero
    /// - Duplicate ids fold into the first occurrence: quantities add up and
    ///   the later descriptive fields win, same as repeated adds
    pub fn normalized(items: Vec<LineItem>) -> (Self, Normalization) {
        let mut report = Normalization::default();
        let mut cart = Cart::new();

        for mut item in items {
            if item.quantity < 0 {
                item.quantity = 0;
                report.clamped_quantities += 1;
            }

            match cart.items.iter_mut().find(|i| i.id == item.id) {
                Some(existing) => {
                    existing.quantity = existing.quantity.saturating_add(item.quantity);
                    existing.title = item.title;
                    existing.image_url = item.image_url;
                    existing.unit_price = item.unit_price;
                    report.merged_duplicates += 1;
                }
                None => cart.items.push(item),
            }
        }

        (cart, report)
    }

    /// Adds a product, or bumps its quantity if it is already in the cart.
    ///
    /// ## Behavior
    /// - Product already in cart: quantity + 1, title/image/price replaced by
    ///   the incoming values
    /// - Product not in cart: appended with quantity 1
    ///
    /// ## Returns
    /// The line's new quantity, or a validation error (cart unchanged).
    pub fn add_item(&mut self, item: NewLineItem) -> CoreResult<i64> {
        validate_new_item(&item)?;

        if let Some(existing) = self.items.iter_mut().find(|i| i.id == item.id) {
            existing.quantity = existing.quantity.saturating_add(1);
            existing.refresh_from(item);
            return Ok(existing.quantity);
        }

        self.items.push(LineItem::from_new(item));
        Ok(1)
    }

    /// Increases a line's quantity by one. Returns `false` if `id` is not in
    /// the cart.
    pub fn increment(&mut self, id: &str) -> bool {
        match self.items.iter_mut().find(|i| i.id == id) {
            Some(item) => {
                item.quantity = item.quantity.saturating_add(1);
                true
            }
            None => false,
        }
    }

    /// Decreases a line's quantity by one, stopping at zero.
    ///
    /// Returns `false` if `id` is not in the cart or already at zero.
    pub fn decrement(&mut self, id: &str) -> bool {
        match self.items.iter_mut().find(|i| i.id == id) {
            Some(item) if item.quantity > 0 => {
                item.quantity -= 1;
                true
            }
            _ => false,
        }
    }

    /// Removes a line from the cart by product id.
    pub fn remove_item(&mut self, id: &str) -> bool {
        let initial_len = self.items.len();
        self.items.retain(|i| i.id != id);
        self.items.len() != initial_len
    }

    /// Clears all items from the cart. Returns `false` if it was already empty.
    pub fn clear(&mut self) -> bool {
        if self.items.is_empty() {
            return false;
        }
        self.items.clear();
        true
    }

    /// Looks up a line by product id.
    pub fn get(&self, id: &str) -> Option<&LineItem> {
        self.items.iter().find(|i| i.id == id)
    }

    /// The lines, in insertion order.
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Consumes the cart, returning its lines.
    pub fn into_items(self) -> Vec<LineItem> {
        self.items
    }

    /// Returns the number of distinct lines in the cart.
    pub fn line_count(&self) -> usize {
        self.items.len()
    }

    /// Returns the total quantity of all items.
    pub fn total_quantity(&self) -> i64 {
        self.items
            .iter()
            .fold(0i64, |total, i| total.saturating_add(i.quantity))
    }

    /// Returns Σ unit price × quantity.
    pub fn total_price(&self) -> Money {
        self.items.iter().map(LineItem::line_total).sum()
    }

    /// Checks if the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Cart totals summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartTotals {
    pub line_count: usize,
    pub total_quantity: i64,
    pub total_price: Money,
}

impl From<&Cart> for CartTotals {
    fn from(cart: &Cart) -> Self {
        CartTotals {
            line_count: cart.line_count(),
            total_quantity: cart.total_quantity(),
            total_price: cart.total_price(),
        }
    }
}
