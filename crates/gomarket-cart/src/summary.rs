//! # Floating Cart Summary
//!
//! The compact widget pinned to the bottom of the product list: item count,
//! formatted total, and a tap target that opens the cart screen.
//!
//! ## Memoization
//! ```text
//!   read ──► cached.version == store.version()? ──yes──► cached totals
//!                        │
//!                        no
//!                        ▼
//!            recompute under one cart lock ──► cache (version, totals)
//! ```
//! Totals are computed lazily on the first read after a change, never on the
//! change itself. [`CartSummary::recompute_count`] tells how often that
//! happened.

use gomarket_core::{CartTotals, CurrencyFormat, Money};
use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tracing::debug;
use ts_rs::TS;

use crate::error::CartResult;
use crate::navigation::{Navigator, CART_DESTINATION};
use crate::scope::CartScope;
use crate::store::CartHandle;

/// What the widget renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct SummaryDisplay {
    /// e.g. `"5 itens"`
    pub item_count_label: String,
    /// e.g. `"R$ 35,00"`
    pub total_price: String,
}

impl fmt::Display for SummaryDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}  {}", self.item_count_label, self.total_price)
    }
}

/// Derived view over a [`CartStore`](crate::store::CartStore).
pub struct CartSummary {
    cart: CartHandle,
    navigator: Arc<dyn Navigator>,
    format: CurrencyFormat,
    cache: Mutex<Option<(u64, CartTotals)>>,
    recomputes: AtomicUsize,
}

impl CartSummary {
    pub fn new(cart: CartHandle, navigator: Arc<dyn Navigator>, format: CurrencyFormat) -> Self {
        CartSummary {
            cart,
            navigator,
            format,
            cache: Mutex::new(None),
            recomputes: AtomicUsize::new(0),
        }
    }

    /// Builds a summary over the cart `scope` provides.
    ///
    /// ## Errors
    /// [`CartError::OutsideProvider`](crate::CartError::OutsideProvider) if the
    /// scope has no cart.
    pub fn from_scope(
        scope: &CartScope,
        navigator: Arc<dyn Navigator>,
        format: CurrencyFormat,
    ) -> CartResult<Self> {
        Ok(Self::new(scope.cart()?, navigator, format))
    }

    /// Sum of unit price × quantity, formatted.
    pub fn total_price(&self) -> String {
        self.format.format(self.totals().total_price)
    }

    /// Sum of unit price × quantity.
    pub fn total_price_amount(&self) -> Money {
        self.totals().total_price
    }

    /// Sum of quantities across all lines.
    pub fn total_item_count(&self) -> i64 {
        self.totals().total_quantity
    }

    pub fn display(&self) -> SummaryDisplay {
        let totals = self.totals();
        SummaryDisplay {
            item_count_label: format!("{} itens", totals.total_quantity),
            total_price: self.format.format(totals.total_price),
        }
    }

    /// How many times the totals were actually computed.
    pub fn recompute_count(&self) -> usize {
        self.recomputes.load(Ordering::SeqCst)
    }

    /// Sends the host app to the cart screen.
    pub fn open_cart(&self) {
        self.navigator.navigate(CART_DESTINATION);
    }

    pub fn cart(&self) -> &CartHandle {
        &self.cart
    }

    fn totals(&self) -> CartTotals {
        let mut cache = self
            .cache
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let current = self.cart.version();
        if let Some((version, totals)) = *cache {
            if version == current {
                return totals;
            }
        }

        let (version, totals) = self
            .cart
            .with_cart(|cart, version| (version, CartTotals::from(cart)));
        self.recomputes.fetch_add(1, Ordering::SeqCst);
        debug!(
            version,
            items = totals.total_quantity,
            "Cart summary recomputed"
        );

        *cache = Some((version, totals));
        totals
    }
}

impl fmt::Debug for CartSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CartSummary")
            .field("cart", &self.cart)
            .field("format", &self.format)
            .field("recomputes", &self.recompute_count())
            .finish()
    }
}
