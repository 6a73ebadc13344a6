//! # Cart Scope
//!
//! Explicit hand-off of the cart handle to consumers that are wired up at
//! runtime. A scope either provides a cart or it doesn't; asking an empty
//! scope is an error the caller sees, not a panic.
//!
//! ```rust
//! use gomarket_cart::{CartError, CartScope};
//!
//! let scope = CartScope::new();
//! assert!(matches!(scope.cart(), Err(CartError::OutsideProvider)));
//! ```

use crate::error::{CartError, CartResult};
use crate::store::CartHandle;

/// Provides a [`CartHandle`] to whatever is built inside it.
#[derive(Debug, Clone, Default)]
pub struct CartScope {
    cart: Option<CartHandle>,
}

impl CartScope {
    /// A scope with no cart.
    pub fn new() -> Self {
        Self::default()
    }

    /// A scope providing `cart`.
    pub fn with_cart(cart: CartHandle) -> Self {
        CartScope { cart: Some(cart) }
    }

    /// Provides `cart`, replacing any cart already provided.
    pub fn provide(&mut self, cart: CartHandle) {
        self.cart = Some(cart);
    }

    /// True if a cart is provided.
    pub fn is_provided(&self) -> bool {
        self.cart.is_some()
    }

    /// The provided cart.
    ///
    /// ## Errors
    /// [`CartError::OutsideProvider`] when nothing was provided.
    pub fn cart(&self) -> CartResult<CartHandle> {
        self.cart.clone().ok_or(CartError::OutsideProvider)
    }
}
