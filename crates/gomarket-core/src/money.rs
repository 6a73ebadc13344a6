//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely, and the
//! currency formatting the floating cart displays.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  A cart total summed in floats drifts by fractions of a cent.           │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    Prices live as cents in memory. The device storage format keeps     │
//! │    decimal numbers (what the storefront always wrote), so conversion    │
//! │    happens exactly once, at the storage boundary: see [`major_units`]. │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use gomarket_core::money::{CurrencyFormat, Money};
//!
//! let price = Money::from_cents(1099); // 10.99
//! let line_total = price.multiply_quantity(3);
//!
//! assert_eq!(line_total.cents(), 3297);
//! assert_eq!(CurrencyFormat::usd().format(line_total), "$32.97");
//! assert_eq!(CurrencyFormat::brl().format(line_total), "R$ 32,97");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::Add;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: Arithmetic on differences stays representable
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Saturating arithmetic**: amounts come from device storage, so a huge
///   price × quantity pins at the i64 bounds instead of overflowing
/// - **Currency-agnostic**: the cart holds one currency; formatting decides
///   how it is shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use gomarket_core::money::Money;
    ///
    /// let price = Money::from_cents(1099);
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Converts a decimal amount in major units (e.g. `10.99`) to cents,
    /// rounding half away from zero.
    ///
    /// Only the storage boundary should call this: the persisted cart format
    /// stores prices as JSON numbers.
    ///
    /// ## Example
    /// ```rust
    /// use gomarket_core::money::Money;
    ///
    /// assert_eq!(Money::from_major_units(10.99).unwrap().cents(), 1099);
    /// assert!(Money::from_major_units(f64::NAN).is_err());
    /// ```
    pub fn from_major_units(amount: f64) -> CoreResult<Self> {
        if !amount.is_finite() {
            return Err(CoreError::InvalidAmount {
                reason: format!("{} is not a finite number", amount),
            });
        }

        let scaled = (amount * 100.0).round();
        if scaled < i64::MIN as f64 || scaled > i64::MAX as f64 {
            return Err(CoreError::InvalidAmount {
                reason: format!("{} is out of range", amount),
            });
        }

        Ok(Money(scaled as i64))
    }

    /// Returns the amount as a decimal number of major units.
    ///
    /// Storage boundary only, see [`Money::from_major_units`].
    #[inline]
    pub fn to_major_units(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies money by a quantity, saturating at the i64 bounds.
    ///
    /// ## Example
    /// ```rust
    /// use gomarket_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(299);
    /// assert_eq!(unit_price.multiply_quantity(3).cents(), 897);
    /// assert_eq!(Money::from_cents(i64::MAX / 2).multiply_quantity(3).cents(), i64::MAX);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a human-readable format.
///
/// ## Note
/// This is for debugging and logs. Use [`CurrencyFormat`] for anything the
/// shopper sees.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}${}.{:02}", sign, abs / 100, abs % 100)
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

/// Saturating addition (cart totals).
impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// Storage Boundary
// =============================================================================

/// Serde adapter that stores [`Money`] as a decimal JSON number of major units.
///
/// ## Usage
/// ```rust,ignore
/// #[serde(rename = "price", with = "crate::money::major_units")]
/// pub unit_price: Money,
/// ```
pub mod major_units {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::Money;

    pub fn serialize<S>(money: &Money, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_f64(money.to_major_units())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Money, D::Error>
    where
        D: Deserializer<'de>,
    {
        let amount = f64::deserialize(deserializer)?;
        Money::from_major_units(amount).map_err(D::Error::custom)
    }
}

// =============================================================================
// Currency Formatting
// =============================================================================

/// Display locale for cart amounts.
///
/// The cart itself is single-currency; the locale only controls how the
/// amount is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurrencyLocale {
    /// Brazilian real, `R$ 1.234,56`.
    #[default]
    Brl,

    /// US dollar, `$1,234.56`.
    Usd,
}

impl fmt::Display for CurrencyLocale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CurrencyLocale::Brl => write!(f, "brl"),
            CurrencyLocale::Usd => write!(f, "usd"),
        }
    }
}

impl FromStr for CurrencyLocale {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "brl" | "pt-br" | "pt_br" => Ok(CurrencyLocale::Brl),
            "usd" | "en-us" | "en_us" => Ok(CurrencyLocale::Usd),
            _ => Err(ValidationError::NotAllowed {
                field: "currency".to_string(),
                allowed: vec!["brl".to_string(), "usd".to_string()],
            }),
        }
    }
}

/// Renders a [`Money`] amount as a localized currency string.
///
/// ## Layout
/// ```text
///   -R$ 1.234,56
///   │ │ │ │   │
///   │ │ │ │   └── minor units, always two digits
///   │ │ │ └────── decimal separator
///   │ │ └──────── thousands separator every three digits
///   │ └────────── symbol (+ optional space)
///   └──────────── sign for negative amounts
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrencyFormat {
    pub symbol: String,
    pub decimal_separator: char,
    pub thousands_separator: char,
    /// Whether a space separates the symbol from the digits.
    pub symbol_spacing: bool,
}

impl CurrencyFormat {
    /// Brazilian real formatting (`R$ 1.234,56`).
    pub fn brl() -> Self {
        CurrencyFormat {
            symbol: "R$".to_string(),
            decimal_separator: ',',
            thousands_separator: '.',
            symbol_spacing: true,
        }
    }

    /// US dollar formatting (`$1,234.56`).
    pub fn usd() -> Self {
        CurrencyFormat {
            symbol: "$".to_string(),
            decimal_separator: '.',
            thousands_separator: ',',
            symbol_spacing: false,
        }
    }

    /// Formats an amount.
    ///
    /// ## Example
    /// ```rust
    /// use gomarket_core::money::{CurrencyFormat, Money};
    ///
    /// let format = CurrencyFormat::brl();
    /// assert_eq!(format.format(Money::from_cents(123456)), "R$ 1.234,56");
    /// assert_eq!(format.format(Money::zero()), "R$ 0,00");
    /// ```
    pub fn format(&self, amount: Money) -> String {
        let cents = amount.cents();
        let sign = if cents < 0 { "-" } else { "" };
        let abs = cents.unsigned_abs();
        let major = group_thousands(abs / 100, self.thousands_separator);
        let space = if self.symbol_spacing { " " } else { "" };

        format!(
            "{}{}{}{}{}{:02}",
            sign,
            self.symbol,
            space,
            major,
            self.decimal_separator,
            abs % 100
        )
    }
}

impl Default for CurrencyFormat {
    fn default() -> Self {
        CurrencyFormat::brl()
    }
}

impl From<CurrencyLocale> for CurrencyFormat {
    fn from(locale: CurrencyLocale) -> Self {
        match locale {
            CurrencyLocale::Brl => CurrencyFormat::brl(),
            CurrencyLocale::Usd => CurrencyFormat::usd(),
        }
    }
}

/// Formats an amount with the storefront's default currency format.
///
/// ## Example
/// ```rust
/// use gomarket_core::money::{format_value, Money};
///
/// assert_eq!(format_value(Money::from_cents(3500)), "R$ 35,00");
/// ```
pub fn format_value(amount: Money) -> String {
    CurrencyFormat::default().format(amount)
}

fn group_thousands(value: u64, separator: char) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, digit) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(separator);
        }
        grouped.push(digit);
    }

    grouped
}

// =============================================================================
// Unit Tests
// =============================================================================
