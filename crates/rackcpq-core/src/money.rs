//! # Money Module
//!
//! Integer-cent money and basis-point percentages for quoting.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  COMPOUNDING DISCOUNTS                                                  │
//! │                                                                         │
//! │  Strategies run in sequence and each one computes its percentage        │
//! │  against the running discounted total:                                  │
//! │                                                                         │
//! │    $10,000.00 ── bundle 5%  ──► -$500.00                                │
//! │     $9,500.00 ── partner 15% ─► -$1,425.00                              │
//! │                                                                         │
//! │  Every discount amount is rounded to whole cents at the moment it is    │
//! │  computed, so no fractional cents leak from one strategy into the       │
//! │  next. Floats would drift; i64 cents cannot.                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use rackcpq_core::money::{Money, Percentage};
//!
//! let subtotal = Money::from_cents(1_000_000); // $10,000.00
//! let bundle = subtotal.percent_of(Percentage::from_whole(5));
//! assert_eq!(bundle.cents(), 50_000);
//!
//! let running = subtotal - bundle;
//! let partner = running.percent_of(Percentage::from_whole(15));
//! assert_eq!(partner.cents(), 142_500);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

// =============================================================================
// Percentage
// =============================================================================

/// A percentage stored in basis points (1% = 100 bps).
///
/// Discount and add-on rates are configured as whole percents but kept in
/// basis points so fractional rates stay exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Percentage(u32);

impl Percentage {
    /// Creates a percentage from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        Percentage(bps)
    }

    /// Creates a percentage from a whole percent value (`10` = 10%).
    #[inline]
    pub const fn from_whole(percent: u32) -> Self {
        Percentage(percent * 100)
    }

    /// Returns the value in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the whole-percent part, truncated.
    #[inline]
    pub const fn whole(&self) -> u32 {
        self.0 / 100
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

/// Renders `10%` for whole values and `12.50%` otherwise.
impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 % 100 == 0 {
            write!(f, "{}%", self.whole())
        } else {
            write!(f, "{}.{:02}%", self.whole(), self.0 % 100)
        }
    }
}

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in cents.
///
/// ## Design Decisions
/// - **i64 (signed)**: Discounts are subtracted, never stored negative, but
///   intermediate differences may dip below zero
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Serialized as cents**: `{"subtotal": 1000000}` means $10,000.00
///
/// ## Where Money Flows
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Product.base_price ──► PricingLineItem.unit_price ──► line_total       │
/// │                                                                         │
/// │  PricingResult.subtotal ──► discounts ──► add-on ──► grand_total        │
/// │                                                                         │
/// │  Quote freezes every amount above at creation time                      │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    ///
    /// ## Example
    /// ```rust
    /// use rackcpq_core::money::Money;
    ///
    /// let price = Money::from_cents(249_999); // $2,499.99
    /// assert_eq!(price.cents(), 249_999);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from dollars and cents.
    ///
    /// For negative amounts only the major unit carries the sign:
    /// `from_major_minor(-5, 50)` is -$5.50.
    ///
    /// ## Example
    /// ```rust
    /// use rackcpq_core::money::Money;
    ///
    /// assert_eq!(Money::from_major_minor(4599, 99).cents(), 459_999);
    /// assert_eq!(Money::from_major_minor(-5, 50).cents(), -550);
    /// ```
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the dollars portion, truncated toward zero.
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the cents portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies a unit price by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use rackcpq_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(459_999); // $4,599.99
    /// assert_eq!(unit_price.multiply_quantity(6).cents(), 2_759_994);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Computes `self × pct`, rounded half-up to whole cents.
    ///
    /// ## Rounding
    /// ```text
    /// ┌─────────────────────────────────────────────────────────────────────┐
    /// │  HALF-UP (away from zero) at 2 decimal places                       │
    /// │                                                                     │
    /// │    $0.05 × 10%  = $0.005  → $0.01                                   │
    /// │    $0.04 × 10%  = $0.004  → $0.00                                   │
    /// │   -$0.05 × 10%  = -$0.005 → -$0.01                                  │
    /// │                                                                     │
    /// │  Integer math: (cents × bps ± 5000) / 10000                         │
    /// │  i128 intermediate so large totals cannot overflow                  │
    /// └─────────────────────────────────────────────────────────────────────┘
    /// ```
    ///
    /// ## Example
    /// ```rust
    /// use rackcpq_core::money::{Money, Percentage};
    ///
    /// let hardware = Money::from_cents(800_000); // $8,000.00
    /// let support = hardware.percent_of(Percentage::from_whole(15));
    /// assert_eq!(support.cents(), 120_000);      // $1,200.00
    ///
    /// assert_eq!(Money::from_cents(5).percent_of(Percentage::from_whole(10)).cents(), 1);
    /// ```
    pub fn percent_of(&self, pct: Percentage) -> Money {
        let scaled = self.0 as i128 * pct.bps() as i128;
        let rounded = if scaled >= 0 {
            (scaled + 5000) / 10000
        } else {
            (scaled - 5000) / 10000
        };
        Money::from_cents(rounded as i64)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Renders `$1234.56`, or `-$5.00` for negative values.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}${}.{:02}",
            sign,
            self.dollars().abs(),
            self.cents_part()
        )
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(-self.0)
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
