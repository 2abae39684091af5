//! Order record for the limit book.
//!
//! ## SSZ Serialization
//!
//! `Order` derives `SimpleSerialize` from ssz_rs. Enums are stored as raw
//! `u8` fields so the whole record is a fixed-size container, which keeps
//! the book's state root byte-for-byte reproducible.
//!
//! ## Fixed-Point Representation
//!
//! Prices and quantities are `u64` scaled by 10^8 (see [`super::price`]).

use rust_decimal::Decimal;
use ssz_rs::prelude::*;

use crate::types::clock;
use crate::types::error::{BookError, BookResult};
use crate::types::price;

// ============================================================================
// Side enum
// ============================================================================

/// Order side: Buy or Sell
///
/// Represented as u8 for SSZ compatibility:
/// - Buy = 0
/// - Sell = 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Side {
    /// Buy order (bid), rests on the descending chain
    #[default]
    Buy,
    /// Sell order (ask), rests on the ascending chain
    Sell,
}

impl Side {
    /// Convert to u8 for serialization
    pub fn to_u8(self) -> u8 {
        match self {
            Side::Buy => 0,
            Side::Sell => 1,
        }
    }

    /// Convert from u8 for deserialization
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Side::Buy),
            1 => Some(Side::Sell),
            _ => None,
        }
    }

    /// Returns the opposite side
    pub fn opposite(self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }

    /// `true` if `a` has higher priority than `b` on this side.
    ///
    /// Bids prefer higher prices, asks prefer lower prices.
    #[inline]
    pub fn is_better(self, a: u64, b: u64) -> bool {
        match self {
            Side::Buy => a > b,
            Side::Sell => a < b,
        }
    }
}

// ============================================================================
// OrderStatus enum
// ============================================================================

/// Lifecycle state of an order.
///
/// The book itself only ever holds `New` orders; the other states belong to
/// the fill and cancel paths of collaborators built on top of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OrderStatus {
    #[default]
    New,
    PartiallyFilled,
    Filled,
    Cancelled,
}

impl OrderStatus {
    pub fn to_u8(self) -> u8 {
        match self {
            OrderStatus::New => 0,
            OrderStatus::PartiallyFilled => 1,
            OrderStatus::Filled => 2,
            OrderStatus::Cancelled => 3,
        }
    }

    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(OrderStatus::New),
            1 => Some(OrderStatus::PartiallyFilled),
            2 => Some(OrderStatus::Filled),
            3 => Some(OrderStatus::Cancelled),
            _ => None,
        }
    }
}

// ============================================================================
// Order struct
// ============================================================================

/// A limit order.
///
/// ## SSZ Layout
///
/// Fixed-size container of 42 bytes (8+1+8+8+8+8+1).
///
/// ## Example
///
/// ```
/// use limit_book::types::{Order, Side};
///
/// // Buy 1.0 at 100.00000000
/// let order = Order::new(1, Side::Buy, 10_000_000_000, 100_000_000, 1_700_000_000_000_000_000);
/// assert_eq!(order.remaining_quantity, order.initial_quantity);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, SimpleSerialize)]
pub struct Order {
    /// Caller-assigned identifier, unique among resting orders
    pub id: u64,

    /// Order side as u8 (0=Buy, 1=Sell)
    pub side_raw: u8,

    /// Limit price in fixed-point (scaled by 10^8)
    pub price: u64,

    /// Quantity at submission
    pub initial_quantity: u64,

    /// Unfilled quantity; this is what rests in the book
    pub remaining_quantity: u64,

    /// Arrival time, nanoseconds since the Unix epoch
    pub timestamp: u64,

    /// Order status as u8 (see [`OrderStatus::to_u8`])
    pub status_raw: u8,
}

impl Order {
    /// Build an order without validation.
    ///
    /// Use [`Order::create`] to validate and stamp from the clock.
    pub fn new(id: u64, side: Side, price: u64, quantity: u64, timestamp: u64) -> Self {
        Self {
            id,
            side_raw: side.to_u8(),
            price,
            initial_quantity: quantity,
            remaining_quantity: quantity,
            timestamp,
            status_raw: OrderStatus::New.to_u8(),
        }
    }

    /// Create a validated order stamped with the current time.
    ///
    /// # Errors
    ///
    /// * [`BookError::InvalidQuantity`] if `quantity` is zero
    /// * [`BookError::InvalidPrice`] if `price` is zero
    ///
    /// # Example
    ///
    /// ```
    /// use limit_book::types::{BookError, Order, Side};
    ///
    /// let order = Order::create(1, Side::Sell, 10_100_000_000, 5).unwrap();
    /// assert!(order.timestamp > 0);
    ///
    /// assert_eq!(
    ///     Order::create(2, Side::Sell, 10_100_000_000, 0),
    ///     Err(BookError::InvalidQuantity { order_id: 2 })
    /// );
    /// ```
    pub fn create(id: u64, side: Side, price: u64, quantity: u64) -> BookResult<Self> {
        let order = Self::new(id, side, price, quantity, clock::now_nanos());
        order.validate()?;
        Ok(order)
    }

    /// Check the fields the book relies on before an order may rest.
    ///
    /// # Errors
    ///
    /// * [`BookError::InvalidQuantity`] if nothing remains
    /// * [`BookError::InvalidPrice`] if `price` is zero
    /// * [`BookError::InvalidSide`] if `side_raw` is not a known side
    /// * [`BookError::InvalidStatus`] if the status is anything but `New`
    /// * [`BookError::ExcessRemaining`] if `remaining_quantity > initial_quantity`
    pub fn validate(&self) -> BookResult<()> {
        if self.remaining_quantity == 0 {
            return Err(BookError::InvalidQuantity { order_id: self.id });
        }
        if self.price == 0 {
            return Err(BookError::InvalidPrice { order_id: self.id, price: self.price });
        }
        if Side::from_u8(self.side_raw).is_none() {
            return Err(BookError::InvalidSide { order_id: self.id, raw: self.side_raw });
        }
        if OrderStatus::from_u8(self.status_raw) != Some(OrderStatus::New) {
            return Err(BookError::InvalidStatus { order_id: self.id, raw: self.status_raw });
        }
        if self.remaining_quantity > self.initial_quantity {
            return Err(BookError::ExcessRemaining {
                order_id: self.id,
                remaining: self.remaining_quantity,
                initial: self.initial_quantity,
            });
        }
        Ok(())
    }

    /// Get the order side. Unknown raw values read as Buy; [`Order::validate`]
    /// keeps them out of the book.
    pub fn side(&self) -> Side {
        Side::from_u8(self.side_raw).unwrap_or(Side::Buy)
    }

    /// Get the order status
    pub fn status(&self) -> OrderStatus {
        OrderStatus::from_u8(self.status_raw).unwrap_or(OrderStatus::New)
    }

    /// Check if nothing remains to be filled
    pub fn is_filled(&self) -> bool {
        self.remaining_quantity == 0
    }

    /// Quantity already filled
    pub fn filled_quantity(&self) -> u64 {
        self.initial_quantity.saturating_sub(self.remaining_quantity)
    }

    /// Price as a human-scale decimal
    pub fn price_decimal(&self) -> Decimal {
        price::to_decimal(self.price)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
