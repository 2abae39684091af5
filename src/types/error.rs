//! Error types for order admission and structural checks.
//!
//! [`BookError`] is returned by every fallible operation on orders and the
//! book. A rejected order never mutates the book: all checks run before the
//! first write.
//!
//! [`IntegrityError`] is produced only by
//! [`OrderBook::check_integrity`](crate::orderbook::OrderBook::check_integrity)
//! and describes the first broken invariant found while walking a side.

use crate::types::Side;

/// Resource whose configured limit was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    /// Resting orders across both sides
    Orders,
    /// Price levels on one side
    Levels,
}

/// Errors raised while creating orders, configuring or mutating the book.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BookError {
    /// Quantity must be strictly positive
    #[error("order {order_id}: quantity must be greater than zero")]
    InvalidQuantity { order_id: u64 },

    /// Price must be strictly positive
    #[error("order {order_id}: invalid price {price}")]
    InvalidPrice { order_id: u64, price: u64 },

    /// The raw side byte is neither Buy nor Sell
    #[error("order {order_id}: unknown side {raw}")]
    InvalidSide { order_id: u64, raw: u8 },

    /// Only `New` orders may rest; the raw byte is unknown or another state
    #[error("order {order_id}: status {raw} cannot rest in the book")]
    InvalidStatus { order_id: u64, raw: u8 },

    /// Remaining quantity larger than the quantity submitted
    #[error("order {order_id}: remaining quantity {remaining} exceeds initial {initial}")]
    ExcessRemaining { order_id: u64, remaining: u64, initial: u64 },

    /// An order with this id is already resting in the book
    #[error("order {0} is already resting in the book")]
    DuplicateOrderId(u64),

    /// A configured order or level limit would be exceeded
    #[error("{resource:?} limit of {limit} reached")]
    CapacityExceeded { resource: Resource, limit: usize },

    /// Adding the order would overflow the level's aggregate quantity
    #[error("aggregate quantity overflow at price {price}")]
    QuantityOverflow { price: u64 },

    /// The order would cross the opposite side (only when crossing is rejected)
    #[error("{side:?} order at {price} crosses opposite best {opposite}")]
    CrossedBook { side: Side, price: u64, opposite: u64 },

    /// Configuration values are inconsistent
    #[error("invalid book configuration: {0}")]
    InvalidConfig(String),

    /// A decimal string could not be converted to fixed-point
    #[error("invalid decimal value: {0}")]
    InvalidDecimal(String),

    /// SSZ encoding failed while digesting book state
    #[error("serialization failed: {0}")]
    Serialization(String),
}

/// Result alias for book operations
pub type BookResult<T> = Result<T, BookError>;

/// Structural invariant violations found by an integrity walk.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IntegrityError {
    #[error("{side:?} chain out of order: {previous} followed by {next}")]
    Unordered { side: Side, previous: u64, next: u64 },

    #[error("{side:?} level {price}: neighbour links are not symmetric")]
    BrokenLevelLink { side: Side, price: u64 },

    #[error("{side:?} chain head/tail disagree with its levels")]
    BrokenEnds { side: Side },

    #[error("{side:?} index holds {indexed} levels but chain holds {chained}")]
    IndexMismatch { side: Side, indexed: usize, chained: usize },

    #[error("{side:?} level {price}: cached total {cached}, queued total {actual}")]
    AggregateMismatch { side: Side, price: u64, cached: u64, actual: u64 },

    #[error("{side:?} level {price}: cached count {cached}, queued count {actual}")]
    CountMismatch { side: Side, price: u64, cached: usize, actual: usize },

    #[error("{side:?} level {price}: order {order_id} does not belong here")]
    MisplacedOrder { side: Side, price: u64, order_id: u64 },

    #[error("{side:?} level {price}: order {order_id} arrived before its predecessor")]
    FifoViolation { side: Side, price: u64, order_id: u64 },

    #[error("{side:?} level {price} is empty")]
    EmptyLevel { side: Side, price: u64 },

    #[error("book holds {arena} orders but its chains reach {reachable}")]
    OrphanedOrders { arena: usize, reachable: usize },
}
