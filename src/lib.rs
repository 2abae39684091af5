//! # limit-book
//!
//! The price-level core of a single-instrument limit order book.
//!
//! ## Architecture
//!
//! - **Types**: `Order`, `Side`, fixed-point helpers, error taxonomy
//! - **OrderBook**: bid and ask chains of price levels over a slab arena
//!
//! ## Design Principles
//!
//! 1. **Price-time priority**: best price first, FIFO within a price
//! 2. **No Floating Point**: prices are `u64` scaled by 10^8
//! 3. **Arena storage**: links are slab keys, never raw pointers
//! 4. **All-or-nothing insertion**: a rejected order leaves no trace
//! 5. **Single-threaded**: one book per instrument, `&mut self` to mutate
//!
//! ## Example
//!
//! ```
//! use limit_book::{Order, OrderBook, Side};
//!
//! let mut book = OrderBook::new();
//! book.add_order(Order::create(1, Side::Buy, 10_000_000_000, 5).unwrap()).unwrap();
//! book.add_order(Order::create(2, Side::Buy, 10_000_000_000, 7).unwrap()).unwrap();
//!
//! let level = book.best_bid_level().unwrap();
//! assert_eq!(level.total_quantity, 12);
//! assert_eq!(level.order_count, 2);
//! ```

// ============================================================================
// Module declarations
// ============================================================================

/// Core data types: Order, Side, errors, fixed-point helpers
pub mod types;

/// Order book: price-level chains with slab-based storage
pub mod orderbook;

// ============================================================================
// Re-exports for convenience
// ============================================================================

pub use types::{BookError, BookResult, IntegrityError, Order, OrderStatus, Side};
pub use orderbook::{BookConfig, LevelSnapshot, OrderBook, PriceLevel, TeardownStats};
