//! Order book module.
//!
//! ## Architecture
//!
//! - **Slab-based storage**: orders and price levels live in arenas; every
//!   link (queue neighbour, chain neighbour) is a slab key
//! - **Price levels**: one FIFO queue per price, with cached aggregates
//! - **Level chains**: bids best-first descending, asks best-first ascending,
//!   each backed by a `BTreeMap` index for O(log L) placement
//!
//! ## Components
//!
//! - [`OrderNode`]: `Order` plus queue links and arrival sequence
//! - [`PriceLevel`]: the queue at one price
//! - [`BookSide`]: the chain of levels on one side
//! - [`OrderBook`]: both sides, the order arena and the id index
//! - [`BookConfig`]: capacities and limits
//!
//! ## Performance
//!
//! | Operation | Complexity |
//! |-----------|------------|
//! | Add order at existing price | O(log L) lookup + O(1) append |
//! | Add order at new price | O(log L) lookup + O(1) splice |
//! | Best bid/ask | O(1) |
//! | Teardown | O(orders + levels) |
//!
//! ## Example
//!
//! ```
//! use limit_book::orderbook::OrderBook;
//! use limit_book::types::{Order, Side};
//!
//! let mut book = OrderBook::with_capacity(10_000);
//! for (id, price) in [(1, 100), (2, 105), (3, 95)] {
//!     book.add_order(Order::new(id, Side::Buy, price, 10, 0)).unwrap();
//! }
//!
//! let ladder: Vec<u64> = book.levels(Side::Buy).map(|l| l.price).collect();
//! assert_eq!(ladder, vec![105, 100, 95]);
//! ```

pub mod node;
pub mod level;
pub mod side;
pub mod config;
pub mod book;

pub use node::OrderNode;
pub use level::{LevelSnapshot, PriceLevel, QueueIter};
pub use side::{BookSide, LevelIter};
pub use config::BookConfig;
pub use book::{OrderBook, OrderKey, TeardownStats};
