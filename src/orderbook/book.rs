//! The order book: two price-level chains over one order arena.
//!
//! ## Architecture
//!
//! - **Slab**: arena of [`OrderNode`]s; level queues link through its keys
//! - **BookSide**: per-side level arena, linked chain and `BTreeMap` index
//! - **HashMap**: order id -> slab key, for duplicate detection and lookup
//!
//! ## Price Ordering
//!
//! - **Bids** (buy orders): head is the highest price
//! - **Asks** (sell orders): head is the lowest price
//!
//! ## Insertion
//!
//! [`OrderBook::add_order`] runs every admission check before touching any
//! state, so a rejected order leaves the book exactly as it was.
//!
//! ## Example
//!
//! ```
//! use limit_book::orderbook::OrderBook;
//! use limit_book::types::{Order, Side};
//!
//! let mut book = OrderBook::with_capacity(1_000);
//!
//! book.add_order(Order::new(1, Side::Buy, 10_000_000_000, 5, 0)).unwrap();
//! book.add_order(Order::new(2, Side::Sell, 10_100_000_000, 5, 0)).unwrap();
//!
//! assert_eq!(book.best_bid(), Some(10_000_000_000));
//! assert_eq!(book.best_ask(), Some(10_100_000_000));
//! assert_eq!(book.spread(), Some(100_000_000));
//! ```

use std::collections::HashMap;

use sha2::{Digest, Sha256};
use slab::Slab;

use crate::orderbook::side::LevelIter;
use crate::orderbook::{BookConfig, BookSide, LevelSnapshot, OrderNode, PriceLevel};
use crate::types::{BookError, BookResult, IntegrityError, Order, Resource, Side};

/// Slab key of a resting order
pub type OrderKey = usize;

/// What a teardown released.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TeardownStats {
    pub bid_levels: usize,
    pub ask_levels: usize,
    pub orders: usize,
}

/// Single-instrument limit order book.
#[derive(Debug)]
pub struct OrderBook {
    config: BookConfig,

    /// Every resting order
    orders: Slab<OrderNode>,

    /// Buy levels, best (highest) first
    bids: BookSide,

    /// Sell levels, best (lowest) first
    asks: BookSide,

    /// Order ID to slab key mapping
    order_index: HashMap<u64, OrderKey>,

    /// Arrival sequence for the next accepted order
    next_seq: u64,
}

impl Default for OrderBook {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderBook {
    /// Create an empty book with the default configuration
    pub fn new() -> Self {
        Self::build(BookConfig::default())
    }

    /// Create an empty book with `order_capacity` pre-allocated order slots
    ///
    /// ```
    /// use limit_book::orderbook::OrderBook;
    ///
    /// let book = OrderBook::with_capacity(100_000);
    /// assert!(book.capacity() >= 100_000);
    /// ```
    pub fn with_capacity(order_capacity: usize) -> Self {
        Self::build(BookConfig::default().with_order_capacity(order_capacity))
    }

    /// Create an empty book from a validated configuration
    pub fn with_config(config: BookConfig) -> BookResult<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: BookConfig) -> Self {
        tracing::info!(
            order_capacity = config.order_capacity,
            level_capacity = config.level_capacity,
            reject_crossed = config.reject_crossed,
            "order book created"
        );
        Self {
            orders: Slab::with_capacity(config.order_capacity),
            bids: BookSide::new(Side::Buy, config.level_capacity),
            asks: BookSide::new(Side::Sell, config.level_capacity),
            order_index: HashMap::with_capacity(config.order_capacity),
            next_seq: 0,
            config,
        }
    }

    // ========================================================================
    // Insertion
    // ========================================================================

    /// Add an order to the book.
    ///
    /// The order joins the tail of the queue at its price on its side; a new
    /// level is created and spliced into the chain when the price is new.
    ///
    /// # Errors
    ///
    /// * [`BookError::InvalidQuantity`] / [`BookError::InvalidPrice`]
    /// * [`BookError::DuplicateOrderId`] if the id is already resting
    /// * [`BookError::CapacityExceeded`] if a configured limit is reached
    /// * [`BookError::QuantityOverflow`] if the level aggregate would overflow
    /// * [`BookError::CrossedBook`] if crossing is rejected and the order crosses
    ///
    /// The book is unchanged on error.
    ///
    /// ```
    /// use limit_book::orderbook::OrderBook;
    /// use limit_book::types::{BookError, Order, Side};
    ///
    /// let mut book = OrderBook::new();
    /// book.add_order(Order::new(7, Side::Buy, 100, 5, 0)).unwrap();
    ///
    /// let duplicate = book.add_order(Order::new(7, Side::Buy, 101, 5, 0));
    /// assert_eq!(duplicate, Err(BookError::DuplicateOrderId(7)));
    /// assert_eq!(book.order_count(), 1);
    /// ```
    pub fn add_order(&mut self, order: Order) -> BookResult<OrderKey> {
        if let Err(err) = self.admit(&order) {
            tracing::debug!(order_id = order.id, error = %err, "order rejected");
            return Err(err);
        }

        let order_id = order.id;
        let price = order.price;
        let side = order.side();

        let seq = self.next_seq;
        self.next_seq += 1;

        let key = self.orders.insert(OrderNode::new(order, seq));
        self.order_index.insert(order_id, key);

        let book_side = match side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        };
        // A freshly inserted node is always unlinked
        let placed = book_side.push(key, price, &mut self.orders);
        debug_assert!(placed.is_some());

        Ok(key)
    }

    /// Every check `add_order` needs, with no side effects.
    fn admit(&self, order: &Order) -> BookResult<()> {
        order.validate()?;

        if self.order_index.contains_key(&order.id) {
            return Err(BookError::DuplicateOrderId(order.id));
        }

        if let Some(limit) = self.config.max_orders {
            if self.orders.len() >= limit {
                return Err(BookError::CapacityExceeded { resource: Resource::Orders, limit });
            }
        }

        let side = order.side();
        let book_side = self.book_side(side);
        match book_side.level(order.price) {
            Some(level) => {
                if level.total_quantity.checked_add(order.remaining_quantity).is_none() {
                    return Err(BookError::QuantityOverflow { price: order.price });
                }
            }
            None => {
                if let Some(limit) = self.config.max_levels_per_side {
                    if book_side.level_count() >= limit {
                        return Err(BookError::CapacityExceeded { resource: Resource::Levels, limit });
                    }
                }
            }
        }

        if self.config.reject_crossed {
            if let Some(opposite) = self.book_side(side.opposite()).best_price() {
                let crosses = match side {
                    Side::Buy => order.price >= opposite,
                    Side::Sell => order.price <= opposite,
                };
                if crosses {
                    return Err(BookError::CrossedBook { side, price: order.price, opposite });
                }
            }
        }

        Ok(())
    }

    // ========================================================================
    // Capacity and Size
    // ========================================================================

    /// Pre-allocated order slots
    #[inline]
    pub fn capacity(&self) -> usize {
        self.orders.capacity()
    }

    #[inline]
    pub fn config(&self) -> &BookConfig {
        &self.config
    }

    /// Total number of resting orders
    #[inline]
    pub fn order_count(&self) -> usize {
        self.orders.len()
    }

    #[inline]
    pub fn bid_count(&self) -> usize {
        self.bids.order_count()
    }

    #[inline]
    pub fn ask_count(&self) -> usize {
        self.asks.order_count()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Number of bid price levels
    #[inline]
    pub fn bid_levels(&self) -> usize {
        self.bids.level_count()
    }

    /// Number of ask price levels
    #[inline]
    pub fn ask_levels(&self) -> usize {
        self.asks.level_count()
    }

    // ========================================================================
    // Best Bid/Ask
    // ========================================================================

    /// Highest buy price
    #[inline]
    pub fn best_bid(&self) -> Option<u64> {
        self.bids.best_price()
    }

    /// Lowest sell price
    #[inline]
    pub fn best_ask(&self) -> Option<u64> {
        self.asks.best_price()
    }

    /// `best_ask - best_bid`, or None if either side is empty or the book
    /// is crossed
    pub fn spread(&self) -> Option<u64> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) if ask >= bid => Some(ask - bid),
            _ => None,
        }
    }

    pub fn best_bid_level(&self) -> Option<&PriceLevel> {
        self.bids.best()
    }

    pub fn best_ask_level(&self) -> Option<&PriceLevel> {
        self.asks.best()
    }

    // ========================================================================
    // Levels and Orders
    // ========================================================================

    /// One side of the book
    #[inline]
    pub fn book_side(&self, side: Side) -> &BookSide {
        match side {
            Side::Buy => &self.bids,
            Side::Sell => &self.asks,
        }
    }

    /// Level at exactly `price` on `side`
    pub fn level(&self, side: Side, price: u64) -> Option<&PriceLevel> {
        self.book_side(side).level(price)
    }

    /// Levels on `side` from best to worst
    pub fn levels(&self, side: Side) -> LevelIter<'_> {
        self.book_side(side).levels()
    }

    /// Orders resting at `price` on `side`, oldest first
    pub fn orders_at(&self, side: Side, price: u64) -> impl Iterator<Item = &Order> + '_ {
        let orders = &self.orders;
        self.level(side, price)
            .into_iter()
            .flat_map(move |level| level.order_keys(orders).map(|(_, node)| &node.order))
    }

    /// Aggregates of the best `depth` levels on `side`
    pub fn depth(&self, side: Side, depth: usize) -> Vec<LevelSnapshot> {
        self.levels(side).take(depth).map(PriceLevel::snapshot).collect()
    }

    #[inline]
    pub fn get_order(&self, key: OrderKey) -> Option<&Order> {
        self.orders.get(key).map(|node| &node.order)
    }

    #[inline]
    pub fn get_key(&self, order_id: u64) -> Option<OrderKey> {
        self.order_index.get(&order_id).copied()
    }

    #[inline]
    pub fn contains_order(&self, order_id: u64) -> bool {
        self.order_index.contains_key(&order_id)
    }

    // ========================================================================
    // State Root
    // ========================================================================

    /// SHA-256 over the SSZ encoding of the book.
    ///
    /// Bids then asks; within a side each level snapshot in chain order
    /// followed by its orders in queue order. Two books that received the
    /// same accepted orders in the same order have the same root.
    pub fn compute_state_root(&self) -> BookResult<[u8; 32]> {
        let mut hasher = Sha256::new();

        for book_side in [&self.bids, &self.asks] {
            hasher.update([book_side.side().to_u8()]);
            for level in book_side.levels() {
                hasher.update(encode(&level.snapshot())?);
                for (_, node) in level.order_keys(&self.orders) {
                    hasher.update(encode(&node.order)?);
                }
            }
        }

        let mut root = [0u8; 32];
        root.copy_from_slice(&hasher.finalize());
        Ok(root)
    }

    /// State root as a hex string
    pub fn state_root_hex(&self) -> BookResult<String> {
        self.compute_state_root().map(hex::encode)
    }

    // ========================================================================
    // Integrity
    // ========================================================================

    /// Walk both chains and verify every structural invariant.
    pub fn check_integrity(&self) -> Result<(), IntegrityError> {
        let reachable = self.bids.check(&self.orders)? + self.asks.check(&self.orders)?;

        if reachable != self.orders.len() || self.order_index.len() != self.orders.len() {
            return Err(IntegrityError::OrphanedOrders { arena: self.orders.len(), reachable });
        }
        Ok(())
    }

    // ========================================================================
    // Teardown
    // ========================================================================

    /// Release every level and order, keeping the book usable.
    pub fn clear(&mut self) -> TeardownStats {
        let (bid_levels, bid_orders) = self.bids.release(&mut self.orders);
        let (ask_levels, ask_orders) = self.asks.release(&mut self.orders);

        self.order_index.clear();
        self.orders.clear();

        let stats = TeardownStats {
            bid_levels,
            ask_levels,
            orders: bid_orders + ask_orders,
        };
        tracing::info!(
            bid_levels = stats.bid_levels,
            ask_levels = stats.ask_levels,
            orders = stats.orders,
            "order book released"
        );
        stats
    }

    /// Tear the book down: orders, then levels, then the book itself.
    ///
    /// ```
    /// use limit_book::orderbook::OrderBook;
    /// use limit_book::types::{Order, Side};
    ///
    /// let mut book = OrderBook::new();
    /// book.add_order(Order::new(1, Side::Buy, 100, 5, 0)).unwrap();
    /// book.add_order(Order::new(2, Side::Buy, 100, 7, 0)).unwrap();
    /// book.add_order(Order::new(3, Side::Sell, 105, 1, 0)).unwrap();
    ///
    /// let stats = book.destroy();
    /// assert_eq!(stats.orders, 3);
    /// assert_eq!(stats.bid_levels + stats.ask_levels, 2);
    /// ```
    pub fn destroy(mut self) -> TeardownStats {
        self.clear()
    }
}

fn encode<T: ssz_rs::SimpleSerialize>(value: &T) -> BookResult<Vec<u8>> {
    ssz_rs::serialize(value).map_err(|e| BookError::Serialization(format!("{e:?}")))
}

// ============================================================================
// Unit Tests
// ============================================================================
