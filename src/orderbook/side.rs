//! One side of the book: an ordered chain of price levels.
//!
//! ## Layout
//!
//! Levels live in a per-side slab and are threaded into a doubly-linked
//! chain from best to worst price:
//!
//! ```text
//! bids: head 105 <-> 100 <-> 95 tail      (descending)
//! asks: head 101 <-> 103 <-> 110 tail     (ascending)
//! ```
//!
//! A `BTreeMap` from price to level key sits beside the chain. It answers
//! "is there a level at this price" and "which level is the first one worse
//! than this price" in O(log L), so insertion never scans the chain. The
//! chain itself is what readers walk.

use std::collections::BTreeMap;
use std::ops::Bound::{Excluded, Unbounded};

use slab::Slab;

use crate::orderbook::{OrderNode, PriceLevel};
use crate::types::{IntegrityError, Side};

/// Price levels for one side of the book.
#[derive(Debug)]
pub struct BookSide {
    side: Side,

    /// Level storage; keys are the chain links
    levels: Slab<PriceLevel>,

    /// Price -> level key
    index: BTreeMap<u64, usize>,

    /// Best level
    head: Option<usize>,

    /// Worst level
    tail: Option<usize>,

    /// Orders queued across all levels of this side
    order_count: usize,
}

impl BookSide {
    pub fn new(side: Side, level_capacity: usize) -> Self {
        Self {
            side,
            levels: Slab::with_capacity(level_capacity),
            index: BTreeMap::new(),
            head: None,
            tail: None,
            order_count: 0,
        }
    }

    #[inline]
    pub fn side(&self) -> Side {
        self.side
    }

    #[inline]
    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    #[inline]
    pub fn order_count(&self) -> usize {
        self.order_count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Best level (head of the chain)
    pub fn best(&self) -> Option<&PriceLevel> {
        self.head.and_then(|key| self.levels.get(key))
    }

    /// Best price on this side
    pub fn best_price(&self) -> Option<u64> {
        self.best().map(|level| level.price)
    }

    /// Level key at exactly `price`
    #[inline]
    pub fn find(&self, price: u64) -> Option<usize> {
        self.index.get(&price).copied()
    }

    /// Level at exactly `price`
    pub fn level(&self, price: u64) -> Option<&PriceLevel> {
        self.find(price).and_then(|key| self.levels.get(key))
    }

    /// The first level strictly worse than `price`: a new level at `price`
    /// belongs immediately before it. `None` means the new level goes at
    /// the tail.
    pub fn insertion_point(&self, price: u64) -> Option<usize> {
        match self.side {
            Side::Buy => self.index.range(..price).next_back(),
            Side::Sell => self.index.range((Excluded(price), Unbounded)).next(),
        }
        .map(|(_, &key)| key)
    }

    /// Place an order (already stored in `orders`) on this side.
    ///
    /// Appends to the level at the order's price, creating and splicing in a
    /// new level when none exists. `price` must be the order's price.
    /// Returns the level key, or `None` with nothing changed when the order
    /// is not in `orders` or is already queued.
    pub fn push(&mut self, order_key: usize, price: u64, orders: &mut Slab<OrderNode>) -> Option<usize> {
        if !orders.get(order_key).is_some_and(OrderNode::is_unlinked) {
            return None;
        }

        let level_key = match self.find(price) {
            Some(key) => key,
            None => self.create_level(price),
        };

        if !self.levels[level_key].push_back(order_key, orders) {
            return None;
        }
        self.order_count += 1;

        tracing::trace!(side = ?self.side, price, order_key, "order appended to level");
        Some(level_key)
    }

    /// Allocate a level at `price` and splice it into the chain.
    fn create_level(&mut self, price: u64) -> usize {
        let before = self.insertion_point(price);
        let key = self.levels.insert(PriceLevel::new(price));
        self.index.insert(price, key);

        match before {
            Some(next_key) => {
                let prev_key = self.levels[next_key].prev;
                {
                    let level = &mut self.levels[key];
                    level.prev = prev_key;
                    level.next = Some(next_key);
                }
                self.levels[next_key].prev = Some(key);
                match prev_key {
                    Some(prev) => self.levels[prev].next = Some(key),
                    None => self.head = Some(key),
                }
            }
            None => {
                self.levels[key].prev = self.tail;
                match self.tail {
                    Some(tail) => self.levels[tail].next = Some(key),
                    None => self.head = Some(key),
                }
                self.tail = Some(key);
            }
        }

        tracing::debug!(
            side = ?self.side,
            price,
            levels = self.levels.len(),
            "price level created"
        );
        key
    }

    /// Walk the chain from best to worst price.
    pub fn levels(&self) -> LevelIter<'_> {
        LevelIter {
            levels: &self.levels,
            cursor: self.head,
        }
    }

    /// Release every level and every order queued on this side.
    ///
    /// Orders are removed from `orders` before their level is dropped.
    /// Returns `(levels, orders)` released.
    pub fn release(&mut self, orders: &mut Slab<OrderNode>) -> (usize, usize) {
        let mut released_levels = 0;
        let mut released_orders = 0;
        let mut cursor = self.head;

        while let Some(key) = cursor {
            let Some(mut level) = self.levels.try_remove(key) else {
                break;
            };
            released_orders += level.release(orders);
            released_levels += 1;
            cursor = level.next;
        }

        self.levels.clear();
        self.index.clear();
        self.head = None;
        self.tail = None;
        self.order_count = 0;
        (released_levels, released_orders)
    }

    /// Verify ordering, links, index agreement and level aggregates.
    ///
    /// Returns the number of orders reachable from this side's chain.
    pub fn check(&self, orders: &Slab<OrderNode>) -> Result<usize, IntegrityError> {
        let side = self.side;
        let mut previous: Option<(usize, u64)> = None;
        let mut chained = 0;
        let mut reachable = 0;
        let mut cursor = self.head;

        while let Some(key) = cursor {
            // a cycle would otherwise walk forever
            if chained >= self.levels.len() {
                return Err(IntegrityError::BrokenEnds { side });
            }
            let level = self.levels.get(key).ok_or(IntegrityError::BrokenEnds { side })?;
            let price = level.price;

            if level.prev != previous.map(|(k, _)| k) {
                return Err(IntegrityError::BrokenLevelLink { side, price });
            }
            if let Some((_, prev_price)) = previous {
                if !side.is_better(prev_price, price) {
                    return Err(IntegrityError::Unordered { side, previous: prev_price, next: price });
                }
            }
            if self.find(price) != Some(key) {
                return Err(IntegrityError::IndexMismatch {
                    side,
                    indexed: self.index.len(),
                    chained: chained + 1,
                });
            }
            if level.is_empty() {
                return Err(IntegrityError::EmptyLevel { side, price });
            }

            reachable += check_queue(side, level, orders)?;
            chained += 1;
            previous = Some((key, price));
            cursor = level.next;
        }

        if self.tail != previous.map(|(k, _)| k) {
            return Err(IntegrityError::BrokenEnds { side });
        }
        if chained != self.index.len() || chained != self.levels.len() {
            return Err(IntegrityError::IndexMismatch { side, indexed: self.index.len(), chained });
        }
        Ok(reachable)
    }
}

/// Check one level's queue against its cached aggregates.
fn check_queue(
    side: Side,
    level: &PriceLevel,
    orders: &Slab<OrderNode>,
) -> Result<usize, IntegrityError> {
    let price = level.price;
    let mut count = 0;
    let mut total: u64 = 0;
    let mut last_seq: Option<u64> = None;
    let mut last_key: Option<usize> = None;

    for (key, node) in level.order_keys(orders) {
        if count >= orders.len() {
            return Err(IntegrityError::BrokenLevelLink { side, price });
        }
        let order_id = node.order_id();
        if node.price() != price || node.order.side_raw != side.to_u8() {
            return Err(IntegrityError::MisplacedOrder { side, price, order_id });
        }
        if node.prev != last_key {
            return Err(IntegrityError::BrokenLevelLink { side, price });
        }
        if last_seq.is_some_and(|seq| seq >= node.seq) {
            return Err(IntegrityError::FifoViolation { side, price, order_id });
        }
        total = total.saturating_add(node.remaining());
        count += 1;
        last_seq = Some(node.seq);
        last_key = Some(key);
    }

    if level.tail != last_key {
        return Err(IntegrityError::BrokenLevelLink { side, price });
    }
    if total != level.total_quantity {
        return Err(IntegrityError::AggregateMismatch {
            side,
            price,
            cached: level.total_quantity,
            actual: total,
        });
    }
    if count != level.order_count {
        return Err(IntegrityError::CountMismatch { side, price, cached: level.order_count, actual: count });
    }
    Ok(count)
}

/// Best-to-worst iterator over one side's levels.
pub struct LevelIter<'a> {
    levels: &'a Slab<PriceLevel>,
    cursor: Option<usize>,
}

impl<'a> Iterator for LevelIter<'a> {
    type Item = &'a PriceLevel;

    fn next(&mut self) -> Option<Self::Item> {
        let level = self.levels.get(self.cursor?)?;
        self.cursor = level.next;
        Some(level)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Order;

    fn place(side: &mut BookSide, orders: &mut Slab<OrderNode>, id: u64, price: u64, qty: u64) -> usize {
        let order = Order::new(id, side.side(), price, qty, 0);
        let key = orders.insert(OrderNode::new(order, id));
        side.push(key, price, orders).expect("fresh node is placed")
    }

    fn prices(side: &BookSide) -> Vec<u64> {
        side.levels().map(|level| level.price).collect()
    }

    #[test]
    fn test_bids_descending() {
        let mut orders = Slab::new();
        let mut bids = BookSide::new(Side::Buy, 8);

        place(&mut bids, &mut orders, 1, 100, 1);
        place(&mut bids, &mut orders, 2, 105, 1);
        place(&mut bids, &mut orders, 3, 95, 1);

        assert_eq!(prices(&bids), vec![105, 100, 95]);
        assert_eq!(bids.best_price(), Some(105));
        assert_eq!(bids.check(&orders), Ok(3));
    }

    #[test]
    fn test_asks_ascending() {
        let mut orders = Slab::new();
        let mut asks = BookSide::new(Side::Sell, 8);

        place(&mut asks, &mut orders, 1, 103, 1);
        place(&mut asks, &mut orders, 2, 110, 1);
        place(&mut asks, &mut orders, 3, 101, 1);
        place(&mut asks, &mut orders, 4, 105, 1);

        assert_eq!(prices(&asks), vec![101, 103, 105, 110]);
        assert_eq!(asks.check(&orders), Ok(4));
    }

    #[test]
    fn test_insertion_point() {
        let mut orders = Slab::new();
        let mut bids = BookSide::new(Side::Buy, 8);
        let k100 = place(&mut bids, &mut orders, 1, 100, 1);
        let k90 = place(&mut bids, &mut orders, 2, 90, 1);

        assert_eq!(bids.insertion_point(110), Some(k100));
        assert_eq!(bids.insertion_point(95), Some(k90));
        assert_eq!(bids.insertion_point(80), None);

        let mut asks = BookSide::new(Side::Sell, 8);
        let k100 = place(&mut asks, &mut orders, 3, 100, 1);
        let k110 = place(&mut asks, &mut orders, 4, 110, 1);

        assert_eq!(asks.insertion_point(90), Some(k100));
        assert_eq!(asks.insertion_point(105), Some(k110));
        assert_eq!(asks.insertion_point(120), None);
    }

    #[test]
    fn test_same_price_reuses_level() {
        let mut orders = Slab::new();
        let mut bids = BookSide::new(Side::Buy, 8);

        let first = place(&mut bids, &mut orders, 1, 100, 5);
        let second = place(&mut bids, &mut orders, 2, 100, 7);

        assert_eq!(first, second);
        assert_eq!(bids.level_count(), 1);
        assert_eq!(bids.order_count(), 2);
        assert_eq!(bids.level(100).map(|l| l.total_quantity), Some(12));
    }

    #[test]
    fn test_chain_links() {
        let mut orders = Slab::new();
        let mut asks = BookSide::new(Side::Sell, 8);

        let k105 = place(&mut asks, &mut orders, 1, 105, 1);
        let k101 = place(&mut asks, &mut orders, 2, 101, 1); // new head
        let k103 = place(&mut asks, &mut orders, 3, 103, 1); // middle
        let k110 = place(&mut asks, &mut orders, 4, 110, 1); // new tail

        assert_eq!(asks.head, Some(k101));
        assert_eq!(asks.tail, Some(k110));
        assert_eq!(asks.levels[k101].prev, None);
        assert_eq!(asks.levels[k101].next, Some(k103));
        assert_eq!(asks.levels[k103].prev, Some(k101));
        assert_eq!(asks.levels[k103].next, Some(k105));
        assert_eq!(asks.levels[k105].prev, Some(k103));
        assert_eq!(asks.levels[k105].next, Some(k110));
        assert_eq!(asks.levels[k110].prev, Some(k105));
        assert_eq!(asks.levels[k110].next, None);
    }

    #[test]
    fn test_release() {
        let mut orders = Slab::new();
        let mut bids = BookSide::new(Side::Buy, 8);
        let mut asks = BookSide::new(Side::Sell, 8);

        place(&mut bids, &mut orders, 1, 100, 1);
        place(&mut bids, &mut orders, 2, 100, 1);
        place(&mut bids, &mut orders, 3, 99, 1);
        place(&mut asks, &mut orders, 4, 101, 1);

        assert_eq!(bids.release(&mut orders), (2, 3));
        assert!(bids.is_empty());
        assert_eq!(bids.level_count(), 0);
        assert_eq!(bids.order_count(), 0);
        assert!(bids.best().is_none());

        // The other side is untouched
        assert_eq!(orders.len(), 1);
        assert_eq!(asks.check(&orders), Ok(1));
    }

    #[test]
    fn test_check_detects_bad_aggregate() {
        let mut orders = Slab::new();
        let mut bids = BookSide::new(Side::Buy, 8);
        let key = place(&mut bids, &mut orders, 1, 100, 5);

        bids.levels[key].total_quantity = 4;

        assert_eq!(
            bids.check(&orders),
            Err(IntegrityError::AggregateMismatch { side: Side::Buy, price: 100, cached: 4, actual: 5 })
        );
    }

    #[test]
    fn test_push_refuses_missing_or_queued_order() {
        let mut orders = Slab::new();
        let mut bids = BookSide::new(Side::Buy, 8);

        assert_eq!(bids.push(42, 100, &mut orders), None);
        assert_eq!(bids.level_count(), 0);
        assert_eq!(bids.order_count(), 0);

        place(&mut bids, &mut orders, 1, 100, 1);
        place(&mut bids, &mut orders, 2, 100, 1);
        let head = bids.level(100).and_then(|level| level.head).unwrap();
        let tail = bids.level(100).and_then(|level| level.tail).unwrap();

        assert_eq!(bids.push(head, 100, &mut orders), None);
        assert_eq!(bids.push(tail, 95, &mut orders), None);
        assert_eq!(bids.level_count(), 1);
        assert_eq!(bids.order_count(), 2);
        assert_eq!(bids.level(100).and_then(|level| level.tail), Some(tail));
        assert_eq!(bids.check(&orders), Ok(2));
    }

    #[test]
    fn test_check_detects_corrupt_side_byte() {
        let mut orders = Slab::new();
        let mut bids = BookSide::new(Side::Buy, 8);
        let level_key = place(&mut bids, &mut orders, 1, 100, 1);
        let order_key = bids.levels[level_key].head.unwrap();

        orders[order_key].order.side_raw = 7;

        assert_eq!(
            bids.check(&orders),
            Err(IntegrityError::MisplacedOrder { side: Side::Buy, price: 100, order_id: 1 })
        );
    }

    #[test]
    fn test_check_detects_fifo_violation() {
        let mut orders = Slab::new();
        let mut bids = BookSide::new(Side::Buy, 8);
        place(&mut bids, &mut orders, 5, 100, 1);
        place(&mut bids, &mut orders, 2, 100, 1); // seq 2 after seq 5

        assert_eq!(
            bids.check(&orders),
            Err(IntegrityError::FifoViolation { side: Side::Buy, price: 100, order_id: 2 })
        );
    }
}
