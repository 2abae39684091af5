//! Price level: the FIFO queue of orders at one price.
//!
//! ## Queue Structure
//!
//! ```text
//! head (oldest) <-> order2 <-> order3 <-> tail (newest)
//! ```
//!
//! The order data lives in the book's order slab; a level only holds the
//! queue ends, the cached aggregates and its links to the neighbouring
//! levels on the same side (keys into the side's level slab).

use slab::Slab;
use ssz_rs::prelude::*;

use crate::orderbook::OrderNode;

/// A price level containing orders at a single price.
#[derive(Debug, Clone)]
pub struct PriceLevel {
    /// Price for this level (fixed-point, scaled by 10^8)
    pub price: u64,

    /// Sum of the remaining quantity of every queued order.
    /// Maintained on append, never recomputed.
    pub total_quantity: u64,

    /// Oldest order (order slab key)
    pub head: Option<usize>,

    /// Newest order (order slab key)
    pub tail: Option<usize>,

    /// Number of queued orders
    pub order_count: usize,

    /// Better-priced neighbour on the same side (level slab key)
    pub prev: Option<usize>,

    /// Worse-priced neighbour on the same side (level slab key)
    pub next: Option<usize>,
}

/// Aggregate view of one level, as exposed to depth queries and digested
/// into the state root.
#[derive(Debug, Clone, PartialEq, Eq, Default, SimpleSerialize)]
pub struct LevelSnapshot {
    pub price: u64,
    pub total_quantity: u64,
    pub order_count: u64,
}

impl PriceLevel {
    /// Create an empty, unlinked level.
    pub fn new(price: u64) -> Self {
        Self {
            price,
            total_quantity: 0,
            head: None,
            tail: None,
            order_count: 0,
            prev: None,
            next: None,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.order_count == 0
    }

    /// Append an order to the tail of the queue.
    ///
    /// The caller must have checked that `total_quantity` cannot overflow;
    /// the book does this before any mutation.
    ///
    /// Returns `false`, leaving the level untouched, when `key` is not in
    /// the slab or the node is already queued somewhere.
    pub fn push_back(&mut self, key: usize, orders: &mut Slab<OrderNode>) -> bool {
        let Some(node) = orders.get_mut(key) else {
            return false;
        };
        if !node.is_unlinked() || self.tail == Some(key) {
            return false;
        }
        let quantity = node.remaining();
        node.prev = self.tail;
        node.next = None;

        match self.tail.and_then(|tail| orders.get_mut(tail)) {
            Some(tail_node) => tail_node.next = Some(key),
            None => self.head = Some(key),
        }

        self.tail = Some(key);
        self.order_count += 1;
        self.total_quantity += quantity;
        true
    }

    /// Walk the queue from oldest to newest.
    pub fn order_keys<'a>(&self, orders: &'a Slab<OrderNode>) -> QueueIter<'a> {
        QueueIter {
            orders,
            cursor: self.head,
        }
    }

    /// Remove every queued order from the slab and reset the level.
    ///
    /// Returns the number of orders released.
    pub fn release(&mut self, orders: &mut Slab<OrderNode>) -> usize {
        let mut released = 0;
        let mut cursor = self.head;
        while let Some(node) = cursor.and_then(|key| orders.try_remove(key)) {
            cursor = node.next;
            released += 1;
        }

        self.head = None;
        self.tail = None;
        self.order_count = 0;
        self.total_quantity = 0;
        released
    }

    pub fn snapshot(&self) -> LevelSnapshot {
        LevelSnapshot {
            price: self.price,
            total_quantity: self.total_quantity,
            order_count: self.order_count as u64,
        }
    }
}

/// Head-to-tail iterator over the order keys of one level.
pub struct QueueIter<'a> {
    orders: &'a Slab<OrderNode>,
    cursor: Option<usize>,
}

impl<'a> Iterator for QueueIter<'a> {
    type Item = (usize, &'a OrderNode);

    fn next(&mut self) -> Option<Self::Item> {
        let key = self.cursor?;
        let node = self.orders.get(key)?;
        self.cursor = node.next;
        Some((key, node))
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Order, Side};

    const PRICE: u64 = 10_000_000_000;

    fn create_test_node(slab: &mut Slab<OrderNode>, id: u64, quantity: u64) -> usize {
        let order = Order::new(id, Side::Buy, PRICE, quantity, 0);
        slab.insert(OrderNode::new(order, id))
    }

    #[test]
    fn test_price_level_new() {
        let level = PriceLevel::new(PRICE);

        assert_eq!(level.price, PRICE);
        assert_eq!(level.total_quantity, 0);
        assert!(level.head.is_none());
        assert!(level.tail.is_none());
        assert!(level.prev.is_none());
        assert!(level.next.is_none());
        assert!(level.is_empty());
    }

    #[test]
    fn test_price_level_push_single() {
        let mut slab = Slab::with_capacity(10);
        let mut level = PriceLevel::new(PRICE);

        let key = create_test_node(&mut slab, 1, 5);
        level.push_back(key, &mut slab);

        assert_eq!(level.order_count, 1);
        assert_eq!(level.total_quantity, 5);
        assert_eq!(level.head, Some(key));
        assert_eq!(level.tail, Some(key));
        assert!(slab[key].is_unlinked());
    }

    #[test]
    fn test_price_level_push_refuses_unknown_or_queued() {
        let mut slab = Slab::with_capacity(10);
        let mut level = PriceLevel::new(PRICE);

        assert!(!level.push_back(7, &mut slab));
        assert!(level.is_empty());
        assert!(level.head.is_none());

        let key1 = create_test_node(&mut slab, 1, 5);
        let key2 = create_test_node(&mut slab, 2, 7);
        assert!(level.push_back(key1, &mut slab));
        assert!(level.push_back(key2, &mut slab));

        // Both are queued now, as the tail and as a linked node
        assert!(!level.push_back(key2, &mut slab));
        assert!(!level.push_back(key1, &mut slab));
        assert_eq!(level.order_count, 2);
        assert_eq!(level.total_quantity, 12);
        assert_eq!(slab[key2].next, None);
    }

    #[test]
    fn test_price_level_push_multiple() {
        let mut slab = Slab::with_capacity(10);
        let mut level = PriceLevel::new(PRICE);

        let key1 = create_test_node(&mut slab, 1, 5);
        let key2 = create_test_node(&mut slab, 2, 7);
        let key3 = create_test_node(&mut slab, 3, 11);

        level.push_back(key1, &mut slab);
        level.push_back(key2, &mut slab);
        level.push_back(key3, &mut slab);

        assert_eq!(level.order_count, 3);
        assert_eq!(level.total_quantity, 23);
        assert_eq!(level.head, Some(key1));
        assert_eq!(level.tail, Some(key3));

        // key1 <-> key2 <-> key3
        assert_eq!(slab[key1].prev, None);
        assert_eq!(slab[key1].next, Some(key2));
        assert_eq!(slab[key2].prev, Some(key1));
        assert_eq!(slab[key2].next, Some(key3));
        assert_eq!(slab[key3].prev, Some(key2));
        assert_eq!(slab[key3].next, None);
    }

    #[test]
    fn test_price_level_order_keys() {
        let mut slab = Slab::with_capacity(10);
        let mut level = PriceLevel::new(PRICE);

        assert_eq!(level.order_keys(&slab).count(), 0);

        for id in 1..=4 {
            let key = create_test_node(&mut slab, id, id * 10);
            level.push_back(key, &mut slab);
        }

        let ids: Vec<u64> = level.order_keys(&slab).map(|(_, node)| node.order_id()).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_price_level_release() {
        let mut slab = Slab::with_capacity(10);
        let mut level = PriceLevel::new(PRICE);

        // An order outside the level must survive
        let outsider = create_test_node(&mut slab, 99, 1);
        for id in 1..=3 {
            let key = create_test_node(&mut slab, id, 10);
            level.push_back(key, &mut slab);
        }

        assert_eq!(level.release(&mut slab), 3);
        assert!(level.is_empty());
        assert_eq!(level.total_quantity, 0);
        assert!(level.head.is_none());
        assert!(level.tail.is_none());
        assert_eq!(slab.len(), 1);
        assert!(slab.contains(outsider));
    }

    #[test]
    fn test_price_level_snapshot() {
        let mut slab = Slab::with_capacity(10);
        let mut level = PriceLevel::new(PRICE);
        let key = create_test_node(&mut slab, 1, 12);
        level.push_back(key, &mut slab);

        assert_eq!(
            level.snapshot(),
            LevelSnapshot { price: PRICE, total_quantity: 12, order_count: 1 }
        );
    }
}
