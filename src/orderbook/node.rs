//! Order node stored in the order arena.
//!
//! `OrderNode` wraps an `Order` with doubly-linked queue pointers. The
//! pointers are slab keys (`usize`), not references, so a price level's
//! queue is a list threaded through the arena:
//!
//! - `next`: the order that arrived after this one at the same price
//! - `prev`: the order that arrived before this one at the same price
//!
//! `seq` is assigned by the book on insertion and strictly increases, so a
//! queue read head to tail must show increasing `seq`.

use crate::types::Order;

/// Order node stored in the slab.
#[derive(Debug, Clone)]
pub struct OrderNode {
    /// The resting order
    pub order: Order,

    /// Book-wide arrival sequence number
    pub seq: u64,

    /// Next (newer) order in the level queue, None at the tail
    pub next: Option<usize>,

    /// Previous (older) order in the level queue, None at the head
    pub prev: Option<usize>,
}

impl OrderNode {
    /// Create a new, unlinked node.
    #[inline]
    pub fn new(order: Order, seq: u64) -> Self {
        Self {
            order,
            seq,
            next: None,
            prev: None,
        }
    }

    /// Check if this node has no queue neighbours
    #[inline]
    pub fn is_unlinked(&self) -> bool {
        self.next.is_none() && self.prev.is_none()
    }

    #[inline]
    pub fn order_id(&self) -> u64 {
        self.order.id
    }

    #[inline]
    pub fn price(&self) -> u64 {
        self.order.price
    }

    #[inline]
    pub fn remaining(&self) -> u64 {
        self.order.remaining_quantity
    }
}
