//! Book configuration.
//!
//! Capacities pre-allocate the arenas. Limits bound how far the book may
//! grow; reaching one is reported as [`BookError::CapacityExceeded`] and the
//! order is not inserted.
//!
//! ```
//! use limit_book::orderbook::BookConfig;
//!
//! let config = BookConfig::default()
//!     .with_order_capacity(4_096)
//!     .with_max_levels_per_side(512)
//!     .with_reject_crossed(true);
//! assert!(config.validate().is_ok());
//! ```

use crate::types::{BookError, BookResult};

/// Default pre-allocated order slots
pub const DEFAULT_ORDER_CAPACITY: usize = 1_024;

/// Default pre-allocated level slots per side
pub const DEFAULT_LEVEL_CAPACITY: usize = 128;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookConfig {
    /// Order slots reserved up front
    pub order_capacity: usize,

    /// Level slots reserved up front on each side
    pub level_capacity: usize,

    /// Maximum resting orders across both sides (None = unbounded)
    pub max_orders: Option<usize>,

    /// Maximum price levels on each side (None = unbounded)
    pub max_levels_per_side: Option<usize>,

    /// Reject orders priced through the opposite best
    pub reject_crossed: bool,
}

impl Default for BookConfig {
    fn default() -> Self {
        Self {
            order_capacity: DEFAULT_ORDER_CAPACITY,
            level_capacity: DEFAULT_LEVEL_CAPACITY,
            max_orders: None,
            max_levels_per_side: None,
            reject_crossed: false,
        }
    }
}

impl BookConfig {
    pub fn with_order_capacity(mut self, capacity: usize) -> Self {
        self.order_capacity = capacity;
        self
    }

    pub fn with_level_capacity(mut self, capacity: usize) -> Self {
        self.level_capacity = capacity;
        self
    }

    pub fn with_max_orders(mut self, limit: usize) -> Self {
        self.max_orders = Some(limit);
        self
    }

    pub fn with_max_levels_per_side(mut self, limit: usize) -> Self {
        self.max_levels_per_side = Some(limit);
        self
    }

    pub fn with_reject_crossed(mut self, reject: bool) -> Self {
        self.reject_crossed = reject;
        self
    }

    /// Check that limits are non-zero and capacities fit inside them.
    pub fn validate(&self) -> BookResult<()> {
        if let Some(limit) = self.max_orders {
            if limit == 0 {
                return Err(BookError::InvalidConfig("max_orders must be positive".into()));
            }
            if self.order_capacity > limit {
                return Err(BookError::InvalidConfig(format!(
                    "order_capacity {} exceeds max_orders {}",
                    self.order_capacity, limit
                )));
            }
        }
        if let Some(limit) = self.max_levels_per_side {
            if limit == 0 {
                return Err(BookError::InvalidConfig("max_levels_per_side must be positive".into()));
            }
            if self.level_capacity > limit {
                return Err(BookError::InvalidConfig(format!(
                    "level_capacity {} exceeds max_levels_per_side {}",
                    self.level_capacity, limit
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = BookConfig::default();
        assert!(config.validate().is_ok());
        assert!(!config.reject_crossed);
        assert!(config.max_orders.is_none());
    }

    #[test]
    fn test_builder() {
        let config = BookConfig::default()
            .with_order_capacity(10)
            .with_level_capacity(4)
            .with_max_orders(100)
            .with_max_levels_per_side(8)
            .with_reject_crossed(true);

        assert_eq!(config.order_capacity, 10);
        assert_eq!(config.level_capacity, 4);
        assert_eq!(config.max_orders, Some(100));
        assert_eq!(config.max_levels_per_side, Some(8));
        assert!(config.reject_crossed);
    }

    #[test]
    fn test_validate_rejects_zero_limit() {
        let config = BookConfig::default().with_order_capacity(0).with_max_orders(0);
        assert!(matches!(config.validate(), Err(BookError::InvalidConfig(_))));
    }

    #[test]
    fn test_validate_rejects_capacity_over_limit() {
        let config = BookConfig::default().with_level_capacity(64).with_max_levels_per_side(16);
        assert!(matches!(config.validate(), Err(BookError::InvalidConfig(_))));
    }
}
