//! Core data types for the limit book
//!
//! ## Types
//!
//! - [`Order`]: A limit order as submitted and as it rests in the book
//! - [`Side`]: Buy or Sell
//! - [`OrderStatus`]: Lifecycle state of an order
//! - [`BookError`] / [`IntegrityError`]: Error taxonomy
//!
//! ## Fixed-Point Arithmetic
//!
//! All prices and quantities are stored as `u64` scaled by 10^8.
//! Example: 100.25 is stored as 10_025_000_000u64

mod order;
mod error;
pub mod clock;
pub mod price;

pub use order::{Order, OrderStatus, Side};
pub use error::{BookError, BookResult, IntegrityError, Resource};
