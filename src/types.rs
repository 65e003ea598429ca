//! Boundary types for the order book.
//!
//! Everything the engine accepts or returns is defined here: the side
//! enumeration, the integer id/price/quantity aliases, fills, the result of
//! an admission, snapshot views, and the error taxonomy.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unique order identifier. Assigned by the book, starts at 1, strictly
/// increasing, never reused.
pub type OrderId = u64;

/// Limit price in integer ticks. Tick-size scaling is the caller's
/// responsibility; the matching path never touches floating point.
pub type Price = i64;

/// Order quantity.
pub type Quantity = u64;

/// Entry time in nanoseconds relative to the book's creation.
pub type Timestamp = u64;

/// Order side.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Side {
    Buy = 0,
    Sell = 1,
}

impl Side {
    /// Returns the side an incoming order matches against.
    #[inline]
    pub const fn opposite(self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

/// A single pairwise execution between an incoming and a resting order.
///
/// The execution price is always the resting order's limit; price
/// improvement flows to the aggressor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fill {
    pub buy_order_id: OrderId,
    pub sell_order_id: OrderId,
    pub price: Price,
    pub quantity: Quantity,
}

/// Outcome of a successful `add_order` call.
///
/// `order_id` is the id assigned to the incoming order, returned even when
/// the order fully filled on entry (so the caller can correlate fills).
/// `remaining_quantity` is zero iff the order is not resting.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AddResult {
    pub order_id: OrderId,
    pub fills: Vec<Fill>,
    pub remaining_quantity: Quantity,
}

/// Aggregate view of one price level, as reported by `snapshot`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelView {
    pub price: Price,
    pub quantity: Quantity,
    pub order_count: u32,
}

/// Top-of-book depth view: the best `depth` levels per side, bids in
/// descending price order, asks ascending.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookSnapshot {
    pub bids: Vec<LevelView>,
    pub asks: Vec<LevelView>,
}

/// Errors reported by the engine. Degenerate inputs are rejected without
/// any state mutation; lookups that miss (`cancel_order`/`modify_order` on
/// an unknown id) are expected outcomes and return `false` instead.
#[derive(Error, Clone, Copy, Debug, PartialEq, Eq)]
pub enum BookError {
    #[error("order quantity must be positive")]
    InvalidQuantity,
}

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, BookError>;
