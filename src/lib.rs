//! # Tickbook
//!
//! An in-memory limit order book for a single instrument: a matching engine
//! with price-time (FIFO) priority, O(1) cancel/modify, and constant-time
//! top-of-book queries.
//!
//! ## Design Principles
//!
//! - **Single-Writer**: one thread owns the book exclusively (no locks)
//! - **Integer ticks**: `i64` prices, no floating point on the hot path
//! - **Arena allocation**: order records live in a slab of 64-byte nodes
//!   addressed by `u32` handles; cancel splices intrusive queue links
//! - **Incremental best-price caches**: top-of-book reads are field loads
//!
//! ## Architecture
//!
//! ```text
//! add_order ──> cross opposite ladder ──> rest residue in own ladder
//!                      │                          │
//!                  Fill events              identity map (id -> slot)
//! cancel/modify ──────────────────────────────────┘
//! ```

pub mod arena;
mod matching;
pub mod order_book;
pub mod price_level;
pub mod types;

// Re-exports for convenience
pub use arena::{Arena, ArenaIndex, OrderNode, NULL_INDEX};
pub use order_book::OrderBook;
pub use price_level::PriceLevel;
pub use types::{
    AddResult, BookError, BookSnapshot, Fill, LevelView, OrderId, Price, Quantity, Result, Side,
    Timestamp,
};
