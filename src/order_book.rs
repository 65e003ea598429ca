//! The central limit order book.
//!
//! Owns the two price ladders, the order arena, the id->order identity map,
//! and the cached best prices. Ladders are `BTreeMap`s keyed by price
//! (ascending storage; bids are read from the back), which gives O(log M)
//! level insertion, O(log M) removal, and in-order traversal for snapshots.
//! The identity map points straight at an order's arena slot and its parent
//! level key, so cancel and modify are O(1).

use rustc_hash::FxHashMap;
use std::collections::BTreeMap;
use std::time::Instant;

use crate::arena::{Arena, ArenaIndex};
use crate::price_level::PriceLevel;
use crate::types::{BookSnapshot, LevelView, OrderId, Price, Quantity, Side};

/// Non-owning handle to a resting order: its arena slot plus the (side,
/// price) key of the level that owns it. Valid exactly while the order's id
/// is in the identity map.
#[derive(Clone, Copy, Debug)]
pub struct OrderLoc {
    pub index: ArenaIndex,
    pub side: Side,
    pub price: Price,
}

/// Price-time priority limit order book for a single instrument.
pub struct OrderBook {
    pub(crate) bids: BTreeMap<Price, PriceLevel>,
    pub(crate) asks: BTreeMap<Price, PriceLevel>,
    pub(crate) arena: Arena,
    pub(crate) orders: FxHashMap<OrderId, OrderLoc>,
    pub(crate) best_bid: Option<Price>,
    pub(crate) best_ask: Option<Price>,
    pub(crate) next_order_id: OrderId,
    epoch: Instant,
}

impl OrderBook {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create a book with the arena and identity map pre-sized for
    /// `orders` resting orders.
    pub fn with_capacity(orders: u32) -> Self {
        Self {
            bids: BTreeMap::new(),
            asks: BTreeMap::new(),
            arena: Arena::with_capacity(orders),
            orders: FxHashMap::with_capacity_and_hasher(orders as usize, Default::default()),
            best_bid: None,
            best_ask: None,
            next_order_id: 1,
            epoch: Instant::now(),
        }
    }

    // ========================================================================
    // Top-of-book queries
    // ========================================================================

    /// Highest resting buy price.
    #[inline]
    pub fn best_bid(&self) -> Option<Price> {
        self.best_bid
    }

    /// Lowest resting sell price.
    #[inline]
    pub fn best_ask(&self) -> Option<Price> {
        self.best_ask
    }

    /// `best_ask - best_bid` when both sides exist.
    #[inline]
    pub fn spread(&self) -> Option<Price> {
        match (self.best_bid, self.best_ask) {
            (Some(bid), Some(ask)) => Some(ask - bid),
            _ => None,
        }
    }

    /// Integer midpoint of the best prices, truncating toward zero.
    #[inline]
    pub fn mid_price(&self) -> Option<Price> {
        match (self.best_bid, self.best_ask) {
            (Some(bid), Some(ask)) => Some((bid + ask) / 2),
            _ => None,
        }
    }

    /// Aggregate quantity at the best bid, 0 when the side is empty.
    #[inline]
    pub fn bid_quantity_at_top(&self) -> Quantity {
        self.bids.last_key_value().map_or(0, |(_, l)| l.volume())
    }

    /// Aggregate quantity at the best ask, 0 when the side is empty.
    #[inline]
    pub fn ask_quantity_at_top(&self) -> Quantity {
        self.asks.first_key_value().map_or(0, |(_, l)| l.volume())
    }

    /// Best price on the side an order of side `side` matches against.
    #[inline]
    pub(crate) fn best_opposite(&self, side: Side) -> Option<Price> {
        match side {
            Side::Buy => self.best_ask,
            Side::Sell => self.best_bid,
        }
    }

    // ========================================================================
    // Counts and depth
    // ========================================================================

    /// Number of live bid price levels.
    pub fn bid_levels(&self) -> usize {
        self.bids.len()
    }

    /// Number of live ask price levels.
    pub fn ask_levels(&self) -> usize {
        self.asks.len()
    }

    /// Number of resting orders across both sides.
    pub fn total_orders(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// The best `depth` levels per side: bids descending, asks ascending.
    pub fn snapshot(&self, depth: usize) -> BookSnapshot {
        let bids = self
            .bids
            .iter()
            .rev()
            .take(depth)
            .map(|(&price, level)| LevelView {
                price,
                quantity: level.volume(),
                order_count: level.count(),
            })
            .collect();

        let asks = self
            .asks
            .iter()
            .take(depth)
            .map(|(&price, level)| LevelView {
                price,
                quantity: level.volume(),
                order_count: level.count(),
            })
            .collect();

        BookSnapshot { bids, asks }
    }

    // ========================================================================
    // Order lifecycle
    // ========================================================================

    /// Remove a resting order. Returns `false` without mutation when the id
    /// is unknown, already filled, or already cancelled.
    pub fn cancel_order(&mut self, order_id: OrderId) -> bool {
        let Some(loc) = self.orders.remove(&order_id) else {
            return false;
        };

        let ladder = match loc.side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        };

        if let Some(level) = ladder.get_mut(&loc.price) {
            if level.unlink(&mut self.arena, loc.index) {
                ladder.remove(&loc.price);
                self.refresh_best_after_removal(loc.side, loc.price);
            }
        }

        self.arena.release(loc.index);
        true
    }

    /// Overwrite a resting order's remaining (and original) quantity in
    /// place. Queue position is preserved so size reductions stay cheap;
    /// `new_quantity == 0` degenerates to cancel. Returns `false` without
    /// mutation when the id is unknown.
    pub fn modify_order(&mut self, order_id: OrderId, new_quantity: Quantity) -> bool {
        if new_quantity == 0 {
            return self.cancel_order(order_id);
        }

        let Some(&loc) = self.orders.get(&order_id) else {
            return false;
        };

        let node = self.arena.get_mut(loc.index);
        let delta = new_quantity as i64 - node.remaining as i64;
        node.remaining = new_quantity;
        node.original = new_quantity;

        let ladder = match loc.side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        };
        if let Some(level) = ladder.get_mut(&loc.price) {
            level.adjust_volume(delta);
        }

        true
    }

    /// Rest residue at the tail of its same-side level, creating the level
    /// on demand, and register the order in the identity map.
    pub(crate) fn rest(
        &mut self,
        order_id: OrderId,
        price: Price,
        side: Side,
        remaining: Quantity,
        original: Quantity,
    ) {
        let index = self.arena.alloc();
        let entry_time = self.epoch.elapsed().as_nanos() as u64;

        let node = self.arena.get_mut(index);
        node.id = order_id;
        node.side = side;
        node.price = price;
        node.remaining = remaining;
        node.original = original;
        node.entry_time = entry_time;

        let ladder = match side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        };
        ladder
            .entry(price)
            .or_insert_with(PriceLevel::new)
            .push_back(&mut self.arena, index);

        self.orders.insert(order_id, OrderLoc { index, side, price });

        match side {
            Side::Buy => {
                if self.best_bid.map_or(true, |best| price > best) {
                    self.best_bid = Some(price);
                }
            }
            Side::Sell => {
                if self.best_ask.map_or(true, |best| price < best) {
                    self.best_ask = Some(price);
                }
            }
        }
    }

    /// Tear an emptied level out of its ladder and repair the best-price
    /// cache from the ladder extremum if the top just vanished.
    pub(crate) fn remove_level(&mut self, side: Side, price: Price) {
        match side {
            Side::Buy => {
                self.bids.remove(&price);
            }
            Side::Sell => {
                self.asks.remove(&price);
            }
        }
        self.refresh_best_after_removal(side, price);
    }

    fn refresh_best_after_removal(&mut self, side: Side, removed_price: Price) {
        match side {
            Side::Buy => {
                if self.best_bid == Some(removed_price) {
                    self.best_bid = self.bids.last_key_value().map(|(&p, _)| p);
                }
            }
            Side::Sell => {
                if self.best_ask == Some(removed_price) {
                    self.best_ask = self.asks.first_key_value().map(|(&p, _)| p);
                }
            }
        }
    }

    // ========================================================================
    // Maintenance
    // ========================================================================

    /// Pre-fault the arena's pages. Startup-only routine for latency
    /// harnesses.
    pub fn warm_up(&mut self) {
        self.arena.warm_up();
    }

    /// Drop every resting order and level. Id assignment keeps running;
    /// ids are never reused for the lifetime of the book.
    pub fn clear(&mut self) {
        self.bids.clear();
        self.asks.clear();
        self.orders.clear();
        self.best_bid = None;
        self.best_ask = None;
        self.arena = Arena::with_capacity(self.arena.capacity());
    }
}

impl Default for OrderBook {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for OrderBook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderBook")
            .field("best_bid", &self.best_bid)
            .field("best_ask", &self.best_ask)
            .field("bid_levels", &self.bids.len())
            .field("ask_levels", &self.asks.len())
            .field("total_orders", &self.orders.len())
            .finish()
    }
}
