//! Admission and crossing: the matching half of `OrderBook`.
//!
//! An incoming order first crosses against the opposite ladder while it is
//! marketable, consuming resting orders from each level's head; any residue
//! then rests in the same-side ladder. Every fill executes at the resting
//! order's limit price.

use crate::arena::NULL_INDEX;
use crate::order_book::OrderBook;
use crate::types::{AddResult, BookError, Fill, Price, Quantity, Result, Side};

impl OrderBook {
    /// Admit a limit order.
    ///
    /// Assigns the next monotonic id, matches against the opposite side
    /// under price-time priority, and rests any unfilled remainder at the
    /// tail of its price level. Fills are returned in execution order:
    /// improving opposite prices first, FIFO within a level.
    ///
    /// A zero quantity is rejected with no state mutation (no id is
    /// consumed).
    pub fn add_order(&mut self, price: Price, quantity: Quantity, side: Side) -> Result<AddResult> {
        if quantity == 0 {
            return Err(BookError::InvalidQuantity);
        }

        let order_id = self.next_order_id;
        self.next_order_id += 1;

        let mut fills = Vec::new();
        let remaining = self.cross(order_id, price, quantity, side, &mut fills);

        if remaining > 0 {
            self.rest(order_id, price, side, remaining, quantity);
        }

        Ok(AddResult {
            order_id,
            fills,
            remaining_quantity: remaining,
        })
    }

    /// Consume opposite-side liquidity while the incoming order is
    /// marketable. Returns the quantity left unfilled.
    fn cross(
        &mut self,
        taker_id: u64,
        limit: Price,
        quantity: Quantity,
        side: Side,
        fills: &mut Vec<Fill>,
    ) -> Quantity {
        let maker_side = side.opposite();
        let mut remaining = quantity;

        while remaining > 0 {
            let Some(level_price) = self.best_opposite(side) else {
                break;
            };

            let marketable = match side {
                Side::Buy => limit >= level_price,
                Side::Sell => limit <= level_price,
            };
            if !marketable {
                break;
            }

            remaining = self.fill_at_level(taker_id, side, level_price, remaining, fills);

            let drained = match maker_side {
                Side::Buy => self.bids.get(&level_price),
                Side::Sell => self.asks.get(&level_price),
            }
            .map_or(true, |level| level.is_empty());

            if drained {
                self.remove_level(maker_side, level_price);
            }
        }

        remaining
    }

    /// Match against the FIFO queue at one opposite-side level until either
    /// the incoming order or the level is exhausted.
    fn fill_at_level(
        &mut self,
        taker_id: u64,
        taker_side: Side,
        level_price: Price,
        mut remaining: Quantity,
        fills: &mut Vec<Fill>,
    ) -> Quantity {
        let maker_side = taker_side.opposite();

        while remaining > 0 {
            let ladder = match maker_side {
                Side::Buy => &mut self.bids,
                Side::Sell => &mut self.asks,
            };
            let Some(level) = ladder.get_mut(&level_price) else {
                break;
            };

            let maker_index = level.front();
            if maker_index == NULL_INDEX {
                break;
            }

            let maker = self.arena.get(maker_index);
            let maker_id = maker.id;
            let maker_remaining = maker.remaining;

            let quantity = remaining.min(maker_remaining);
            fills.push(match taker_side {
                Side::Buy => Fill {
                    buy_order_id: taker_id,
                    sell_order_id: maker_id,
                    price: level_price,
                    quantity,
                },
                Side::Sell => Fill {
                    buy_order_id: maker_id,
                    sell_order_id: taker_id,
                    price: level_price,
                    quantity,
                },
            });

            remaining -= quantity;

            if quantity == maker_remaining {
                // Resting order fully filled: unlink, drop from the
                // identity map, and recycle the slot before returning.
                level.pop_front(&mut self.arena);
                self.orders.remove(&maker_id);
                self.arena.release(maker_index);
            } else {
                self.arena.get_mut(maker_index).remaining = maker_remaining - quantity;
                let ladder = match maker_side {
                    Side::Buy => &mut self.bids,
                    Side::Sell => &mut self.asks,
                };
                if let Some(level) = ladder.get_mut(&level_price) {
                    level.adjust_volume(-(quantity as i64));
                }
            }
        }

        remaining
    }
}
