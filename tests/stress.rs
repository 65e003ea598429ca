//! Stress tests: churn, contention at a single price, slab reuse, and
//! aggregate invariants under large randomized workloads.

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use tickbook::{OrderBook, Quantity, Side};

// ============================================================================
// Contention at a single price
// ============================================================================

#[test]
fn test_thousand_orders_one_level() {
    let mut book = OrderBook::with_capacity(2_048);
    const ORDERS: u64 = 1_000;

    for _ in 0..ORDERS {
        book.add_order(10_000, 100, Side::Sell).unwrap();
    }
    assert_eq!(book.total_orders(), ORDERS as usize);
    assert_eq!(book.ask_levels(), 1);
    assert_eq!(book.ask_quantity_at_top(), ORDERS * 100);

    // One aggressor sweeps the whole level.
    let result = book.add_order(10_000, ORDERS * 100, Side::Buy).unwrap();
    assert_eq!(result.fills.len(), ORDERS as usize);
    assert_eq!(result.remaining_quantity, 0);
    assert_eq!(book.total_orders(), 0);
    assert_eq!(book.ask_levels(), 0);
}

#[test]
fn test_fifo_order_under_contention() {
    let mut book = OrderBook::with_capacity(256);
    let mut ids = Vec::new();

    for _ in 0..100 {
        ids.push(book.add_order(10_000, 10, Side::Sell).unwrap().order_id);
    }

    // Consume exactly half; makers must fill oldest-first.
    let result = book.add_order(10_000, 500, Side::Buy).unwrap();
    assert_eq!(result.fills.len(), 50);
    for (fill, expected) in result.fills.iter().zip(ids.iter()) {
        assert_eq!(fill.sell_order_id, *expected);
    }
    assert_eq!(book.total_orders(), 50);
}

// ============================================================================
// Rapid churn
// ============================================================================

#[test]
fn test_add_cancel_cycles() {
    let mut book = OrderBook::with_capacity(16);
    const CYCLES: usize = 10_000;

    for cycle in 0..CYCLES {
        let side = if cycle % 2 == 0 { Side::Buy } else { Side::Sell };
        let id = book.add_order(10_000, 100, side).unwrap().order_id;
        assert!(book.cancel_order(id));
    }

    assert_eq!(book.total_orders(), 0);
    assert_eq!(book.bid_levels(), 0);
    assert_eq!(book.ask_levels(), 0);
}

#[test]
fn test_match_cycles_leave_empty_book() {
    let mut book = OrderBook::with_capacity(16);
    const CYCLES: usize = 5_000;
    let mut fills = 0usize;

    for _ in 0..CYCLES {
        book.add_order(10_000, 100, Side::Sell).unwrap();
        let result = book.add_order(10_000, 100, Side::Buy).unwrap();
        fills += result.fills.len();
    }

    assert_eq!(fills, CYCLES);
    assert_eq!(book.total_orders(), 0);
}

#[test]
fn test_slab_reuse_after_mass_cancel() {
    const ORDERS: u64 = 1_000;
    let mut book = OrderBook::with_capacity(ORDERS as u32);

    let mut ids = Vec::new();
    for i in 0..ORDERS {
        let price = if i % 2 == 0 { 9_000 + (i as i64 % 400) } else { 12_000 + (i as i64 % 400) };
        let side = if i % 2 == 0 { Side::Buy } else { Side::Sell };
        ids.push(book.add_order(price, 100, side).unwrap().order_id);
    }
    assert_eq!(book.total_orders(), ORDERS as usize);

    for id in ids {
        assert!(book.cancel_order(id));
    }
    assert_eq!(book.total_orders(), 0);

    // The freed slots absorb a second full load without growing pain.
    for _ in 0..ORDERS {
        book.add_order(10_000, 100, Side::Buy).unwrap();
    }
    assert_eq!(book.total_orders(), ORDERS as usize);
}

// ============================================================================
// Boundary values
// ============================================================================

#[test]
fn test_extreme_prices_rest_and_order() {
    let mut book = OrderBook::new();
    book.add_order(i64::MIN + 1, 10, Side::Buy).unwrap();
    book.add_order(i64::MAX - 1, 10, Side::Sell).unwrap();

    assert_eq!(book.best_bid(), Some(i64::MIN + 1));
    assert_eq!(book.best_ask(), Some(i64::MAX - 1));
    assert_eq!(book.total_orders(), 2);
}

#[test]
fn test_quantity_one_full_cycle() {
    let mut book = OrderBook::new();
    book.add_order(10_000, 1, Side::Sell).unwrap();
    let result = book.add_order(10_000, 1, Side::Buy).unwrap();

    assert_eq!(result.fills.len(), 1);
    assert_eq!(result.fills[0].quantity, 1);
    assert!(book.total_orders() == 0);
}

#[test]
fn test_many_sparse_levels() {
    let mut book = OrderBook::with_capacity(16_384);
    const LEVELS: i64 = 10_000;

    for i in 0..LEVELS {
        book.add_order(i * 1_000, 100, Side::Buy).unwrap();
    }

    assert_eq!(book.bid_levels(), LEVELS as usize);
    assert_eq!(book.best_bid(), Some((LEVELS - 1) * 1_000));

    let snap = book.snapshot(5);
    assert_eq!(snap.bids.len(), 5);
    assert_eq!(snap.bids[0].price, (LEVELS - 1) * 1_000);
}

// ============================================================================
// Randomized workload with invariant audit
// ============================================================================

/// Re-derive the aggregate counters from a full-depth snapshot and check
/// them against the O(1) queries.
fn audit(book: &OrderBook) {
    let snap = book.snapshot(usize::MAX);

    let counted: u32 = snap
        .bids
        .iter()
        .chain(snap.asks.iter())
        .map(|l| l.order_count)
        .sum();
    assert_eq!(counted as usize, book.total_orders());

    assert_eq!(snap.bids.len(), book.bid_levels());
    assert_eq!(snap.asks.len(), book.ask_levels());

    assert_eq!(snap.bids.first().map(|l| l.price), book.best_bid());
    assert_eq!(snap.asks.first().map(|l| l.price), book.best_ask());
    assert_eq!(snap.bids.first().map_or(0, |l| l.quantity), book.bid_quantity_at_top());
    assert_eq!(snap.asks.first().map_or(0, |l| l.quantity), book.ask_quantity_at_top());

    // Bids strictly descending, asks strictly ascending, top uncrossed.
    assert!(snap.bids.windows(2).all(|w| w[0].price > w[1].price));
    assert!(snap.asks.windows(2).all(|w| w[0].price < w[1].price));
    if let (Some(bid), Some(ask)) = (book.best_bid(), book.best_ask()) {
        assert!(bid < ask, "book crossed at rest: {} >= {}", bid, ask);
    }

    // No empty levels survive.
    assert!(snap.bids.iter().all(|l| l.order_count > 0 && l.quantity > 0));
    assert!(snap.asks.iter().all(|l| l.order_count > 0 && l.quantity > 0));
}

#[test]
fn test_large_random_workload_preserves_invariants() {
    const SEED: u64 = 0xABCD_EF12_3456;
    const OPS: usize = 50_000;

    let mut rng = ChaCha8Rng::seed_from_u64(SEED);
    let mut book = OrderBook::with_capacity(65_536);
    let mut resting: Vec<u64> = Vec::new();
    let mut traded: Quantity = 0;

    for i in 0..OPS {
        let roll = rng.gen_range(0..100);

        if resting.is_empty() || roll < 60 {
            let side = if rng.gen_bool(0.5) { Side::Buy } else { Side::Sell };
            let price = rng.gen_range(9_000..11_000) * 100;
            let qty = rng.gen_range(1..500);

            let result = book.add_order(price, qty, side).unwrap();
            traded += result.fills.iter().map(|f| f.quantity).sum::<Quantity>();
            if result.remaining_quantity > 0 {
                resting.push(result.order_id);
            }
        } else if roll < 90 {
            let idx = rng.gen_range(0..resting.len());
            book.cancel_order(resting.swap_remove(idx));
        } else {
            let idx = rng.gen_range(0..resting.len());
            book.modify_order(resting[idx], rng.gen_range(1..500));
        }

        if i % 1_000 == 0 {
            audit(&book);
        }
    }

    audit(&book);
    assert!(traded > 0);
}
