//! Per-operation latency report.
//!
//! Pins the measurement thread, warms up the book and the branch
//! predictor, then samples each public operation a million times into an
//! HDR histogram. Prints a percentile table and optionally writes it as
//! CSV: `latency_report [output.csv]`.

use hdrhistogram::Histogram;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::time::Instant;
use tickbook::{OrderBook, Price, Quantity, Side};

const ITERATIONS: u64 = 1_000_000;
const WARMUP_OPS: u64 = 100_000;

struct Case {
    name: &'static str,
    histogram: Histogram<u64>,
}

impl Case {
    fn new(name: &'static str) -> Self {
        Self {
            name,
            histogram: Histogram::new_with_bounds(1, 10_000_000, 3)
                .expect("histogram bounds are static"),
        }
    }

    fn record(&mut self, nanos: u64) {
        self.histogram.record(nanos.max(1)).unwrap_or(());
    }

    fn row(&self) -> String {
        let h = &self.histogram;
        format!(
            "{},{:.0},{},{},{},{},{}",
            self.name,
            h.mean(),
            h.value_at_quantile(0.50),
            h.value_at_quantile(0.90),
            h.value_at_quantile(0.99),
            h.value_at_quantile(0.999),
            h.max()
        )
    }

    fn print(&self) {
        let h = &self.histogram;
        println!(
            "{:<16} mean={:>7.0}  p50={:>6}  p90={:>6}  p99={:>6}  p99.9={:>7}  max={:>8}",
            self.name,
            h.mean(),
            h.value_at_quantile(0.50),
            h.value_at_quantile(0.90),
            h.value_at_quantile(0.99),
            h.value_at_quantile(0.999),
            h.max()
        );
    }
}

/// Pin to the last core; it is the one most often isolated from OS noise.
fn pin_thread() {
    if let Some(core_ids) = core_affinity::get_core_ids() {
        if let Some(last) = core_ids.last() {
            if core_affinity::set_for_current(*last) {
                println!("Pinned to core {:?}", last.id);
                return;
            }
        }
    }
    println!("CPU pinning unavailable; results may be noisier");
}

fn random_order(rng: &mut ChaCha8Rng) -> (Price, Quantity, Side) {
    (
        rng.gen_range(9_900..10_100) * 100,
        rng.gen_range(1..500),
        if rng.gen_bool(0.5) { Side::Buy } else { Side::Sell },
    )
}

fn measure<F: FnMut()>(case: &mut Case, iterations: u64, mut op: F) {
    for _ in 0..iterations {
        let start = Instant::now();
        op();
        case.record(start.elapsed().as_nanos() as u64);
    }
}

fn main() {
    let csv_path = std::env::args().nth(1);

    pin_thread();

    let mut book = OrderBook::with_capacity(2_097_152);
    book.warm_up();

    // Train the branch predictor and fault in the ladder allocations.
    let mut rng = ChaCha8Rng::seed_from_u64(0xFEED_FACE);
    for _ in 0..WARMUP_OPS {
        let (price, qty, side) = random_order(&mut rng);
        book.add_order(price, qty, side).expect("warmup quantity > 0");
    }
    println!("Warmed up with {} ops ({} resting)\n", WARMUP_OPS, book.total_orders());

    let mut cases = Vec::new();

    // Resting add: bids far under the market.
    let mut case = Case::new("add_resting");
    measure(&mut case, ITERATIONS, || {
        std::hint::black_box(book.add_order(5_000, 10, Side::Buy).unwrap());
    });
    cases.push(case);

    // Crossing add: drain the warmup asks once, then consume and replenish
    // a single maker per sample.
    let mut case = Case::new("add_crossing");
    let sweep = book
        .add_order(2_000_000, Quantity::MAX / 2, Side::Buy)
        .unwrap();
    if sweep.remaining_quantity > 0 {
        book.cancel_order(sweep.order_id);
    }
    book.add_order(2_000_000, 10, Side::Sell).unwrap();
    measure(&mut case, ITERATIONS, || {
        let result = book.add_order(2_000_000, 10, Side::Buy).unwrap();
        std::hint::black_box(result);
        book.add_order(2_000_000, 10, Side::Sell).unwrap();
    });
    cases.push(case);

    // Cancel: every sample hits a live order.
    let mut case = Case::new("cancel");
    let cancel_ids: Vec<u64> = (0..ITERATIONS / 2)
        .map(|_| book.add_order(4_000, 10, Side::Buy).unwrap().order_id)
        .collect();
    let mut cancel_ids = cancel_ids.into_iter();
    measure(&mut case, ITERATIONS / 2, || {
        if let Some(id) = cancel_ids.next() {
            std::hint::black_box(book.cancel_order(id));
        }
    });
    cases.push(case);

    // Modify: flip one resting order's quantity in place.
    let modify_id = book.add_order(5_001, 100, Side::Buy).unwrap().order_id;
    let mut case = Case::new("modify");
    let mut qty = 100u64;
    measure(&mut case, ITERATIONS, || {
        qty = if qty == 100 { 150 } else { 100 };
        std::hint::black_box(book.modify_order(modify_id, qty));
    });
    cases.push(case);

    // Reads.
    let mut case = Case::new("best_bid");
    measure(&mut case, ITERATIONS, || {
        std::hint::black_box(book.best_bid());
    });
    cases.push(case);

    let mut case = Case::new("spread");
    measure(&mut case, ITERATIONS, || {
        std::hint::black_box(book.spread());
    });
    cases.push(case);

    let mut case = Case::new("snapshot_d10");
    measure(&mut case, ITERATIONS / 10, || {
        std::hint::black_box(book.snapshot(10));
    });
    cases.push(case);

    println!("=== Latency Report (ns) ===");
    for case in &cases {
        case.print();
    }

    if let Some(path) = csv_path {
        let file = File::create(&path).expect("create csv output");
        let mut out = BufWriter::new(file);
        writeln!(out, "case,mean,p50,p90,p99,p999,max").expect("write csv header");
        for case in &cases {
            writeln!(out, "{}", case.row()).expect("write csv row");
        }
        out.flush().expect("flush csv output");
        println!("\nWrote {}", path);
    }
}
