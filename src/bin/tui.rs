//! Live depth viewer.
//!
//! Feeds a randomized flow of limit orders around the mid into the book
//! and renders the top of each ladder as quantity bars, together with
//! running totals. Everything runs on one thread, matching the engine's
//! single-writer model: each frame is one burst of orders followed by one
//! snapshot. Press `q` to quit.

use crossterm::{
    event::{self, Event, KeyCode},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph},
};
use std::io;
use std::time::Duration;
use tickbook::{BookSnapshot, LevelView, OrderBook, Side};

const DEPTH: usize = 15;
const ORDERS_PER_FRAME: usize = 200;
const BAR_WIDTH: usize = 20;

struct Feed {
    rng: ChaCha8Rng,
    resting: Vec<u64>,
    trades: u64,
    traded_quantity: u64,
}

impl Feed {
    fn new() -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(0x0DDB_A11),
            resting: Vec::new(),
            trades: 0,
            traded_quantity: 0,
        }
    }

    /// One frame's worth of flow: mostly adds near the mid, some cancels.
    fn pump(&mut self, book: &mut OrderBook) {
        let mid = book.mid_price().unwrap_or(1_000_000);

        for _ in 0..ORDERS_PER_FRAME {
            if !self.resting.is_empty() && self.rng.gen_bool(0.3) {
                let idx = self.rng.gen_range(0..self.resting.len());
                let id = self.resting.swap_remove(idx);
                book.cancel_order(id);
                continue;
            }

            let side = if self.rng.gen_bool(0.5) { Side::Buy } else { Side::Sell };
            let offset = self.rng.gen_range(-40..=40);
            let price = mid + offset * 25;
            let quantity = self.rng.gen_range(1..500);

            if let Ok(result) = book.add_order(price, quantity, side) {
                self.trades += result.fills.len() as u64;
                self.traded_quantity += result.fills.iter().map(|f| f.quantity).sum::<u64>();
                if result.remaining_quantity > 0 {
                    self.resting.push(result.order_id);
                }
            }
        }
    }
}

fn level_bars(levels: &[LevelView], align_right: bool) -> String {
    let max_quantity = levels.iter().map(|l| l.quantity).max().unwrap_or(1).max(1);
    let mut out = String::new();

    for level in levels {
        let bar_len = ((level.quantity as f64 / max_quantity as f64) * BAR_WIDTH as f64) as usize;
        let bar = "█".repeat(bar_len.max(1));
        let price = format!("{:.2}", level.price as f64 / 100.0);

        let line = if align_right {
            format!("{:>10}  {:<22} {:>6}\n", price, bar, level.quantity)
        } else {
            format!("{:>6} {:>22}  {:<10}\n", level.quantity, bar, price)
        };
        out.push_str(&line);
    }

    out
}

fn draw(frame: &mut Frame, book: &OrderBook, snapshot: &BookSnapshot, feed: &Feed) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(5)])
        .split(frame.size());

    let spread = book
        .spread()
        .map_or_else(|| "-".to_string(), |s| format!("{}", s));
    let mid = book
        .mid_price()
        .map_or_else(|| "-".to_string(), |m| format!("{:.2}", m as f64 / 100.0));
    let header = Paragraph::new(format!(
        " mid {}  spread {}  orders {}  levels {}/{}  trades {}  traded qty {}",
        mid,
        spread,
        book.total_orders(),
        book.bid_levels(),
        book.ask_levels(),
        feed.trades,
        feed.traded_quantity,
    ))
    .block(Block::default().borders(Borders::ALL).title(" tickbook "));
    frame.render_widget(header, rows[0]);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[1]);

    let bids = Paragraph::new(level_bars(&snapshot.bids, false))
        .style(Style::default().fg(Color::Green))
        .block(Block::default().borders(Borders::ALL).title(" Bids "));
    frame.render_widget(bids, columns[0]);

    let asks = Paragraph::new(level_bars(&snapshot.asks, true))
        .style(Style::default().fg(Color::Red))
        .block(Block::default().borders(Borders::ALL).title(" Asks "));
    frame.render_widget(asks, columns[1]);
}

fn main() -> io::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut book = OrderBook::with_capacity(1_048_576);
    book.warm_up();

    // Seed both sides so the first frame has a mid to orbit.
    book.add_order(999_000, 500, Side::Buy).ok();
    book.add_order(1_001_000, 500, Side::Sell).ok();

    let mut feed = Feed::new();

    loop {
        feed.pump(&mut book);
        let snapshot = book.snapshot(DEPTH);
        terminal.draw(|frame| draw(frame, &book, &snapshot, &feed))?;

        if event::poll(Duration::from_millis(33))? {
            if let Event::Key(key) = event::read()? {
                if matches!(key.code, KeyCode::Char('q') | KeyCode::Esc) {
                    break;
                }
            }
        }
    }

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    Ok(())
}
