//! Demo seed data for a fresh store.
//!
//! Market data comes from the universe (quotes at base price, a synthetic
//! book, and a 100-point minute-spaced history ending one minute ago).
//! Account data is a fixed sample: one user, two positions, one resting
//! limit order and one active strategy.

use chrono::Utc;
use indexmap::IndexMap;
use market_core::{
    ChartHistory, ChartPoint, MarketSeed, Order, OrderStatus, OrderType, Position, PositionSide,
    PriceQuote, Side, Strategy, StrategyStatus, Symbol, User,
};
use rand::Rng;

use crate::generator::{synthesize_order_book, BOOK_DEPTH};
use crate::universe::Universe;

/// Points of history generated per symbol.
pub const SEED_HISTORY_POINTS: usize = 100;

/// Spacing of seeded history points.
pub const SEED_HISTORY_SPACING_MS: i64 = 60_000;

/// Largest relative step between neighbouring history points, either way.
const HISTORY_WALK: f64 = 0.001;

pub fn demo_seed<R: Rng + ?Sized>(universe: &Universe, rng: &mut R) -> MarketSeed {
    let now = Utc::now().timestamp_millis();

    let mut quotes = Vec::with_capacity(universe.len());
    let mut order_books = IndexMap::new();
    let mut chart_data = IndexMap::new();

    for instrument in universe.instruments() {
        let price = instrument.base_price;
        quotes.push(PriceQuote::new(
            instrument.symbol.clone(),
            price,
            (rng.gen::<f64>() - 0.5) * 10.0,
            rng.gen::<f64>() * 2_000_000_000.0,
        ));
        order_books.insert(
            instrument.symbol.clone(),
            synthesize_order_book(rng, price, instrument.tick_size, BOOK_DEPTH),
        );
        chart_data.insert(instrument.symbol.clone(), seed_history(rng, price, now));
    }

    MarketSeed {
        user: demo_user(),
        quotes,
        order_books,
        chart_data,
        positions: demo_positions(universe),
        orders: demo_orders(universe, now),
        strategies: demo_strategies(),
        selected_symbol: universe.symbols().first().cloned(),
    }
}

/// Walk backwards from `last_price` so the newest point sits at the quote.
fn seed_history<R: Rng + ?Sized>(rng: &mut R, last_price: f64, now: i64) -> ChartHistory {
    let mut points = Vec::with_capacity(SEED_HISTORY_POINTS);
    let mut price = last_price;
    for age in 1..=SEED_HISTORY_POINTS as i64 {
        points.push(ChartPoint {
            time: now - age * SEED_HISTORY_SPACING_MS,
            price,
        });
        price *= 1.0 + (rng.gen::<f64>() - 0.5) * HISTORY_WALK * 2.0;
    }
    points.reverse();
    ChartHistory::from_points(points)
}

fn demo_user() -> User {
    User {
        id: "1".to_string(),
        name: "John Trader".to_string(),
        email: "john@example.com".to_string(),
        balance: 50_000.0,
        avatar: None,
    }
}

fn demo_positions(universe: &Universe) -> Vec<Position> {
    let positions = vec![
        Position {
            id: "1".to_string(),
            symbol: Symbol::from("BTCUSDT"),
            side: PositionSide::Long,
            size: 0.5,
            entry_price: 42_800.0,
            mark_price: 43_250.5,
            pnl: 225.25,
            pnl_percent: 1.05,
            margin: 2_140.0,
            leverage: 10,
        },
        Position {
            id: "2".to_string(),
            symbol: Symbol::from("ETHUSDT"),
            side: PositionSide::Short,
            size: 2.0,
            entry_price: 2_680.0,
            mark_price: 2_650.75,
            pnl: 58.5,
            pnl_percent: 1.09,
            margin: 536.0,
            leverage: 5,
        },
    ];

    positions
        .into_iter()
        .filter(|p| universe.contains(p.symbol.as_str()))
        .collect()
}

fn demo_orders(universe: &Universe, now: i64) -> Vec<Order> {
    if !universe.contains("BTCUSDT") {
        return Vec::new();
    }

    vec![Order {
        id: "1".to_string(),
        symbol: Symbol::from("BTCUSDT"),
        side: Side::Buy,
        order_type: OrderType::Limit,
        quantity: 0.1,
        price: 43_000.0,
        status: OrderStatus::Open,
        filled: 0.0,
        timestamp: now - 300_000,
    }]
}

fn demo_strategies() -> Vec<Strategy> {
    vec![Strategy {
        id: "1".to_string(),
        name: "BTC Momentum Strategy".to_string(),
        status: StrategyStatus::Active,
        pnl: 1_250.75,
        trades: 23,
        win_rate: 65.2,
        description: "AI-powered momentum trading for Bitcoin".to_string(),
    }]
}
