// crates/market-core/tests/store_scenarios.rs
use indexmap::IndexMap;
use market_core::{
    BookLevel, ChartHistory, ChartInterval, ChartPoint, ConnectionStatus, MarketEvent, MarketSeed,
    MarketStore, OrderBook, OrderForm, OrderStatus, OrderType, Position, PositionSide,
    PositionUpdate, PriceQuote, Side, StoreError, Symbol, Theme, CHART_CAPACITY,
};

fn quotes() -> Vec<PriceQuote> {
    vec![
        PriceQuote::new("BTCUSDT", 43250.5, 1.5, 1_000_000.0),
        PriceQuote::new("ETHUSDT", 2650.75, -0.8, 500_000.0),
    ]
}

fn sample_position() -> Position {
    Position {
        id: "1".to_string(),
        symbol: Symbol::from("BTCUSDT"),
        side: PositionSide::Long,
        size: 0.5,
        entry_price: 42800.0,
        mark_price: 43250.5,
        pnl: 225.25,
        pnl_percent: 1.05,
        margin: 2140.0,
        leverage: 10,
    }
}

fn new_store() -> MarketStore {
    let mut seed = MarketSeed::from_quotes(quotes());
    seed.positions.push(sample_position());
    MarketStore::create(seed).expect("valid seed")
}

#[test]
fn create_fills_every_universe_symbol() {
    let store = new_store();

    for symbol in ["BTCUSDT", "ETHUSDT"] {
        assert!(store.quote(symbol).is_some());
        assert!(store.order_book(symbol).is_some());
        assert_eq!(store.chart(symbol).map(|c| c.len()), Some(1));
    }
    assert_eq!(store.selected_symbol(), "BTCUSDT");
    assert_eq!(store.ws_status(), ConnectionStatus::Disconnected);
    assert_eq!(store.state().chart_interval, ChartInterval::FifteenMinutes);
}

#[test]
fn create_rejects_bad_seeds() {
    let empty = MarketSeed::from_quotes(Vec::new());
    assert_eq!(MarketStore::create(empty).unwrap_err(), StoreError::EmptyUniverse);

    let bad = MarketSeed::from_quotes(vec![PriceQuote::new("BTCUSDT", 0.0, 0.0, 0.0)]);
    assert!(matches!(
        MarketStore::create(bad),
        Err(StoreError::InvalidPrice { .. })
    ));
}

#[test]
fn create_ignores_seed_data_outside_universe() {
    let mut seed = MarketSeed::from_quotes(quotes());
    seed.order_books.insert(Symbol::from("XRPUSDT"), OrderBook::default());
    seed.selected_symbol = Some(Symbol::from("XRPUSDT"));

    let store = MarketStore::create(seed).unwrap();
    assert!(store.order_book("XRPUSDT").is_none());
    assert_eq!(store.selected_symbol(), "BTCUSDT");
}

#[test]
fn update_price_sets_price_and_appends_chart_point() {
    let mut store = new_store();
    let before = store.chart("ETHUSDT").unwrap().last().copied().unwrap();

    store.update_price("ETHUSDT", 2700.0).unwrap();

    assert_eq!(store.quote("ETHUSDT").unwrap().price, 2700.0);
    let chart = store.chart("ETHUSDT").unwrap();
    let last = chart.last().unwrap();
    assert_eq!(last.price, 2700.0);
    assert!(last.time > before.time);
    assert_eq!(store.state().last_update, last.time);
}

#[test]
fn update_price_nudges_change_24h() {
    let mut store = new_store();

    // +1% move, amplified by 5.
    store.update_price("BTCUSDT", 43250.5 * 1.01).unwrap();
    let change = store.quote("BTCUSDT").unwrap().change_24h;
    assert!((change - (1.5 + 5.0 * 0.01)).abs() < 1e-9, "change = {}", change);

    // And back down: relative to the new price.
    let p = store.quote("BTCUSDT").unwrap().price;
    store.update_price("BTCUSDT", p * 0.98).unwrap();
    let change2 = store.quote("BTCUSDT").unwrap().change_24h;
    assert!((change2 - (change - 5.0 * 0.02)).abs() < 1e-9);
}

#[test]
fn update_price_rejects_invalid_input_without_change() {
    let mut store = new_store();
    let before = store.snapshot();

    for bad in [0.0, -1.0, f64::NAN, f64::INFINITY] {
        assert!(matches!(
            store.update_price("BTCUSDT", bad),
            Err(StoreError::InvalidPrice { .. })
        ));
    }
    assert_eq!(
        store.update_price("XRPUSDT", 1.0),
        Err(StoreError::UnknownSymbol(Symbol::from("XRPUSDT")))
    );

    assert_eq!(store.snapshot(), before);
}

#[test]
fn chart_history_is_capped_and_strictly_increasing() {
    let mut store = new_store();

    for i in 0..400 {
        store.update_price("BTCUSDT", 43000.0 + i as f64).unwrap();
        assert!(store.chart("BTCUSDT").unwrap().len() <= CHART_CAPACITY);
    }

    let chart = store.chart("BTCUSDT").unwrap();
    assert_eq!(chart.len(), CHART_CAPACITY);
    assert_eq!(chart.last().unwrap().price, 43399.0);
    // Oldest kept point is the 251st update (last 149 + newest).
    assert_eq!(chart.first().unwrap().price, 43250.0);

    let times: Vec<i64> = chart.iter().map(|p| p.time).collect();
    assert!(times.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn chart_history_from_points_keeps_newest_ordered_points() {
    let points = (0..200).map(|i| ChartPoint {
        time: i,
        price: i as f64,
    });
    let history = ChartHistory::from_points(points);
    assert_eq!(history.len(), CHART_CAPACITY);
    assert_eq!(history.first().unwrap().time, 50);

    let out_of_order = vec![
        ChartPoint { time: 10, price: 1.0 },
        ChartPoint { time: 5, price: 2.0 },
        ChartPoint { time: 11, price: 3.0 },
    ];
    let history = ChartHistory::from(out_of_order);
    assert_eq!(history.len(), 2);
}

#[test]
fn update_order_book_replaces_wholesale() {
    let mut store = new_store();
    let book = OrderBook::new(
        vec![BookLevel::new(100.0, 1.0, 100.0)],
        vec![BookLevel::new(101.0, 2.0, 202.0)],
    );

    store.update_order_book("BTCUSDT", book.clone()).unwrap();
    assert_eq!(store.order_book("BTCUSDT"), Some(&book));

    store.update_order_book("BTCUSDT", OrderBook::default()).unwrap();
    assert!(store.order_book("BTCUSDT").unwrap().is_empty());

    assert!(store.update_order_book("NOPE", OrderBook::default()).is_err());
}

#[test]
fn process_event_and_apply_tick_route_to_updates() {
    let mut store = new_store();

    store
        .process_event(MarketEvent::price("ETHUSDT", 2651.0))
        .unwrap();
    assert_eq!(store.quote("ETHUSDT").unwrap().price, 2651.0);

    let applied = store.apply_tick(vec![
        MarketEvent::price("BTCUSDT", 43300.0),
        MarketEvent::price("XRPUSDT", 1.0),
        MarketEvent::order_book("BTCUSDT", OrderBook::default()),
    ]);
    assert_eq!(applied, 2);
    assert_eq!(store.quote("BTCUSDT").unwrap().price, 43300.0);
}

#[test]
fn place_order_then_cancel() {
    let mut store = new_store();

    let order = store
        .place_order(OrderForm::new(
            "ETHUSDT",
            Side::Buy,
            OrderType::Market,
            1.0,
            2650.0,
        ))
        .unwrap();

    assert_eq!(order.symbol, "ETHUSDT");
    assert_eq!(order.status, OrderStatus::Open);
    assert_eq!(order.filled, 0.0);
    assert_eq!(store.orders().first().map(|o| o.id.as_str()), Some(order.id.as_str()));

    let removed = store.cancel_order(&order.id);
    assert_eq!(removed.as_ref().map(|o| &o.id), Some(&order.id));
    assert!(store.order(&order.id).is_none());
}

#[test]
fn order_ids_are_unique_and_newest_first() {
    let mut store = new_store();
    let form = OrderForm::new("BTCUSDT", Side::Sell, OrderType::Limit, 0.1, 44000.0);

    let ids: Vec<String> = (0..50)
        .map(|_| store.place_order(form.clone()).unwrap().id)
        .collect();

    let mut unique = ids.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), ids.len());
    assert_eq!(store.orders()[0].id, *ids.last().unwrap());
}

#[test]
fn cancel_missing_order_is_idempotent_noop() {
    let mut store = new_store();
    store
        .place_order(OrderForm::new("BTCUSDT", Side::Buy, OrderType::Limit, 0.1, 43000.0))
        .unwrap();
    let before = store.orders().to_vec();

    assert!(store.cancel_order("does-not-exist").is_none());
    assert_eq!(store.orders(), before.as_slice());
    assert!(store.cancel_order("does-not-exist").is_none());
    assert_eq!(store.orders(), before.as_slice());
}

#[test]
fn update_position_merges_fields() {
    let mut store = new_store();

    let update = PositionUpdate {
        mark_price: Some(44000.0),
        pnl: Some(600.0),
        ..PositionUpdate::default()
    };
    assert!(store.update_position("1", &update));

    let position = &store.positions()[0];
    assert_eq!(position.mark_price, 44000.0);
    assert_eq!(position.pnl, 600.0);
    assert_eq!(position.entry_price, 42800.0);
    assert_eq!(position.leverage, 10);

    let before = store.positions().to_vec();
    assert!(!store.update_position("404", &update));
    assert_eq!(store.positions(), before.as_slice());
}

#[test]
fn empty_position_update_changes_nothing() {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    let mut store = new_store();
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let _sub = store.subscribe(
        |s| s.positions.len(),
        |_: &usize, _: &usize| false,
        move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        },
    );

    let before = store.positions().to_vec();
    assert!(store.update_position("1", &PositionUpdate::default()));
    assert_eq!(store.positions(), before.as_slice());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn order_ids_do_not_overflow_past_largest_seed_id() {
    let mut seed = MarketSeed::from_quotes(quotes());
    let max_id = i64::MAX.to_string();
    seed.orders.push(
        OrderForm::new("BTCUSDT", Side::Buy, OrderType::Limit, 0.1, 43000.0)
            .into_order(max_id.clone(), 0),
    );
    let mut store = MarketStore::create(seed).unwrap();

    let order = store
        .place_order(OrderForm::new("ETHUSDT", Side::Sell, OrderType::Market, 1.0, 2650.0))
        .unwrap();
    assert_eq!(order.id, max_id);
}

#[test]
fn simple_setters_replace_state() {
    let mut store = new_store();

    store.set_selected_symbol("ETHUSDT").unwrap();
    store.set_chart_interval(ChartInterval::OneHour);
    store.set_theme(Theme::Light);

    assert_eq!(store.selected_symbol(), "ETHUSDT");
    assert_eq!(store.state().chart_interval, ChartInterval::OneHour);
    assert_eq!(store.state().theme, Theme::Light);

    assert!(store.set_selected_symbol("XRPUSDT").is_err());
    assert_eq!(store.selected_symbol(), "ETHUSDT");
}

#[test]
fn ws_status_overwrites() {
    let mut store = new_store();

    store.set_ws_status(ConnectionStatus::Connecting);
    store.set_ws_status(ConnectionStatus::Connected);
    assert_eq!(store.ws_status(), ConnectionStatus::Connected);

    // Off the state machine, still applied.
    store.set_ws_status(ConnectionStatus::Connecting);
    assert_eq!(store.ws_status(), ConnectionStatus::Connecting);
}

#[test]
fn status_state_machine() {
    use ConnectionStatus::*;

    assert!(Disconnected.can_transition_to(Connecting));
    assert!(Error.can_transition_to(Connecting));
    assert!(Connecting.can_transition_to(Connected));
    assert!(Connected.can_transition_to(Error));
    assert!(Connected.can_transition_to(Disconnected));
    assert!(Connecting.can_transition_to(Disconnected));
    assert!(Connected.can_transition_to(Connected));

    assert!(!Disconnected.can_transition_to(Connected));
    assert!(!Disconnected.can_transition_to(Error));
    assert!(!Connected.can_transition_to(Connecting));
}

#[test]
fn disposed_store_rejects_writes() {
    let mut store = new_store();
    store.dispose();
    let before = store.snapshot();

    assert_eq!(store.update_price("BTCUSDT", 1.0), Err(StoreError::Disposed));
    assert_eq!(
        store.place_order(OrderForm::new("BTCUSDT", Side::Buy, OrderType::Market, 1.0, 1.0)),
        Err(StoreError::Disposed)
    );
    assert!(store.cancel_order("1").is_none());
    store.set_ws_status(ConnectionStatus::Connecting);

    assert_eq!(store.snapshot(), before);
    assert!(store.is_disposed());
}

#[test]
fn stores_are_independent() {
    let mut a = new_store();
    let b = new_store();

    a.update_price("BTCUSDT", 50000.0).unwrap();
    assert_eq!(b.quote("BTCUSDT").unwrap().price, 43250.5);
}

#[test]
fn snapshot_serializes_with_wire_labels() {
    let mut store = new_store();
    store
        .place_order(OrderForm::new("ETHUSDT", Side::Buy, OrderType::StopLimit, 1.0, 2600.0))
        .unwrap();

    let json = serde_json::to_value(store.snapshot()).unwrap();
    assert_eq!(json["wsStatus"], "disconnected");
    assert_eq!(json["chartInterval"], "15m");
    assert_eq!(json["selectedSymbol"], "BTCUSDT");
    assert_eq!(json["orders"][0]["type"], "stop_limit");
    assert_eq!(json["orders"][0]["status"], "open");
    assert!(json["prices"]["BTCUSDT"]["change24h"].is_number());
    assert!(json["chartData"]["ETHUSDT"].is_array());

    let back: market_core::MarketSnapshot = serde_json::from_value(json).unwrap();
    assert_eq!(back.orders.len(), 1);
}

#[test]
fn chart_interval_parses_labels() {
    for interval in ChartInterval::ALL {
        assert_eq!(interval.label().parse::<ChartInterval>(), Ok(interval));
    }
    assert!("2h".parse::<ChartInterval>().is_err());
}

#[test]
fn seed_books_are_kept() {
    let mut books = IndexMap::new();
    books.insert(
        Symbol::from("BTCUSDT"),
        OrderBook::new(vec![BookLevel::new(1.0, 1.0, 1.0)], Vec::new()),
    );
    let mut seed = MarketSeed::from_quotes(quotes());
    seed.order_books = books;

    let store = MarketStore::create(seed).unwrap();
    assert_eq!(store.order_book("BTCUSDT").unwrap().bids.len(), 1);
    assert!(store.order_book("ETHUSDT").unwrap().is_empty());
}
