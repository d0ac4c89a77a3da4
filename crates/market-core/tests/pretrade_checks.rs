// crates/market-core/tests/pretrade_checks.rs
use market_core::{max_quantity, pre_trade_check, OrderForm, OrderType, Side, ValidationError};

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

fn form(order_type: OrderType, quantity: f64, price: f64) -> OrderForm {
    OrderForm::new("BTCUSDT", Side::Buy, order_type, quantity, price)
}

#[test]
fn market_order_is_valued_at_mark_price() {
    // Ticket price is ignored for market orders.
    let order = form(OrderType::Market, 0.5, 1.0);
    let cost = pre_trade_check(&order, 43000.0, 50_000.0, 10).unwrap();

    assert_eq!(cost.price, 43000.0);
    assert!(close(cost.value, 21_500.0));
    assert!(close(cost.margin, 2_150.0));
    assert!(close(cost.fee, 21.5));
    assert!(close(cost.total(), 2_171.5));
}

#[test]
fn limit_order_is_valued_at_its_own_price() {
    let order = form(OrderType::Limit, 2.0, 2650.0);
    let cost = pre_trade_check(&order, 2700.0, 10_000.0, 1).unwrap();

    assert_eq!(cost.price, 2650.0);
    assert!(close(cost.value, 5_300.0));
    assert!(close(cost.margin, 5_300.0));
    assert!(close(cost.fee, 5.3));
}

#[test]
fn rejects_non_positive_or_nan_quantity() {
    for quantity in [0.0, -1.0] {
        assert_eq!(
            pre_trade_check(&form(OrderType::Market, quantity, 0.0), 43000.0, 50_000.0, 1),
            Err(ValidationError::InvalidQuantity(quantity))
        );
    }

    let order = form(OrderType::Market, f64::NAN, 0.0);
    let nan = pre_trade_check(&order, 43000.0, 50_000.0, 1);
    assert!(matches!(nan, Err(ValidationError::InvalidQuantity(q)) if q.is_nan()));
}

#[test]
fn rejects_limit_order_without_price() {
    assert_eq!(
        pre_trade_check(&form(OrderType::Limit, 1.0, 0.0), 43000.0, 50_000.0, 1),
        Err(ValidationError::InvalidPrice(0.0))
    );
}

#[test]
fn rejects_zero_leverage() {
    assert_eq!(
        pre_trade_check(&form(OrderType::Limit, 1.0, 100.0), 100.0, 50_000.0, 0),
        Err(ValidationError::InvalidLeverage(0))
    );
}

#[test]
fn margin_must_fit_in_balance() {
    // value 200, leverage 4: margin 50.
    let order = form(OrderType::Limit, 2.0, 100.0);

    let cost = pre_trade_check(&order, 100.0, 50.0, 4).unwrap();
    assert_eq!(cost.margin, 50.0);

    assert_eq!(
        pre_trade_check(&order, 100.0, 49.99, 4),
        Err(ValidationError::InsufficientBalance {
            required: 50.0,
            available: 49.99,
        })
    );
}

#[test]
fn quick_amount_quantity() {
    // 25% of 50k at 40k with 5x leverage.
    assert!(close(max_quantity(50_000.0, 0.25, 40_000.0, 5), 0.0625));
    assert!(close(max_quantity(50_000.0, 1.0, 2_500.0, 1), 20.0));

    assert_eq!(max_quantity(50_000.0, 0.5, 0.0, 1), 0.0);
    assert_eq!(max_quantity(50_000.0, 0.5, 100.0, 0), 0.0);
}
