//! Pre-trade check run by the order-entry caller before `place_order`.
//!
//! The store accepts any well-formed ticket; rejecting bad quantities,
//! missing prices or orders the account cannot margin is the caller's
//! responsibility, and this module is how callers do it.

use crate::order::OrderForm;

/// Fee charged on notional value (0.1%).
pub const FEE_RATE: f64 = 0.001;

/// What an order would cost if accepted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrderCost {
    /// Price the order is valued at (mark price for market orders).
    pub price: f64,
    /// `price * quantity`.
    pub value: f64,
    /// `value / leverage`.
    pub margin: f64,
    /// `value * FEE_RATE`.
    pub fee: f64,
}

impl OrderCost {
    /// Margin plus fee.
    pub fn total(&self) -> f64 {
        self.margin + self.fee
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("invalid quantity: {0}")]
    InvalidQuantity(f64),

    #[error("invalid price: {0}")]
    InvalidPrice(f64),

    #[error("invalid leverage: {0}")]
    InvalidLeverage(u32),

    #[error("insufficient balance: required {required:.2}, available {available:.2}")]
    InsufficientBalance { required: f64, available: f64 },
}

/// Value `form` and check it against the account.
///
/// Market orders are valued at `mark_price`; every other type at its own
/// price. Fails if the quantity or price is not positive, if `leverage` is
/// zero, or if the required margin exceeds `balance`.
pub fn pre_trade_check(
    form: &OrderForm,
    mark_price: f64,
    balance: f64,
    leverage: u32,
) -> Result<OrderCost, ValidationError> {
    if !(form.quantity.is_finite() && form.quantity > 0.0) {
        return Err(ValidationError::InvalidQuantity(form.quantity));
    }

    let price = if form.order_type.uses_mark_price() {
        mark_price
    } else {
        form.price
    };
    if !(price.is_finite() && price > 0.0) {
        return Err(ValidationError::InvalidPrice(price));
    }

    if leverage == 0 {
        return Err(ValidationError::InvalidLeverage(leverage));
    }

    let value = price * form.quantity;
    let margin = value / f64::from(leverage);
    let fee = value * FEE_RATE;

    if margin > balance {
        return Err(ValidationError::InsufficientBalance {
            required: margin,
            available: balance,
        });
    }

    Ok(OrderCost {
        price,
        value,
        margin,
        fee,
    })
}

/// Quick-amount quantity for spending `fraction` of `balance`, e.g.
/// `fraction = 0.25` for a "25%" button: `balance * fraction / (price * leverage)`.
///
/// Returns zero when the price is not positive or leverage is zero.
pub fn max_quantity(balance: f64, fraction: f64, price: f64, leverage: u32) -> f64 {
    if !(price.is_finite() && price > 0.0) || leverage == 0 {
        return 0.0;
    }
    (balance * fraction) / (price * f64::from(leverage))
}
