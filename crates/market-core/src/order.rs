//! Client-side order records and the order ticket used to create them.
//!
//! The store does not match or execute anything: an [`Order`] is a record of
//! what the user asked for, created `open` with nothing filled. Status
//! changes beyond that belong to a (future) execution layer.

use serde::{Deserialize, Serialize};

use crate::order_type::OrderType;
use crate::side::Side;
use crate::symbol::Symbol;

/// Lifecycle state of an order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Open,
    Filled,
    Cancelled,
    PartiallyFilled,
    Rejected,
}

/// An order as held in the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub symbol: Symbol,
    pub side: Side,
    #[serde(rename = "type")]
    pub order_type: OrderType,
    pub quantity: f64,
    pub price: f64,
    pub status: OrderStatus,
    pub filled: f64,
    /// Creation time, milliseconds since the Unix epoch.
    pub timestamp: i64,
}

/// The shape a caller submits to `place_order`.
///
/// Validation (quantity, price, balance) is the caller's job; see
/// [`crate::pretrade`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderForm {
    pub symbol: Symbol,
    pub side: Side,
    #[serde(rename = "type")]
    pub order_type: OrderType,
    pub quantity: f64,
    pub price: f64,
}

impl OrderForm {
    pub fn new(
        symbol: impl Into<Symbol>,
        side: Side,
        order_type: OrderType,
        quantity: f64,
        price: f64,
    ) -> Self {
        OrderForm {
            symbol: symbol.into(),
            side,
            order_type,
            quantity,
            price,
        }
    }

    /// Turn the ticket into a fresh `open` order.
    pub fn into_order(self, id: String, timestamp: i64) -> Order {
        Order {
            id,
            symbol: self.symbol,
            side: self.side,
            order_type: self.order_type,
            quantity: self.quantity,
            price: self.price,
            status: OrderStatus::Open,
            filled: 0.0,
            timestamp,
        }
    }
}

/// Issues time-based order ids that never repeat within one store.
///
/// Ids are the creation time in milliseconds. Two orders placed within the
/// same millisecond (or after the clock stepped backwards) get the last id
/// plus one instead.
#[derive(Debug, Default, Clone)]
pub struct OrderIdGenerator {
    last: i64,
}

impl OrderIdGenerator {
    pub fn new() -> Self {
        OrderIdGenerator::default()
    }

    /// Make sure ids issued later never collide with ids already present
    /// (e.g. seed orders).
    pub fn observe(&mut self, existing_id: &str) {
        if let Ok(n) = existing_id.parse::<i64>() {
            self.last = self.last.max(n);
        }
    }

    pub fn next_id(&mut self, now_ms: i64) -> String {
        let id = now_ms.max(self.last.saturating_add(1));
        self.last = id;
        id.to_string()
    }
}
