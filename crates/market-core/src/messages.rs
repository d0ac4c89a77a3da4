//! Feed events consumed by the store.
//!
//! These are the only feed-driven writes: the connection controller turns
//! each tick of the generator into a batch of [`MarketEvent`]s and applies
//! them with [`MarketStore::process_event`](crate::MarketStore::process_event).

use crate::order_book::OrderBook;
use crate::symbol::Symbol;

#[derive(Debug, Clone, PartialEq)]
pub enum MarketEvent {
    /// New last price for a symbol.
    PriceUpdate(PriceUpdate),

    /// Full replacement of a symbol's order book.
    OrderBookUpdate(OrderBookUpdate),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PriceUpdate {
    pub symbol: Symbol,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderBookUpdate {
    pub symbol: Symbol,
    pub book: OrderBook,
}

impl MarketEvent {
    pub fn price(symbol: impl Into<Symbol>, price: f64) -> Self {
        MarketEvent::PriceUpdate(PriceUpdate {
            symbol: symbol.into(),
            price,
        })
    }

    pub fn order_book(symbol: impl Into<Symbol>, book: OrderBook) -> Self {
        MarketEvent::OrderBookUpdate(OrderBookUpdate {
            symbol: symbol.into(),
            book,
        })
    }

    pub fn symbol(&self) -> &Symbol {
        match self {
            MarketEvent::PriceUpdate(update) => &update.symbol,
            MarketEvent::OrderBookUpdate(update) => &update.symbol,
        }
    }
}
