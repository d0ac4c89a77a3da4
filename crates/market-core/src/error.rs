//! Error types for the market-state store.
//!
//! Only preconditions are errors. Looking up an order or position that
//! does not exist is a no-op, not an error (see `cancel_order` and
//! `update_position`).

use crate::symbol::Symbol;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
    /// The symbol is not part of this store's universe.
    #[error("unknown symbol: {0}")]
    UnknownSymbol(Symbol),

    /// Prices must be finite and strictly positive.
    #[error("invalid price {price} for {symbol}")]
    InvalidPrice { symbol: Symbol, price: f64 },

    /// A store needs at least one symbol.
    #[error("symbol universe is empty")]
    EmptyUniverse,

    /// The store was disposed and no longer accepts commands.
    #[error("store has been disposed")]
    Disposed,
}
