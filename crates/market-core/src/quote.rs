//! Latest price quote per symbol.

use serde::{Deserialize, Serialize};

use crate::symbol::Symbol;

/// Amplification applied to each relative price move when nudging
/// `change_24h`. The indicator is intentionally exaggerated for display and
/// is not a real 24-hour return.
pub const CHANGE_AMPLIFICATION: f64 = 5.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceQuote {
    pub symbol: Symbol,
    pub price: f64,
    /// Signed percentage.
    #[serde(rename = "change24h")]
    pub change_24h: f64,
    pub volume: f64,
}

impl PriceQuote {
    pub fn new(symbol: impl Into<Symbol>, price: f64, change_24h: f64, volume: f64) -> Self {
        PriceQuote {
            symbol: symbol.into(),
            price,
            change_24h,
            volume,
        }
    }

    /// Move the quote to `new_price`, nudging `change_24h` by the amplified
    /// relative move:
    ///
    /// `change' = change + ((new - old) / old) * CHANGE_AMPLIFICATION`
    ///
    /// Callers guarantee `new_price > 0`. The old price is positive for
    /// every quote the store holds.
    pub fn apply_price(&mut self, new_price: f64) {
        let old_price = self.price;
        self.change_24h += ((new_price - old_price) / old_price) * CHANGE_AMPLIFICATION;
        self.price = new_price;
    }
}
