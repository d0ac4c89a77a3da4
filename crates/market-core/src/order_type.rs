//! Order type (market, limit, stop, stop-limit).

use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    Market,
    Limit,
    Stop,
    StopLimit,
}

impl OrderType {
    /// Market orders execute at the prevailing price; every other type
    /// carries its own price.
    pub fn uses_mark_price(self) -> bool {
        matches!(self, OrderType::Market)
    }
}
