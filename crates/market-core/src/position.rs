//! Open positions and partial updates to them.

use serde::{Deserialize, Serialize};

use crate::side::PositionSide;
use crate::symbol::Symbol;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub id: String,
    pub symbol: Symbol,
    pub side: PositionSide,
    pub size: f64,
    pub entry_price: f64,
    pub mark_price: f64,
    pub pnl: f64,
    pub pnl_percent: f64,
    pub margin: f64,
    pub leverage: u32,
}

/// Field-wise patch for a [`Position`]. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PositionUpdate {
    pub symbol: Option<Symbol>,
    pub side: Option<PositionSide>,
    pub size: Option<f64>,
    pub entry_price: Option<f64>,
    pub mark_price: Option<f64>,
    pub pnl: Option<f64>,
    pub pnl_percent: Option<f64>,
    pub margin: Option<f64>,
    pub leverage: Option<u32>,
}

impl PositionUpdate {
    pub fn is_empty(&self) -> bool {
        *self == PositionUpdate::default()
    }

    /// Merge the `Some` fields into `position`. The id is never changed.
    pub fn apply_to(&self, position: &mut Position) {
        if let Some(symbol) = &self.symbol {
            position.symbol = symbol.clone();
        }
        if let Some(side) = self.side {
            position.side = side;
        }
        if let Some(size) = self.size {
            position.size = size;
        }
        if let Some(entry_price) = self.entry_price {
            position.entry_price = entry_price;
        }
        if let Some(mark_price) = self.mark_price {
            position.mark_price = mark_price;
        }
        if let Some(pnl) = self.pnl {
            position.pnl = pnl;
        }
        if let Some(pnl_percent) = self.pnl_percent {
            position.pnl_percent = pnl_percent;
        }
        if let Some(margin) = self.margin {
            position.margin = margin;
        }
        if let Some(leverage) = self.leverage {
            position.leverage = leverage;
        }
    }
}
