//! market-core
//!
//! Pure market-state logic:
//! - entities (quotes, order books, chart history, orders, positions)
//! - the [`MarketStore`] and its update rules
//! - selector subscriptions over the store
//! - the pre-trade check callers run before placing orders
//!
//! No timers and no feed live here; see `market-feed` and `market-stream`.

pub mod account;
pub mod chart;
pub mod error;
pub mod messages;
pub mod order;
pub mod order_book;
pub mod order_type;
pub mod position;
pub mod pretrade;
pub mod quote;
pub mod selector;
pub mod shared;
pub mod side;
pub mod status;
pub mod store;
pub mod symbol;

pub use account::{ChartInterval, Strategy, StrategyStatus, Theme, User};
pub use chart::{ChartHistory, ChartPoint, CHART_CAPACITY};
pub use error::StoreError;
pub use messages::{MarketEvent, OrderBookUpdate, PriceUpdate};
pub use order::{Order, OrderForm, OrderStatus};
pub use order_book::{BookLevel, OrderBook};
pub use order_type::OrderType;
pub use position::{Position, PositionUpdate};
pub use pretrade::{max_quantity, pre_trade_check, OrderCost, ValidationError};
pub use quote::PriceQuote;
pub use selector::{Subscription, SubscriptionId};
pub use shared::SharedStore;
pub use side::{PositionSide, Side};
pub use status::ConnectionStatus;
pub use store::{MarketSeed, MarketSnapshot, MarketState, MarketStore};
pub use symbol::Symbol;
