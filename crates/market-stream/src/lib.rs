//! market-stream
//!
//! Drives a [`market_core::SharedStore`] from a [`market_feed::MarketFeed`]
//! on a tokio runtime: periodic ticks, connection status, reconnects.

pub mod config;
pub mod controller;

pub use config::{ConfigError, StreamConfig};
pub use controller::{ConnectionController, DEFAULT_RECONNECT_DELAY};
