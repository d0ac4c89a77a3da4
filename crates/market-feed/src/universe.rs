//! The fixed set of instruments the feed publishes.

use market_core::Symbol;

/// One tradable instrument.
#[derive(Debug, Clone, PartialEq)]
pub struct Instrument {
    pub symbol: Symbol,
    /// Reference price used to seed quotes and chart history.
    pub base_price: f64,
    /// Spacing between synthetic order-book levels.
    pub tick_size: f64,
}

impl Instrument {
    pub fn new(symbol: &str, base_price: f64, tick_size: f64) -> Self {
        Instrument {
            symbol: Symbol::from(symbol),
            base_price,
            tick_size,
        }
    }
}

/// Closed symbol universe.
#[derive(Debug, Clone, PartialEq)]
pub struct Universe {
    instruments: Vec<Instrument>,
    symbols: Vec<Symbol>,
}

impl Universe {
    pub fn new(instruments: Vec<Instrument>) -> Self {
        let symbols = instruments.iter().map(|i| i.symbol.clone()).collect();
        Universe {
            instruments,
            symbols,
        }
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn instruments(&self) -> &[Instrument] {
        &self.instruments
    }

    pub fn get(&self, symbol: &str) -> Option<&Instrument> {
        self.instruments.iter().find(|i| i.symbol == symbol)
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.get(symbol).is_some()
    }

    pub fn len(&self) -> usize {
        self.instruments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instruments.is_empty()
    }
}

impl Default for Universe {
    /// BTC, ETH, ADA, SOL and DOT quoted in USDT.
    fn default() -> Self {
        Universe::new(vec![
            Instrument::new("BTCUSDT", 43250.5, 0.5),
            Instrument::new("ETHUSDT", 2650.75, 0.05),
            Instrument::new("ADAUSDT", 0.4825, 0.0001),
            Instrument::new("SOLUSDT", 98.42, 0.01),
            Instrument::new("DOTUSDT", 7.215, 0.001),
        ])
    }
}
