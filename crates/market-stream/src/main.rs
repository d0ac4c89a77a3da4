// crates/market-stream/src/main.rs

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use market_core::{MarketStore, PriceQuote, SharedStore};
use market_feed::{demo_seed, SimulatedFeed, Universe};
use market_stream::{ConnectionController, StreamConfig};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "market-stream")]
#[command(about = "Simulated market-data stream driving a market-state store")]
struct Cli {
    /// TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Tick interval in milliseconds
    #[arg(long)]
    tick_ms: Option<u64>,

    /// Reconnect delay in milliseconds
    #[arg(long)]
    reconnect_ms: Option<u64>,

    /// RNG seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    /// Symbol to select at startup
    #[arg(short = 'y', long)]
    symbol: Option<String>,

    /// Stop after this many seconds (runs until Ctrl-C when omitted)
    #[arg(short, long)]
    duration_secs: Option<u64>,

    /// Print the final state as JSON
    #[arg(long)]
    json: bool,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

impl Cli {
    fn load_config(&self) -> Result<StreamConfig> {
        let base = match &self.config {
            Some(path) => StreamConfig::from_file(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => StreamConfig::default(),
        };
        let mut config = base.with_overrides(|key| std::env::var(key).ok())?;

        if let Some(tick_ms) = self.tick_ms {
            config.tick_ms = tick_ms;
        }
        if let Some(reconnect_ms) = self.reconnect_ms {
            config.reconnect_ms = reconnect_ms;
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if let Some(symbol) = &self.symbol {
            config.symbol = symbol.clone();
        }
        config.validate()?;
        Ok(config)
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = cli.load_config()?;
    info!(
        "Starting market-stream (tick = {}ms, reconnect = {}ms, symbol = {})",
        config.tick_ms, config.reconnect_ms, config.symbol
    );

    let universe = Universe::default();
    let (mut rng, feed) = match config.seed {
        Some(seed) => (
            StdRng::seed_from_u64(seed),
            SimulatedFeed::seeded(universe.clone(), seed.wrapping_add(1)),
        ),
        None => (StdRng::from_entropy(), SimulatedFeed::new(universe.clone())),
    };

    let mut store = MarketStore::create(demo_seed(&universe, &mut rng))?;
    if let Err(e) = store.set_selected_symbol(&config.symbol) {
        warn!("{}, keeping {}", e, store.selected_symbol());
    }
    let selected = store.selected_symbol().clone();
    let store = SharedStore::new(store);

    let _ticker_log = store
        .subscribe_eq(
            move |state| state.prices.get(&selected).cloned(),
            |quote: &Option<PriceQuote>| {
                if let Some(q) = quote {
                    info!(
                        "{} {:.4} ({:+.2}%)  vol {:.0}",
                        q.symbol, q.price, q.change_24h, q.volume
                    );
                }
            },
        )
        .await;

    let controller = ConnectionController::from_config(store.clone(), feed, &config)?;
    controller.connect().await;

    match cli.duration_secs {
        Some(secs) => {
            tokio::select! {
                _ = tokio::time::sleep(Duration::from_secs(secs)) => {}
                _ = tokio::signal::ctrl_c() => info!("Interrupted"),
            }
        }
        None => {
            tokio::signal::ctrl_c().await?;
            info!("Interrupted");
        }
    }

    controller.shutdown().await;

    if cli.json {
        let snapshot = store.snapshot().await;
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    }

    store.dispose().await;
    Ok(())
}
