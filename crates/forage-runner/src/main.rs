//! Terminal driver for the forage grid world.

mod game;
mod metrics;
mod render;
mod telemetry;

use anyhow::{Context, Result};
use forage_core::SimulationConfig;
use game::Game;
use metrics::{CsvDumper, MetricsSink, NullSink};
use render::{HeadlessRenderer, Renderer, TerminalRenderer};
use tokio::signal;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    telemetry::init_telemetry()?;

    let config = load_config()?;
    info!("Starting forage simulation");
    info!(
        seed = config.seed,
        width = config.world.width,
        height = config.world.height,
        "Configuration loaded"
    );

    let renderer: Box<dyn Renderer> = if config.driver.render {
        Box::new(TerminalRenderer::stdout())
    } else {
        Box::new(HeadlessRenderer)
    };

    let metrics: Box<dyn MetricsSink> = match &config.driver.metrics_path {
        Some(path) => Box::new(
            CsvDumper::create(path).with_context(|| format!("opening metrics file {path}"))?,
        ),
        None => Box::new(NullSink),
    };

    let mut game = Game::new(config, renderer, metrics);
    game.start()?;

    tokio::select! {
        result = game.run() => result?,
        _ = shutdown_signal() => {}
    }

    info!("Shutting down");
    game.finish()?;

    Ok(())
}

/// Configuration from the optional JSON path argument, with `FORAGE_SEED`
/// overriding the seed.
fn load_config() -> Result<SimulationConfig> {
    let mut config = match std::env::args().nth(1) {
        Some(path) => SimulationConfig::load(&path)
            .with_context(|| format!("loading configuration from {path}"))?,
        None => SimulationConfig::default(),
    };

    if let Ok(seed) = std::env::var("FORAGE_SEED") {
        match seed.parse() {
            Ok(seed) => config.seed = seed,
            Err(_) => warn!("Ignoring invalid FORAGE_SEED value {seed:?}"),
        }
    }

    Ok(config)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
