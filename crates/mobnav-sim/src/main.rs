mod config;
mod scenario;

use std::time::Duration;

use config::SimConfig;
use tracing::info;

#[tokio::main]
async fn main() {
    let path = std::env::args().nth(1).unwrap_or_else(|| "sim.toml".into());
    let config = match SimConfig::load(&path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load {path}: {e}");
            std::process::exit(1);
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    info!(
        "mobnav-sim v{} starting (world radius {} chunks, tick {} ms)",
        env!("CARGO_PKG_VERSION"),
        config.world.radius_chunks,
        config.simulation.tick_millis
    );

    let mut gw = match scenario::build(&config) {
        Ok(gw) => gw,
        Err(e) => {
            eprintln!("Failed to build world: {e}");
            std::process::exit(1);
        }
    };

    let (shutdown_tx, mut shutdown_rx) = tokio::sync::watch::channel(false);

    // Handle Ctrl+C
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("Shutdown signal received");
        let _ = shutdown_tx.send(true);
    });

    let report_interval = config.simulation.report_interval.max(1);
    let mut tick_interval =
        tokio::time::interval(Duration::from_millis(config.simulation.tick_millis.max(1)));
    loop {
        tokio::select! {
            _ = tick_interval.tick() => {
                gw.tick();
                scenario::log_events(&gw.drain_events());

                let tick = gw.current_tick();
                if tick.is_multiple_of(report_interval) {
                    scenario::report(&mut gw);
                }
                if config.simulation.ticks > 0 && tick >= config.simulation.ticks {
                    info!("Reached {tick} ticks");
                    break;
                }
            }
            _ = shutdown_rx.changed() => {
                if *shutdown_rx.borrow() {
                    break;
                }
            }
        }
    }

    scenario::report(&mut gw);
    info!("Simulation stopped.");
}
