//! Astra dedicated sync server.
//!
//! Runs the background tick loop: every interval, each stored player
//! is caught up to the wall clock and persisted. Command entry points
//! live in [`astra_server::sync`]; there is no network frontend here.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use std::{env, fs, process};

use astra_core::campaign::CampaignConfig;
use astra_core::config::EngineConfig;
use astra_core::time::Timestamp;
use astra_server::store::MemoryStore;
use astra_server::sync::SyncService;
use astra_server::ServerConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn unix_now_ms() -> Timestamp {
    SystemTime::now().duration_since(UNIX_EPOCH).map_or(0, |elapsed| {
        Timestamp::try_from(elapsed.as_millis()).unwrap_or(Timestamp::MAX)
    })
}

fn load_config() -> ServerConfig {
    let Some(path) = env::args().nth(1) else {
        return ServerConfig::default();
    };
    let text = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(error) => {
            eprintln!("cannot read {path}: {error}");
            process::exit(1);
        }
    };
    match ServerConfig::from_ron_str(&text) {
        Ok(config) => config,
        Err(error) => {
            eprintln!("cannot parse {path}: {error}");
            process::exit(1);
        }
    }
}

fn main() {
    let config = load_config();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_filter)),
        )
        .init();

    tracing::info!("Starting Astra sync server");

    let store = Arc::new(MemoryStore::new());
    let service = SyncService::new(store, CampaignConfig::standard(), EngineConfig::default());

    loop {
        let now = unix_now_ms();
        match service.run_tick(now) {
            Ok(synced) => tracing::debug!(players = synced, "tick complete"),
            Err(error) => tracing::error!(%error, "tick failed"),
        }
        thread::sleep(Duration::from_millis(config.tick_interval_ms));
    }
}
