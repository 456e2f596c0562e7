//! Hokm multiplayer game server.

use hokm_core::Dispatcher;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod protocol;
mod server;

use config::Config;
use server::ServerState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    let dispatcher = match config.seed {
        Some(seed) => Dispatcher::with_seed(config.rules, seed)?,
        None => Dispatcher::new(config.rules)?,
    };

    let rules = dispatcher.rules();
    info!(
        tricks_to_win = rules.tricks_to_win_round,
        rounds_to_win = rules.rounds_to_win_match,
        rotation = ?rules.two_player_rotation,
        seeded = config.seed.is_some(),
        "Starting Hokm server..."
    );
    let state = Arc::new(ServerState::new(dispatcher));

    server::run_server(config.addr, state).await
}
