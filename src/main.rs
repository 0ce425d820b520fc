//! pusher-bridge - Runs the action pipeline against a Redis-backed client.
//!
//! Connects with the configured app key, subscribes the startup channels and
//! logs every action until Ctrl-C.

use std::sync::Arc;

use serde_json::json;
use tokio::sync::watch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use pusher_bridge::adapters::{ActionStore, RedisMessagingFactory, TracingListener};
use pusher_bridge::application::PusherEpic;
use pusher_bridge::config::AppConfig;
use pusher_bridge::domain::pusher::PusherAction;
use pusher_bridge::ports::ActionRegistry;

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.bridge.log_level));

    let registry = tracing_subscriber::registry().with(filter);
    if config.is_production() {
        registry
            .with(tracing_subscriber::fmt::layer().with_target(false).json())
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_target(false).compact())
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    init_tracing(&config);
    config.validate()?;

    let store = Arc::new(ActionStore::new());
    store.add_listener(Arc::new(TracingListener));
    let factory = Arc::new(RedisMessagingFactory::new(config.redis.clone()));
    let pusher = Arc::new(PusherEpic::new(factory));
    pusher.register(store.as_ref());

    store.dispatch(PusherAction::connect(config.bridge.app_key.clone(), json!({})))?;
    let events = config.bridge.events_list();
    for channel in config.bridge.channels_list() {
        store.dispatch(PusherAction::subscribe(channel, events.clone()))?;
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for shutdown signal");
        }
        tracing::info!("Shutdown requested");
        if shutdown_tx.send(true).is_err() {
            tracing::debug!("Action store already stopped");
        }
    });

    tracing::info!(
        environment = ?config.bridge.environment,
        timeout_secs = config.redis.timeout_secs,
        "Pusher bridge running"
    );
    store.run(shutdown_rx).await?;

    store.dispatch(PusherAction::disconnect())?;
    store.run_until_idle().await;
    Ok(())
}
