//! Mafia engine binary.
//!
//! Boots one engine process owning one game: loads config from the
//! environment, connects the Kafka adapters, pre-populates the lobby, starts
//! the game, then feeds player intents into the engine until a termination
//! signal arrives.

use std::sync::Arc;

use anyhow::Context;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use engine::{Engine, EngineConfig, KafkaConsumer, KafkaPublisher};
use game_core::GameState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Invalid config is fatal before anything touches the broker.
    let config = EngineConfig::from_env().context("invalid configuration")?;
    init_tracing(&config);

    info!(
        brokers = ?config.kafka_brokers,
        group_id = %config.kafka_group_id,
        inbound = %config.player_actions_topic,
        outbound = %config.engine_events_topic,
        env = %config.env,
        agent_mode = %config.agent_mode,
        "starting mafia engine"
    );

    let publisher = Arc::new(
        KafkaPublisher::new(
            &config.kafka_brokers,
            &config.kafka_client_id,
            config.producer_timeout,
        )
        .context("failed to create kafka producer")?,
    );

    let consumer = KafkaConsumer::new(
        &config.kafka_brokers,
        &config.kafka_group_id,
        &config.kafka_client_id,
        &config.player_actions_topic,
    )
    .context("failed to create kafka consumer")?;

    let state = GameState::new(&config.game_id_prefix);
    info!(game_id = %state.id, phase = %state.phase, "game state initialized");

    // Root cancellation, threaded through the consumer, the engine loop,
    // timer callbacks, and publish calls.
    let cancel = CancellationToken::new();

    let engine = Arc::new(
        Engine::start(state, publisher.clone(), &config, cancel.clone())
            .context("failed to start engine")?,
    );

    // Declarative bootstrap: populate the lobby up to the minimum and start.
    // In cluster mode the orchestrator watches the roster and spawns a pod
    // per player.
    info!(players = config.min_players, "bootstrapping lobby");
    for _ in 0..config.min_players {
        engine
            .add_player()
            .await
            .context("bootstrap: could not add player")?;
    }
    engine
        .start_game()
        .await
        .context("bootstrap: could not start game")?;
    info!(game_id = engine.game_id(), "game started");

    let consumer_cancel = cancel.clone();
    let consumer_engine = engine.clone();
    let consumer_task = tokio::spawn(async move {
        let result = consumer
            .run(consumer_cancel.clone(), move |msg| {
                let engine = consumer_engine.clone();
                async move { engine.handle_message(msg).await }
            })
            .await;
        if let Err(err) = result {
            error!(error = %err, "consumer stopped with fatal broker error");
            consumer_cancel.cancel();
        }
        consumer.close();
    });

    shutdown_signal().await?;
    info!("shutdown signal received, draining");

    cancel.cancel();
    if let Err(err) = consumer_task.await {
        warn!(error = %err, "consumer task join failed");
    }
    if let Err(err) = engine.stop().await {
        warn!(error = %err, "engine stop reported an error");
    }
    if let Err(err) = publisher.close() {
        warn!(error = %err, "producer flush failed");
    }

    info!("shutdown complete");
    Ok(())
}

fn init_tracing(config: &EngineConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone()));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn shutdown_signal() -> anyhow::Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut term = signal(SignalKind::terminate()).context("failed to install SIGTERM handler")?;
        tokio::select! {
            result = tokio::signal::ctrl_c() => result.context("failed to listen for ctrl-c")?,
            _ = term.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c()
            .await
            .context("failed to listen for ctrl-c")?;
    }
    Ok(())
}
