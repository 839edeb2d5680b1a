//! The authoritative orchestrator of a single Mafia game.
//!
//! [`Engine`] wires the bounded command channel, spawns the single-writer
//! loop, and is the only entrypoint for inbound broker messages. Modules by
//! responsibility:
//! - [`command`] holds the closed command set and its guards
//! - [`effect`] describes the side effects commands emit
//! - [`handler`] maps inbound wire events to commands
//! - [`timer`] manages the single phase-timeout timer
//! - `worker` keeps the state-owning loop internal to the crate

mod command;
mod effect;
mod handler;
mod timer;
mod worker;

pub use command::{Command, CommandError, REASON_KILLED_BY_MAFIA, REASON_VOTED_OUT};
pub use effect::Effect;
pub use handler::command_for_event;
pub use timer::{phase_timeout, TimerManager};

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use game_core::{GameState, Player};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::events::decode_inbound;
use crate::kafka::{EventPublisher, Message};
use crate::names::NameGenerator;

use worker::EngineWorker;

/// Queue depth for pending commands. Producers block (with cancellation)
/// when the loop falls behind.
const COMMAND_QUEUE_CAPACITY: usize = 64;

/// Front door of the engine process.
///
/// Owns the background loop; cloneable handles are unnecessary because all
/// callers go through `Arc<Engine>`. The engine is reactive: it only acts
/// when a message or bootstrap call enqueues a command.
pub struct Engine {
    game_id: String,
    command_tx: mpsc::Sender<Command>,
    cancel: CancellationToken,
    worker_handle: Mutex<Option<JoinHandle<()>>>,
    timers: Arc<TimerManager>,
    names: NameGenerator,
    player_seq: AtomicU64,
    min_players: usize,
    max_players: usize,
}

impl Engine {
    /// Wires channels and spawns the engine loop.
    ///
    /// `cancel` is the root shutdown signal shared with the consumer and
    /// timer callbacks. Must be called from within a tokio runtime.
    pub fn start(
        state: GameState,
        publisher: Arc<dyn EventPublisher>,
        config: &EngineConfig,
        cancel: CancellationToken,
    ) -> Result<Self> {
        let names = NameGenerator::new(config.player_names.clone())?;
        let timers = Arc::new(TimerManager::new());
        let (command_tx, command_rx) = mpsc::channel(COMMAND_QUEUE_CAPACITY);

        let game_id = state.id.clone();
        let worker = EngineWorker::new(
            state,
            publisher,
            command_rx,
            command_tx.clone(),
            timers.clone(),
            config,
            cancel.clone(),
        );
        let worker_handle = tokio::spawn(worker.run());
        info!(game_id = %game_id, "engine loop started");

        Ok(Self {
            game_id,
            command_tx,
            cancel,
            worker_handle: Mutex::new(Some(worker_handle)),
            timers,
            names,
            player_seq: AtomicU64::new(0),
            min_players: config.min_players,
            max_players: config.max_players,
        })
    }

    pub fn game_id(&self) -> &str {
        &self.game_id
    }

    /// Creates a player with the next sequential id and pool name, and
    /// enqueues it for the waiting lobby.
    pub async fn add_player(&self) -> Result<()> {
        let seq = self.player_seq.fetch_add(1, Ordering::Relaxed) + 1;
        let name = self.names.next()?;
        let player = Player::new(format!("player-{seq}"), name);

        self.send(Command::AddPlayer {
            player,
            max_players: self.max_players,
        })
        .await
    }

    /// Enqueues the start-game command using the configured player window.
    pub async fn start_game(&self) -> Result<()> {
        self.send(Command::StartGame {
            min_players: self.min_players,
            max_players: self.max_players,
        })
        .await
    }

    /// Single external entrypoint for inbound broker messages.
    ///
    /// Decodes the event, maps it to a command, and enqueues it. Decode
    /// failures bubble up so the consumer can skip the message without
    /// committing it.
    pub async fn handle_message(&self, msg: Message) -> Result<()> {
        let envelope = decode_inbound(&msg.value)?;
        debug!(
            game_id = %envelope.game_id,
            kind = envelope.payload.kind(),
            "inbound event"
        );

        match command_for_event(envelope.payload) {
            Some(command) => self.send(command).await,
            None => Ok(()),
        }
    }

    /// Cancels the root token and waits for the loop to drain.
    ///
    /// A panicking loop is reported here and surfaces as a join error; the
    /// game itself is not recoverable.
    pub async fn stop(&self) -> Result<()> {
        self.cancel.cancel();
        self.timers.shutdown();

        let handle = self
            .worker_handle
            .lock()
            .expect("worker handle poisoned")
            .take();
        if let Some(handle) = handle {
            handle.await.map_err(|err| {
                if err.is_panic() {
                    error!("engine loop panicked; shutting down");
                }
                EngineError::WorkerJoin(err)
            })?;
        }
        Ok(())
    }

    /// Blocking enqueue with back-pressure, bailing out on shutdown.
    async fn send(&self, command: Command) -> Result<()> {
        tokio::select! {
            result = self.command_tx.send(command) => {
                result.map_err(|_| EngineError::CommandChannelClosed)
            }
            _ = self.cancel.cancelled() => Err(EngineError::ShuttingDown),
        }
    }
}
