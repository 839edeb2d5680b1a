//! The single-writer loop that owns the authoritative [`GameState`].
//!
//! All mutation funnels through the bounded command channel: inbound Kafka
//! intents, bootstrap commands, and fired phase timers all end up here, so
//! command application has a trivial total order.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use game_core::GameState;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::command::Command;
use super::effect::Effect;
use super::timer::{phase_timeout, TimerManager};
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::events::encode;
use crate::kafka::{game_key, EventPublisher, Message};

pub(crate) struct EngineWorker {
    state: GameState,
    publisher: Arc<dyn EventPublisher>,
    command_rx: mpsc::Receiver<Command>,
    /// Handed to timers and deferred effects so they re-enter the queue.
    command_tx: mpsc::Sender<Command>,
    timers: Arc<TimerManager>,
    events_topic: String,
    night_duration: Duration,
    day_duration: Duration,
    voting_duration: Duration,
    cancel: CancellationToken,
}

impl EngineWorker {
    pub(crate) fn new(
        state: GameState,
        publisher: Arc<dyn EventPublisher>,
        command_rx: mpsc::Receiver<Command>,
        command_tx: mpsc::Sender<Command>,
        timers: Arc<TimerManager>,
        config: &EngineConfig,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            state,
            publisher,
            command_rx,
            command_tx,
            timers,
            events_topic: config.engine_events_topic.clone(),
            night_duration: config.night_duration,
            day_duration: config.day_duration,
            voting_duration: config.voting_duration,
            cancel,
        }
    }

    /// Runs until cancellation or until every sender is gone.
    pub(crate) async fn run(mut self) {
        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => break,
                command = self.command_rx.recv() => {
                    let Some(command) = command else { break };
                    self.process(command).await;
                }
            }
        }
        self.timers.shutdown();
        debug!(game_id = %self.state.id, "engine loop stopped");
    }

    /// Decision phase, then effect phase, then timer upkeep.
    async fn process(&mut self, command: Command) {
        let rearm = matches!(
            command,
            Command::StartGame { .. } | Command::PhaseChange { .. }
        );
        let name = command.name();

        let effects = match command.apply(&mut self.state) {
            Ok(effects) => effects,
            Err(error) => {
                // Rule violations produce nothing on the wire; the offender
                // infers rejection by absence.
                warn!(command = name, error = %error, "command rejected");
                return;
            }
        };

        for effect in effects {
            if let Err(error) = self.execute_effect(effect).await {
                // State has already mutated; finish the remaining effects
                // so the game stays live.
                warn!(command = name, error = %error, "effect execution failed");
            }
        }

        if rearm {
            self.arm_phase_timer();
        }
    }

    async fn execute_effect(&mut self, effect: Effect) -> Result<(), EngineError> {
        match effect {
            Effect::Publish(mut envelope) => {
                envelope.timestamp = Utc::now().timestamp_millis();
                let value = encode(&envelope)?;
                let msg = Message {
                    topic: self.events_topic.clone(),
                    key: game_key(&envelope.game_id),
                    value,
                };
                self.publisher.publish(msg).await?;
                Ok(())
            }
            Effect::ScheduleTimer { delay, command } => {
                let command_tx = self.command_tx.clone();
                let cancel = self.cancel.clone();
                tokio::spawn(async move {
                    tokio::select! {
                        _ = cancel.cancelled() => return,
                        _ = tokio::time::sleep(delay) => {}
                    }
                    tokio::select! {
                        result = command_tx.send(*command) => {
                            if result.is_err() {
                                warn!("deferred command dropped: engine loop is gone");
                            }
                        }
                        _ = cancel.cancelled() => {}
                    }
                });
                Ok(())
            }
        }
    }

    /// Cancels the outstanding phase timer and arms one for the current
    /// phase, if it has a deadline.
    fn arm_phase_timer(&self) {
        self.timers.cancel();

        let duration = phase_timeout(
            self.state.phase,
            self.night_duration,
            self.day_duration,
            self.voting_duration,
        );
        if duration.is_zero() {
            return;
        }

        self.timers.schedule(
            self.state.phase,
            self.state.round,
            duration,
            self.state.phase.next(),
            self.command_tx.clone(),
            self.cancel.clone(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use game_core::{Phase, Player};
    use std::sync::Mutex;

    use crate::events::{EventPayload, Envelope};
    use crate::kafka::PublishError;

    #[derive(Default)]
    struct RecordingPublisher {
        messages: Mutex<Vec<Message>>,
    }

    impl RecordingPublisher {
        fn decoded(&self) -> Vec<Envelope> {
            self.messages
                .lock()
                .unwrap()
                .iter()
                .map(|msg| serde_json::from_slice(&msg.value).unwrap())
                .collect()
        }

        fn len(&self) -> usize {
            self.messages.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl EventPublisher for RecordingPublisher {
        async fn publish(&self, msg: Message) -> Result<(), PublishError> {
            self.messages.lock().unwrap().push(msg);
            Ok(())
        }
    }

    struct Harness {
        command_tx: mpsc::Sender<Command>,
        publisher: Arc<RecordingPublisher>,
        timers: Arc<TimerManager>,
        cancel: CancellationToken,
    }

    fn spawn_worker(state: GameState) -> Harness {
        let mut config = EngineConfig::default();
        // Long enough that no timer fires during a test on its own.
        config.night_duration = Duration::from_secs(300);
        config.day_duration = Duration::from_secs(300);
        config.voting_duration = Duration::from_secs(300);

        let publisher = Arc::new(RecordingPublisher::default());
        let timers = Arc::new(TimerManager::new());
        let cancel = CancellationToken::new();
        let (command_tx, command_rx) = mpsc::channel(16);

        let worker = EngineWorker::new(
            state,
            publisher.clone(),
            command_rx,
            command_tx.clone(),
            timers.clone(),
            &config,
            cancel.clone(),
        );
        tokio::spawn(worker.run());

        Harness {
            command_tx,
            publisher,
            timers,
            cancel,
        }
    }

    async fn wait_until(mut condition: impl FnMut() -> bool) {
        for _ in 0..200 {
            if condition() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("condition not reached in time");
    }

    fn lobby(players: usize) -> GameState {
        let mut state = GameState::new("test");
        for i in 1..=players {
            state
                .add_player(Player::new(format!("player-{i}"), format!("Name {i}")))
                .unwrap();
        }
        state
    }

    #[tokio::test]
    async fn start_game_publishes_and_arms_night_timer() {
        let harness = spawn_worker(lobby(6));

        harness
            .command_tx
            .send(Command::StartGame {
                min_players: 6,
                max_players: 12,
            })
            .await
            .unwrap();

        wait_until(|| harness.publisher.len() == 8).await;

        let events = harness.publisher.decoded();
        assert!(matches!(
            events[0].payload,
            EventPayload::GameStarted { .. }
        ));
        assert!(events[0].timestamp > 0, "publish stamps the timestamp");
        assert!(matches!(
            events[7].payload,
            EventPayload::PhaseChanged { .. }
        ));

        assert_eq!(harness.timers.active_tag().as_deref(), Some("night-round-1"));

        harness.cancel.cancel();
    }

    #[tokio::test]
    async fn phase_change_rearms_for_the_new_phase() {
        let harness = spawn_worker(lobby(6));

        harness
            .command_tx
            .send(Command::StartGame {
                min_players: 6,
                max_players: 12,
            })
            .await
            .unwrap();
        wait_until(|| harness.publisher.len() == 8).await;

        harness
            .command_tx
            .send(Command::PhaseChange { next: Phase::Day })
            .await
            .unwrap();
        wait_until(|| harness.timers.active_tag().as_deref() == Some("day-round-1")).await;

        harness.cancel.cancel();
    }

    #[tokio::test]
    async fn rejected_command_produces_no_events() {
        let harness = spawn_worker(lobby(2));

        // Two players is below the minimum.
        harness
            .command_tx
            .send(Command::StartGame {
                min_players: 6,
                max_players: 12,
            })
            .await
            .unwrap();

        // A follow-up chat proves the loop survived the rejection.
        harness
            .command_tx
            .send(Command::Chat {
                sender: "player-1".into(),
                message: "hello?".into(),
            })
            .await
            .unwrap();

        wait_until(|| harness.publisher.len() == 1).await;
        let events = harness.publisher.decoded();
        assert!(matches!(events[0].payload, EventPayload::AllChat { .. }));
        assert!(!harness.timers.is_armed());

        harness.cancel.cancel();
    }

    #[tokio::test]
    async fn schedule_timer_effect_reenqueues_the_command() {
        let mut state = lobby(6);
        state.phase = Phase::Day;

        let config = EngineConfig::default();
        let publisher = Arc::new(RecordingPublisher::default());
        let timers = Arc::new(TimerManager::new());
        let cancel = CancellationToken::new();
        let (command_tx, command_rx) = mpsc::channel(16);

        let mut worker = EngineWorker::new(
            state,
            publisher.clone(),
            command_rx,
            command_tx.clone(),
            timers,
            &config,
            cancel.clone(),
        );

        worker
            .execute_effect(Effect::ScheduleTimer {
                delay: Duration::from_millis(10),
                command: Box::new(Command::Chat {
                    sender: "player-1".into(),
                    message: "delayed".into(),
                }),
            })
            .await
            .unwrap();

        tokio::spawn(worker.run());

        wait_until(|| publisher.len() == 1).await;
        let events = publisher.decoded();
        assert!(matches!(
            &events[0].payload,
            EventPayload::AllChat { message, .. } if message == "delayed"
        ));

        cancel.cancel();
    }

    #[tokio::test]
    async fn cancellation_stops_the_loop_and_disarms_timers() {
        let harness = spawn_worker(lobby(6));

        harness
            .command_tx
            .send(Command::StartGame {
                min_players: 6,
                max_players: 12,
            })
            .await
            .unwrap();
        wait_until(|| harness.timers.is_armed()).await;

        harness.cancel.cancel();
        wait_until(|| !harness.timers.is_armed()).await;
    }
}
