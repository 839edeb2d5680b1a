//! Engine runtime for the event-sourced Mafia game.
//!
//! This crate wires the deterministic rules core (`game-core`) to the
//! outside world: a Kafka-fed command loop, phase timers, the wire-event
//! codec, and the config surface. Agents never talk to each other directly;
//! everything visible goes through the outbound topic and everything secret
//! stays in [`game_core::GameState`].
//!
//! Modules by responsibility:
//! - [`engine`] hosts the orchestrator, command/effect layer, and loop
//! - [`events`] defines the wire contract and codec
//! - [`kafka`] adapts the partitioned log (producer/consumer)
//! - [`config`] loads and validates runtime knobs from the environment
//! - [`names`] assigns player display names from a finite pool

pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod kafka;
pub mod names;

pub use config::{AgentMode, ConfigError, EngineConfig};
pub use engine::{
    command_for_event, phase_timeout, Command, CommandError, Effect, Engine, TimerManager,
};
pub use error::{EngineError, Result};
pub use events::{decode_inbound, encode, CodecError, Envelope, EventPayload};
pub use kafka::{game_key, EventPublisher, KafkaConsumer, KafkaPublisher, Message, PublishError};
pub use names::{NameError, NameGenerator};
