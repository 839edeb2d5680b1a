//! Unified error type surfaced by the engine runtime.
//!
//! Wraps failures from channel plumbing, the wire codec, and the broker
//! adapters so callers can bubble them up with consistent context.
use thiserror::Error;

use crate::events::CodecError;
use crate::kafka::PublishError;
use crate::names::NameError;

pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("engine command channel closed")]
    CommandChannelClosed,

    #[error("engine is shutting down")]
    ShuttingDown,

    #[error("engine loop join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Names(#[from] NameError),

    #[error(transparent)]
    Publish(#[from] PublishError),

    #[error("kafka error: {0}")]
    Kafka(#[from] rdkafka::error::KafkaError),
}
