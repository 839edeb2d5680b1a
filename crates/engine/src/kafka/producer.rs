use std::time::Duration;

use async_trait::async_trait;
use rdkafka::config::ClientConfig;
use rdkafka::error::KafkaError;
use rdkafka::producer::{FutureProducer, FutureRecord, Producer};
use rdkafka::util::Timeout;
use thiserror::Error;

use super::Message;

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("kafka publish failed: {0}")]
    Kafka(#[from] KafkaError),
}

/// Publish seam for the engine loop.
///
/// The loop only needs "send this keyed message"; tests swap in an
/// in-memory implementation.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, msg: Message) -> Result<(), PublishError>;
}

/// Kafka-backed publisher using hash-of-key partitioning and leader acks.
pub struct KafkaPublisher {
    producer: FutureProducer,
    send_timeout: Duration,
}

impl KafkaPublisher {
    /// Connects a producer. Leader acknowledgement is enough durability for
    /// game events; transient failures retry a bounded number of times.
    pub fn new(
        brokers: &[String],
        client_id: &str,
        send_timeout: Duration,
    ) -> Result<Self, KafkaError> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", brokers.join(","))
            .set("client.id", client_id)
            .set("acks", "1")
            .set("message.send.max.retries", "3")
            .set(
                "message.timeout.ms",
                send_timeout.as_millis().to_string(),
            )
            .create()?;

        Ok(Self {
            producer,
            send_timeout,
        })
    }

    /// Flushes buffered messages; call during graceful shutdown.
    pub fn close(&self) -> Result<(), KafkaError> {
        self.producer.flush(Timeout::After(self.send_timeout))
    }
}

#[async_trait]
impl EventPublisher for KafkaPublisher {
    async fn publish(&self, msg: Message) -> Result<(), PublishError> {
        let record = FutureRecord::to(&msg.topic).key(&msg.key).payload(&msg.value);

        self.producer
            .send(record, Timeout::After(self.send_timeout))
            .await
            .map(|_| ())
            .map_err(|(err, _)| PublishError::Kafka(err))
    }
}
