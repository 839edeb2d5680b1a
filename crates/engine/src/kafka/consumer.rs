use std::future::Future;
use std::time::Duration;

use futures::FutureExt;
use rdkafka::config::ClientConfig;
use rdkafka::consumer::{CommitMode, Consumer, StreamConsumer};
use rdkafka::error::KafkaError;
use rdkafka::Message as _;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::Message;
use crate::error::EngineError;

/// Give up after this many consecutive fetch failures; transient broker
/// hiccups recover well before this.
const MAX_CONSECUTIVE_FETCH_ERRORS: u32 = 10;

const FETCH_ERROR_BACKOFF: Duration = Duration::from_millis(300);

/// Consumer-group subscription over the player-actions topic.
///
/// Delivery is at-least-once: offsets are committed only after the handler
/// returns success, so a crash between handling and commit redelivers.
pub struct KafkaConsumer {
    consumer: StreamConsumer,
}

impl KafkaConsumer {
    pub fn new(
        brokers: &[String],
        group_id: &str,
        client_id: &str,
        topic: &str,
    ) -> Result<Self, KafkaError> {
        let consumer: StreamConsumer = ClientConfig::new()
            .set("bootstrap.servers", brokers.join(","))
            .set("group.id", group_id)
            .set("client.id", client_id)
            .set("enable.auto.commit", "false")
            .set("auto.offset.reset", "earliest")
            .create()?;

        consumer.subscribe(&[topic])?;
        Ok(Self { consumer })
    }

    /// Consumes until cancellation or a fatal broker failure.
    ///
    /// Handler failures (and panics) skip the commit so the message is
    /// redelivered, and never take the loop down.
    pub async fn run<F, Fut>(
        &self,
        cancel: CancellationToken,
        mut handler: F,
    ) -> Result<(), KafkaError>
    where
        F: FnMut(Message) -> Fut,
        Fut: Future<Output = Result<(), EngineError>> + Send,
    {
        let mut fetch_errors = 0u32;

        loop {
            let borrowed = tokio::select! {
                _ = cancel.cancelled() => return Ok(()),
                result = self.consumer.recv() => match result {
                    Ok(borrowed) => {
                        fetch_errors = 0;
                        borrowed
                    }
                    Err(err) => {
                        fetch_errors += 1;
                        if fetch_errors >= MAX_CONSECUTIVE_FETCH_ERRORS {
                            warn!(error = %err, "kafka fetch failing repeatedly, giving up");
                            return Err(err);
                        }
                        warn!(error = %err, attempt = fetch_errors, "kafka fetch error");
                        tokio::time::sleep(FETCH_ERROR_BACKOFF).await;
                        continue;
                    }
                },
            };

            let Some(payload) = borrowed.payload() else {
                debug!(topic = borrowed.topic(), "skipping message with empty payload");
                let _ = self.consumer.commit_message(&borrowed, CommitMode::Async);
                continue;
            };

            let msg = Message {
                topic: borrowed.topic().to_string(),
                key: borrowed.key().unwrap_or_default().to_vec(),
                value: payload.to_vec(),
            };

            // A panicking handler must not kill the consumer; the message
            // stays uncommitted and will be redelivered.
            match std::panic::AssertUnwindSafe(handler(msg)).catch_unwind().await {
                Ok(Ok(())) => {
                    if let Err(err) = self.consumer.commit_message(&borrowed, CommitMode::Async) {
                        warn!(error = %err, "failed to commit offset");
                    }
                }
                Ok(Err(err)) => {
                    warn!(error = %err, topic = borrowed.topic(), "handler rejected message");
                }
                Err(_) => {
                    warn!(topic = borrowed.topic(), "handler panicked on message");
                }
            }
        }
    }

    pub fn close(self) {
        // StreamConsumer unsubscribes and leaves the group on drop.
        drop(self.consumer);
    }
}
