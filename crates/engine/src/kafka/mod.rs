//! Kafka adapters: publish-with-key and consumer-group subscription.
//!
//! Topic names are durable log names, not event semantics. Everything for
//! one game shares a partition key (the game id) so the broker preserves
//! per-game order on both topics.

mod consumer;
mod producer;

pub use consumer::KafkaConsumer;
pub use producer::{EventPublisher, KafkaPublisher, PublishError};

/// Authoritative engine events, consumed by players.
pub const ENGINE_EVENTS_TOPIC: &str = "game.engine.events";

/// Player intents (votes, night actions, chat), consumed by the engine.
pub const PLAYER_ACTIONS_TOPIC: &str = "game.player.actions";

/// A message on either topic.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    pub topic: String,
    /// Partition key; the game id as raw bytes.
    pub key: Vec<u8>,
    /// Serialized event payload.
    pub value: Vec<u8>,
}

/// Partition key for a game. Every event of one game must use the same key
/// to preserve ordering.
pub fn game_key(game_id: &str) -> Vec<u8> {
    game_id.as_bytes().to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn game_key_is_raw_id_bytes() {
        assert_eq!(game_key("game-ab123"), b"game-ab123".to_vec());
    }
}
