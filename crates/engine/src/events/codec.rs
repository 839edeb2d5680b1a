use thiserror::Error;

use super::{Envelope, EventPayload};

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("malformed event: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("engine does not consume event type {0:?}")]
    EngineEmitted(&'static str),
}

/// Serializes an envelope for the wire.
pub fn encode(envelope: &Envelope) -> Result<Vec<u8>, CodecError> {
    Ok(serde_json::to_vec(envelope)?)
}

/// Parses an inbound message into a typed envelope.
///
/// Unknown `type` strings fail to parse; engine-emitted kinds parse but are
/// rejected, since agents must never inject authoritative events.
pub fn decode_inbound(data: &[u8]) -> Result<Envelope, CodecError> {
    let envelope: Envelope = serde_json::from_slice(data)?;
    if envelope.payload.is_engine_emitted() {
        return Err(CodecError::EngineEmitted(envelope.payload.kind()));
    }
    Ok(envelope)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_payloads() -> Vec<EventPayload> {
        vec![
            EventPayload::GameStarted {
                players: vec!["player-1".into(), "player-2".into()],
            },
            EventPayload::PhaseChanged {
                round: 2,
                old_phase: "night".into(),
                new_phase: "day".into(),
            },
            EventPayload::PlayerEliminated {
                player_id: "player-3".into(),
                reason: "killed_by_mafia".into(),
            },
            EventPayload::GameEnded {
                winner: "mafia".into(),
            },
            EventPayload::RoleAssigned {
                player_id: "player-1".into(),
                role: "sheriff".into(),
            },
            EventPayload::AllChat {
                sender: "player-1".into(),
                message: "good morning".into(),
            },
            EventPayload::MafiaChat {
                sender: "player-2".into(),
                message: "target the doctor".into(),
            },
            EventPayload::VoteSubmitted {
                voter: "player-1".into(),
                target: "player-2".into(),
            },
            EventPayload::NightAction {
                role: "doctor".into(),
                actor: "player-4".into(),
                target: "player-4".into(),
            },
            EventPayload::PlayerThoughts {
                sender: "player-5".into(),
                thought: "player-2 is suspiciously quiet".into(),
            },
        ]
    }

    #[test]
    fn round_trip_every_kind() {
        for payload in all_payloads() {
            let envelope = Envelope {
                game_id: "game-abc12".into(),
                timestamp: 1_700_000_000_123,
                payload,
            };
            let bytes = encode(&envelope).unwrap();
            let decoded: Envelope = serde_json::from_slice(&bytes).unwrap();
            assert_eq!(decoded, envelope);
        }
    }

    #[test]
    fn wire_field_names_match_contract() {
        let envelope = Envelope {
            game_id: "game-abc12".into(),
            timestamp: 42,
            payload: EventPayload::VoteSubmitted {
                voter: "player-1".into(),
                target: "player-2".into(),
            },
        };
        let json: serde_json::Value =
            serde_json::from_slice(&encode(&envelope).unwrap()).unwrap();
        assert_eq!(json["game_id"], "game-abc12");
        assert_eq!(json["timestamp"], 42);
        assert_eq!(json["type"], "vote_submitted");
        assert_eq!(json["voter"], "player-1");
        assert_eq!(json["target"], "player-2");
    }

    #[test]
    fn inbound_accepts_agent_kinds() {
        let raw = br#"{"game_id":"game-abc12","timestamp":7,"type":"night_action","role":"mafia","actor":"player-1","target":"player-2"}"#;
        let envelope = decode_inbound(raw).unwrap();
        assert_eq!(
            envelope.payload,
            EventPayload::NightAction {
                role: "mafia".into(),
                actor: "player-1".into(),
                target: "player-2".into(),
            }
        );
    }

    #[test]
    fn inbound_rejects_engine_emitted_kinds() {
        let raw = br#"{"game_id":"game-abc12","timestamp":7,"type":"game_ended","winner":"mafia"}"#;
        let err = decode_inbound(raw).unwrap_err();
        assert!(matches!(err, CodecError::EngineEmitted("game_ended")));
    }

    #[test]
    fn inbound_rejects_unknown_types() {
        let raw = br#"{"game_id":"game-abc12","timestamp":7,"type":"teleport","target":"moon"}"#;
        assert!(matches!(
            decode_inbound(raw),
            Err(CodecError::Malformed(_))
        ));
    }

    #[test]
    fn inbound_rejects_garbage() {
        assert!(matches!(
            decode_inbound(b"not json"),
            Err(CodecError::Malformed(_))
        ));
    }
}
