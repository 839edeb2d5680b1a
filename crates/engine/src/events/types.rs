use serde::{Deserialize, Serialize};

/// Common header wrapped around every wire event.
///
/// The flattened payload contributes the `type` discriminator and the
/// kind-specific fields, so the serialized form is a single flat object:
/// `{"game_id": ..., "timestamp": ..., "type": ..., ...}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub game_id: String,
    /// Unix milliseconds, stamped by the engine at publish time.
    pub timestamp: i64,
    #[serde(flatten)]
    pub payload: EventPayload,
}

impl Envelope {
    /// Payload with a zero timestamp; the publish effect stamps the real
    /// time just before serialization.
    pub fn unstamped(game_id: impl Into<String>, payload: EventPayload) -> Self {
        Self {
            game_id: game_id.into(),
            timestamp: 0,
            payload,
        }
    }
}

/// Closed set of wire events, tagged by the stable `type` string.
///
/// The first five kinds are engine-emitted and never consumed back; the
/// rest are agent intents.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventPayload {
    GameStarted {
        players: Vec<String>,
    },
    PhaseChanged {
        round: u32,
        old_phase: String,
        new_phase: String,
    },
    PlayerEliminated {
        player_id: String,
        reason: String,
    },
    GameEnded {
        winner: String,
    },
    /// Per-player, intended to be private; see the role-secrets flag.
    RoleAssigned {
        player_id: String,
        role: String,
    },

    AllChat {
        sender: String,
        message: String,
    },
    MafiaChat {
        sender: String,
        message: String,
    },
    VoteSubmitted {
        voter: String,
        target: String,
    },
    NightAction {
        role: String,
        actor: String,
        target: String,
    },
    /// Agent reasoning trace; accepted for observability, never acted on.
    PlayerThoughts {
        sender: String,
        thought: String,
    },
}

impl EventPayload {
    /// The wire `type` string for this kind.
    pub fn kind(&self) -> &'static str {
        match self {
            EventPayload::GameStarted { .. } => "game_started",
            EventPayload::PhaseChanged { .. } => "phase_changed",
            EventPayload::PlayerEliminated { .. } => "player_eliminated",
            EventPayload::GameEnded { .. } => "game_ended",
            EventPayload::RoleAssigned { .. } => "role_assigned",
            EventPayload::AllChat { .. } => "all_chat",
            EventPayload::MafiaChat { .. } => "mafia_chat",
            EventPayload::VoteSubmitted { .. } => "vote_submitted",
            EventPayload::NightAction { .. } => "night_action",
            EventPayload::PlayerThoughts { .. } => "player_thoughts",
        }
    }

    /// True for kinds the engine emits and never consumes.
    pub fn is_engine_emitted(&self) -> bool {
        matches!(
            self,
            EventPayload::GameStarted { .. }
                | EventPayload::PhaseChanged { .. }
                | EventPayload::PlayerEliminated { .. }
                | EventPayload::GameEnded { .. }
                | EventPayload::RoleAssigned { .. }
        )
    }
}
