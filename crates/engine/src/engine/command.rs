use game_core::{rules, GameState, Phase, Player, Role, RuleViolation};
use thiserror::Error;

use super::effect::Effect;
use crate::events::{Envelope, EventPayload};

pub const REASON_KILLED_BY_MAFIA: &str = "killed_by_mafia";
pub const REASON_VOTED_OUT: &str = "voted_out";

/// A guard the command layer enforces before touching state.
///
/// These never become outbound events: rule-breaking intents are silently
/// dropped and agents infer rejection by absence.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("cannot {action} in phase {phase}")]
    WrongPhase { action: &'static str, phase: Phase },

    #[error("cannot add player: max players ({0}) reached")]
    MaxPlayersReached(usize),

    #[error("cannot start game: need {min}-{max} players, have {have}")]
    PlayerCountOutOfRange {
        have: usize,
        min: usize,
        max: usize,
    },

    #[error("sender {0} not found")]
    SenderMissing(String),

    #[error("sender {0} is dead and cannot speak")]
    SenderDead(String),

    #[error("sender {0} is not mafia and cannot use mafia chat")]
    NotMafia(String),

    #[error("actor {0} not found")]
    ActorMissing(String),

    #[error("actor {0} is dead")]
    ActorDead(String),

    #[error("actor {actor} has role {actual} but tried to act as {claimed}")]
    RoleMismatch {
        actor: String,
        actual: Role,
        claimed: String,
    },

    #[error(transparent)]
    Rule(#[from] RuleViolation),
}

/// Closed set of state transformations.
///
/// Applying a command validates it against the current state, mutates the
/// state, and returns the side effects for the loop to execute. Commands are
/// deterministic: no clocks, no I/O; timestamps are injected when publish
/// effects execute.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Register a new player while the game is still waiting. Silent.
    AddPlayer {
        player: Player,
        max_players: usize,
    },
    /// Assign roles and open the first night.
    StartGame {
        min_players: usize,
        max_players: usize,
    },
    /// Record a day vote. Silent until the voting phase resolves.
    Vote { voter: String, target: String },
    /// Public table chat; relayed to everyone.
    Chat { sender: String, message: String },
    /// Private mafia coordination during the night.
    MafiaChat { sender: String, message: String },
    /// Role-restricted night action. Silent until the night resolves.
    NightAction {
        role: String,
        actor: String,
        target: String,
    },
    /// Resolve the current phase and move to `next`.
    PhaseChange { next: Phase },
    /// Kill a player outright and re-check win conditions.
    EliminatePlayer { player: String, reason: String },
}

impl Command {
    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Command::AddPlayer { .. } => "add_player",
            Command::StartGame { .. } => "start_game",
            Command::Vote { .. } => "vote",
            Command::Chat { .. } => "chat",
            Command::MafiaChat { .. } => "mafia_chat",
            Command::NightAction { .. } => "night_action",
            Command::PhaseChange { .. } => "phase_change",
            Command::EliminatePlayer { .. } => "eliminate_player",
        }
    }

    /// Validates and applies this command, returning the effects to execute
    /// in order. On error the state is untouched and no effects run.
    pub fn apply(&self, state: &mut GameState) -> Result<Vec<Effect>, CommandError> {
        match self {
            Command::AddPlayer {
                player,
                max_players,
            } => apply_add_player(state, player, *max_players),
            Command::StartGame {
                min_players,
                max_players,
            } => apply_start_game(state, *min_players, *max_players),
            Command::Vote { voter, target } => apply_vote(state, voter, target),
            Command::Chat { sender, message } => apply_chat(state, sender, message),
            Command::MafiaChat { sender, message } => apply_mafia_chat(state, sender, message),
            Command::NightAction {
                role,
                actor,
                target,
            } => apply_night_action(state, role, actor, target),
            Command::PhaseChange { next } => apply_phase_change(state, *next),
            Command::EliminatePlayer { player, reason } => {
                apply_eliminate_player(state, player, reason)
            }
        }
    }
}

fn publish(state: &GameState, payload: EventPayload) -> Effect {
    Effect::Publish(Envelope::unstamped(state.id.clone(), payload))
}

fn apply_add_player(
    state: &mut GameState,
    player: &Player,
    max_players: usize,
) -> Result<Vec<Effect>, CommandError> {
    if state.phase != Phase::Waiting {
        return Err(CommandError::WrongPhase {
            action: "add players",
            phase: state.phase,
        });
    }
    if !rules::can_add_player(state.player_count(), max_players) {
        return Err(CommandError::MaxPlayersReached(max_players));
    }

    state.add_player(player.clone())?;

    // Silent: clients see the roster when the game starts.
    Ok(Vec::new())
}

fn apply_start_game(
    state: &mut GameState,
    min_players: usize,
    max_players: usize,
) -> Result<Vec<Effect>, CommandError> {
    if state.phase != Phase::Waiting {
        return Err(CommandError::WrongPhase {
            action: "start game",
            phase: state.phase,
        });
    }
    let have = state.player_count();
    if !rules::can_start_game(have, min_players, max_players) {
        return Err(CommandError::PlayerCountOutOfRange {
            have,
            min: min_players,
            max: max_players,
        });
    }

    let distribution = rules::role_distribution(have);
    state.assign_roles(&distribution);

    // The game opens on night 1 so the mafia can coordinate first.
    state.phase = Phase::Night;
    state.round = 1;

    let mut effects = vec![publish(
        state,
        EventPayload::GameStarted {
            players: state.players.keys().cloned().collect(),
        },
    )];

    for player in state.players.values() {
        effects.push(publish(
            state,
            EventPayload::RoleAssigned {
                player_id: player.id.clone(),
                role: player.role.to_string(),
            },
        ));
    }

    effects.push(publish(
        state,
        EventPayload::PhaseChanged {
            round: state.round,
            old_phase: Phase::Waiting.to_string(),
            new_phase: Phase::Night.to_string(),
        },
    ));

    Ok(effects)
}

fn apply_vote(
    state: &mut GameState,
    voter: &str,
    target: &str,
) -> Result<Vec<Effect>, CommandError> {
    if state.phase != Phase::Voting {
        return Err(CommandError::WrongPhase {
            action: "vote",
            phase: state.phase,
        });
    }

    state.register_vote(voter, target)?;

    // Silent: votes are tallied when the voting phase resolves.
    Ok(Vec::new())
}

fn apply_chat(
    state: &mut GameState,
    sender: &str,
    message: &str,
) -> Result<Vec<Effect>, CommandError> {
    let player = state
        .player(sender)
        .ok_or_else(|| CommandError::SenderMissing(sender.to_string()))?;
    if !player.alive {
        return Err(CommandError::SenderDead(sender.to_string()));
    }

    Ok(vec![publish(
        state,
        EventPayload::AllChat {
            sender: sender.to_string(),
            message: message.to_string(),
        },
    )])
}

fn apply_mafia_chat(
    state: &mut GameState,
    sender: &str,
    message: &str,
) -> Result<Vec<Effect>, CommandError> {
    let player = state
        .player(sender)
        .ok_or_else(|| CommandError::SenderMissing(sender.to_string()))?;
    if !player.alive {
        return Err(CommandError::SenderDead(sender.to_string()));
    }
    if !player.role.is_mafia_team() {
        return Err(CommandError::NotMafia(sender.to_string()));
    }
    if state.phase != Phase::Night {
        return Err(CommandError::WrongPhase {
            action: "use mafia chat",
            phase: state.phase,
        });
    }

    Ok(vec![publish(
        state,
        EventPayload::MafiaChat {
            sender: sender.to_string(),
            message: message.to_string(),
        },
    )])
}

fn apply_night_action(
    state: &mut GameState,
    role: &str,
    actor: &str,
    target: &str,
) -> Result<Vec<Effect>, CommandError> {
    if state.phase != Phase::Night {
        return Err(CommandError::WrongPhase {
            action: "perform night actions",
            phase: state.phase,
        });
    }

    let acting = state
        .player(actor)
        .ok_or_else(|| CommandError::ActorMissing(actor.to_string()))?;
    if !acting.alive {
        return Err(CommandError::ActorDead(actor.to_string()));
    }
    if acting.role.as_str() != role {
        return Err(CommandError::RoleMismatch {
            actor: actor.to_string(),
            actual: acting.role,
            claimed: role.to_string(),
        });
    }
    let acting_role = acting.role;

    state.set_night_action(acting_role, actor, target)?;

    // Silent: night actions stay secret until the night resolves.
    Ok(Vec::new())
}

fn apply_phase_change(state: &mut GameState, next: Phase) -> Result<Vec<Effect>, CommandError> {
    // Resolve whatever the closing phase decided.
    let mut eliminated: Option<(String, &'static str)> = None;
    match state.phase {
        Phase::Night => {
            if let Some(victim) = state.resolve_night_actions() {
                let _ = state.eliminate_player(&victim);
                eliminated = Some((victim, REASON_KILLED_BY_MAFIA));
            }
        }
        Phase::Voting => {
            if let Some(victim) = state.resolve_voting() {
                let _ = state.eliminate_player(&victim);
                eliminated = Some((victim, REASON_VOTED_OUT));
            }
        }
        _ => {}
    }

    state.reset_phase_data();

    let old_phase = state.phase;
    state.phase = next;
    if next == Phase::Night {
        state.round += 1;
    }

    let game_ended = state.is_game_over();

    let mut effects = vec![publish(
        state,
        EventPayload::PhaseChanged {
            round: state.round,
            old_phase: old_phase.to_string(),
            new_phase: next.to_string(),
        },
    )];

    if let Some((player_id, reason)) = eliminated {
        effects.push(publish(
            state,
            EventPayload::PlayerEliminated {
                player_id,
                reason: reason.to_string(),
            },
        ));
    }

    if game_ended {
        effects.push(publish(
            state,
            EventPayload::GameEnded {
                winner: state.winner.to_string(),
            },
        ));
    }

    Ok(effects)
}

fn apply_eliminate_player(
    state: &mut GameState,
    player: &str,
    reason: &str,
) -> Result<Vec<Effect>, CommandError> {
    state.eliminate_player(player)?;

    let game_ended = state.is_game_over();

    let mut effects = vec![publish(
        state,
        EventPayload::PlayerEliminated {
            player_id: player.to_string(),
            reason: reason.to_string(),
        },
    )];

    if game_ended {
        effects.push(publish(
            state,
            EventPayload::GameEnded {
                winner: state.winner.to_string(),
            },
        ));
    }

    Ok(effects)
}
