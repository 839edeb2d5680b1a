//! Deterministic rules core for the Mafia engine.
//!
//! Everything in this crate is pure game logic: no I/O, no clocks, no async.
//! The only randomness lives in [`GameState::shuffle_player_order`] and the
//! game-id suffix, both of which the runtime treats as part of game setup.

pub mod rules;
pub mod state;

pub use rules::{can_add_player, can_start_game, role_distribution, tally_votes, vote_winner};
pub use state::{create_game_id, GameState, Phase, Player, Role, RuleViolation, Winner};
