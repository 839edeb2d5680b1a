mod phase;
mod player;

pub use phase::{Phase, Winner};
pub use player::{Player, Role};

use std::collections::HashMap;
use std::fmt;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::rules;

const GAME_ID_SUFFIX_LEN: usize = 5;
const GAME_ID_SUFFIX_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// A rule the caller tried to break.
///
/// These are expected, well-formed-but-illegal requests (wrong target,
/// duplicate vote, spent ability), not programming errors.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RuleViolation {
    UnknownPlayer(String),
    DeadPlayer(String),
    DuplicatePlayer(String),
    AlreadyVoted(String),
    NoNightAction(Role),
    NightSlotTaken(Role),
    SelfTarget(Role),
    ConsecutiveSave(String),
    BulletSpent,
    AlreadyDead(String),
}

impl fmt::Display for RuleViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleViolation::UnknownPlayer(id) => write!(f, "player {id} not found"),
            RuleViolation::DeadPlayer(id) => write!(f, "player {id} is dead"),
            RuleViolation::DuplicatePlayer(id) => write!(f, "player {id} already exists"),
            RuleViolation::AlreadyVoted(id) => write!(f, "player {id} already voted"),
            RuleViolation::NoNightAction(role) => write!(f, "role {role} has no night action"),
            RuleViolation::NightSlotTaken(role) => {
                write!(f, "{role} already acted this night")
            }
            RuleViolation::SelfTarget(role) => write!(f, "{role} cannot target themselves"),
            RuleViolation::ConsecutiveSave(id) => {
                write!(f, "doctor saved {id} last round and cannot repeat")
            }
            RuleViolation::BulletSpent => write!(f, "sheriff already used their investigation"),
            RuleViolation::AlreadyDead(id) => write!(f, "player {id} is already dead"),
        }
    }
}

impl std::error::Error for RuleViolation {}

/// Authoritative state of a single game.
///
/// One engine process owns exactly one `GameState`, and only the engine loop
/// mutates it. Votes and the three night-target slots are cleared on every
/// phase transition; `previous_doctor_target` and `sheriff_bullet_used`
/// survive resets for rule enforcement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameState {
    pub id: String,
    pub round: u32,
    pub phase: Phase,
    pub winner: Winner,

    /// Player id -> player. Uniqueness by id is the only index.
    pub players: HashMap<String, Player>,

    /// Day votes, voter id -> target id. Immutable once cast.
    pub votes: HashMap<String, String>,

    /// Night-action slots, one per acting role, first write wins.
    pub mafia_target: Option<String>,
    pub doctor_target: Option<String>,
    pub sheriff_target: Option<String>,

    /// Last round's doctor save, for the consecutive-save ban.
    pub previous_doctor_target: Option<String>,
    /// The sheriff gets one investigation per game.
    pub sheriff_bullet_used: bool,
}

/// Creates a random game id: `{prefix}-{5 lowercase alphanumerics}`.
pub fn create_game_id(prefix: &str) -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..GAME_ID_SUFFIX_LEN)
        .map(|_| GAME_ID_SUFFIX_CHARSET[rng.gen_range(0..GAME_ID_SUFFIX_CHARSET.len())] as char)
        .collect();
    format!("{prefix}-{suffix}")
}

impl GameState {
    /// Fresh game in the waiting phase with no players.
    pub fn new(id_prefix: &str) -> Self {
        Self {
            id: create_game_id(id_prefix),
            round: 1,
            phase: Phase::Waiting,
            winner: Winner::None,
            players: HashMap::new(),
            votes: HashMap::new(),
            mafia_target: None,
            doctor_target: None,
            sheriff_target: None,
            previous_doctor_target: None,
            sheriff_bullet_used: false,
        }
    }

    pub fn player(&self, id: &str) -> Option<&Player> {
        self.players.get(id)
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn alive_players(&self) -> Vec<&Player> {
        self.players.values().filter(|p| p.alive).collect()
    }

    /// Adds a player. Rejects duplicate ids; callers enforce phase and
    /// capacity limits.
    pub fn add_player(&mut self, player: Player) -> Result<(), RuleViolation> {
        if self.players.contains_key(&player.id) {
            return Err(RuleViolation::DuplicatePlayer(player.id));
        }
        self.players.insert(player.id.clone(), player);
        Ok(())
    }

    /// Marks a player dead. Liveness flips alive -> dead at most once.
    pub fn eliminate_player(&mut self, id: &str) -> Result<(), RuleViolation> {
        let player = self
            .players
            .get_mut(id)
            .ok_or_else(|| RuleViolation::UnknownPlayer(id.to_string()))?;
        if !player.alive {
            return Err(RuleViolation::AlreadyDead(id.to_string()));
        }
        player.alive = false;
        Ok(())
    }

    /// Records a day vote. Votes are immutable once cast.
    pub fn register_vote(&mut self, voter: &str, target: &str) -> Result<(), RuleViolation> {
        let voting = self
            .players
            .get(voter)
            .ok_or_else(|| RuleViolation::UnknownPlayer(voter.to_string()))?;
        if !voting.alive {
            return Err(RuleViolation::DeadPlayer(voter.to_string()));
        }

        let voted = self
            .players
            .get(target)
            .ok_or_else(|| RuleViolation::UnknownPlayer(target.to_string()))?;
        if !voted.alive {
            return Err(RuleViolation::DeadPlayer(target.to_string()));
        }

        if self.votes.contains_key(voter) {
            return Err(RuleViolation::AlreadyVoted(voter.to_string()));
        }

        self.votes.insert(voter.to_string(), target.to_string());
        Ok(())
    }

    /// Records a night action for a role.
    ///
    /// Each slot is single-writer per round; the first accepted write wins.
    /// Role-specific rules: mafia and sheriff cannot self-target, the doctor
    /// cannot repeat last round's save, the sheriff spends their single
    /// bullet on the first successful action.
    pub fn set_night_action(
        &mut self,
        role: Role,
        actor: &str,
        target: &str,
    ) -> Result<(), RuleViolation> {
        if !role.has_night_action() {
            return Err(RuleViolation::NoNightAction(role));
        }

        let targeted = self
            .players
            .get(target)
            .ok_or_else(|| RuleViolation::UnknownPlayer(target.to_string()))?;
        if !targeted.alive {
            return Err(RuleViolation::DeadPlayer(target.to_string()));
        }

        match role {
            Role::Mafia => {
                if self.mafia_target.is_some() {
                    return Err(RuleViolation::NightSlotTaken(role));
                }
                if actor == target {
                    return Err(RuleViolation::SelfTarget(role));
                }
                self.mafia_target = Some(target.to_string());
            }
            Role::Doctor => {
                if self.doctor_target.is_some() {
                    return Err(RuleViolation::NightSlotTaken(role));
                }
                // An unset previous target never matches: round 1 always
                // allows any save. The doctor may self-save.
                if self.previous_doctor_target.as_deref() == Some(target) {
                    return Err(RuleViolation::ConsecutiveSave(target.to_string()));
                }
                self.doctor_target = Some(target.to_string());
            }
            Role::Sheriff => {
                if self.sheriff_target.is_some() {
                    return Err(RuleViolation::NightSlotTaken(role));
                }
                if self.sheriff_bullet_used {
                    return Err(RuleViolation::BulletSpent);
                }
                if actor == target {
                    return Err(RuleViolation::SelfTarget(role));
                }
                self.sheriff_target = Some(target.to_string());
                self.sheriff_bullet_used = true;
            }
            Role::Unknown | Role::Villager => unreachable!("checked by has_night_action"),
        }

        Ok(())
    }

    /// Resolves night actions into at most one death.
    ///
    /// No mafia target means no death; a doctor save on the mafia target
    /// cancels the kill.
    pub fn resolve_night_actions(&self) -> Option<String> {
        let victim = self.mafia_target.as_ref()?;
        if self.doctor_target.as_ref() == Some(victim) {
            return None;
        }
        Some(victim.clone())
    }

    /// Tallies day votes; the unique maximum is eliminated. A tie or zero
    /// votes eliminates no one.
    pub fn resolve_voting(&self) -> Option<String> {
        rules::vote_winner(&self.votes)
    }

    /// Clears votes and night-action slots between phases.
    ///
    /// When a night closes, that night's doctor save (possibly none) becomes
    /// `previous_doctor_target`; day and voting resets leave it untouched so
    /// the consecutive-save ban survives until the next night.
    /// `sheriff_bullet_used` persists for the whole game.
    pub fn reset_phase_data(&mut self) {
        self.votes.clear();
        if self.phase == Phase::Night {
            self.previous_doctor_target = self.doctor_target.take();
        } else {
            self.doctor_target = None;
        }
        self.mafia_target = None;
        self.sheriff_target = None;
    }

    /// Evaluates win conditions, setting winner and the terminal phase
    /// together when the game is over.
    ///
    /// Village wins when no mafia remain alive; mafia wins at numeric parity
    /// or better against the village team.
    pub fn is_game_over(&mut self) -> bool {
        let mut mafia_alive = 0usize;
        let mut village_alive = 0usize;
        for player in self.players.values().filter(|p| p.alive) {
            if player.role.is_mafia_team() {
                mafia_alive += 1;
            } else {
                village_alive += 1;
            }
        }

        if mafia_alive == 0 {
            self.winner = Winner::Village;
            self.phase = Phase::Ended;
            return true;
        }
        if mafia_alive >= village_alive {
            self.winner = Winner::Mafia;
            self.phase = Phase::Ended;
            return true;
        }
        false
    }

    /// Alive player ids in a random order, used for role assignment.
    pub fn shuffle_player_order(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .players
            .values()
            .filter(|p| p.alive)
            .map(|p| p.id.clone())
            .collect();
        ids.shuffle(&mut rand::thread_rng());
        ids
    }

    /// Assigns roles to shuffled alive players following a distribution of
    /// (role, count) pairs. The distribution must cover every alive player.
    pub fn assign_roles(&mut self, distribution: &[(Role, usize)]) {
        let order = self.shuffle_player_order();
        let mut next = 0usize;
        for &(role, count) in distribution {
            for _ in 0..count {
                if let Some(id) = order.get(next) {
                    if let Some(player) = self.players.get_mut(id) {
                        player.role = role;
                    }
                }
                next += 1;
            }
        }
    }
}
